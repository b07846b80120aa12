//! 节点
//!
//! dumbbell 里只有叶子主机与两台瓶颈路由器，二者的转发逻辑相同，
//! 只在计数与日志上区分角色。

use super::id::NodeId;
use super::network::Network;
use super::packet::Packet;
use crate::sim::Simulator;
use crate::topo::NodeRole;
use tracing::{debug, trace};

/// 节点接口
pub trait Node: Send {
    fn id(&self) -> NodeId;

    fn name(&self) -> &str;

    fn role(&self) -> NodeRole;

    /// 处理到达的数据包：目的地是自己则交付，否则交给网络继续转发
    fn on_packet(&mut self, pkt: Packet, sim: &mut Simulator, net: &mut Network);
}

/// 仿真节点
#[derive(Debug)]
pub struct SimNode {
    id: NodeId,
    name: String,
    role: NodeRole,
    /// 作为目的地收到的包
    pub received: u64,
}

impl SimNode {
    pub fn new(id: NodeId, name: impl Into<String>, role: NodeRole) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            received: 0,
        }
    }
}

impl Node for SimNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> NodeRole {
        self.role
    }

    fn on_packet(&mut self, pkt: Packet, sim: &mut Simulator, net: &mut Network) {
        let glyph = if self.role.is_leaf() { "🖥️ " } else { "🔀" };
        trace!(node = %self.name, pkt_id = pkt.id, dst = %pkt.dst, hops = pkt.hops, "{glyph} 收到数据包");

        if pkt.dst == self.id {
            self.received += 1;
            debug!(node = %self.name, received = self.received, port = pkt.dst_port, "📥 已送达");
            net.on_delivered(pkt, sim.now());
            return;
        }

        net.forward_from(self.id, pkt, sim);
    }
}
