//! 数据包到达事件

use super::net_world::NetWorld;
use super::{NodeId, Packet};
use crate::sim::{Event, Simulator, World};
use tracing::error;

/// 事件：数据包到达某节点
#[derive(Debug)]
pub struct DeliverPacket {
    pub to: NodeId,
    pub pkt: Packet,
}

impl Event for DeliverPacket {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let DeliverPacket { to, pkt } = *self;
        let Some(w) = world.as_any_mut().downcast_mut::<NetWorld>() else {
            error!("world must be NetWorld");
            return;
        };
        w.net.deliver(to, pkt, sim);
    }
}
