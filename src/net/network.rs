//! 网络拓扑管理
//!
//! 持有节点、链路、接口地址表与路由表，负责逐跳转发与统计。

use std::collections::HashMap;
use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use tracing::{debug, trace, warn};

use super::deliver_packet::DeliverPacket;
use super::id::{LinkId, NodeId};
use super::link::Link;
use super::node::{Node, SimNode};
use super::packet::Packet;
use super::routing::RoutingTable;
use super::stats::Stats;
use crate::sim::{SimTime, Simulator};
use crate::topo::{LinkParams, NodeRole};

/// 网络拓扑
#[derive(Default)]
pub struct Network {
    nodes: Vec<Option<Box<dyn Node>>>,
    links: Vec<Link>,
    edges: HashMap<(NodeId, NodeId), LinkId>,
    ifaces: HashMap<Ipv4Addr, NodeId>,
    routing: RoutingTable,
    next_pkt_id: u64,
    pub stats: Stats,
}

impl Network {
    pub fn add_node(&mut self, name: impl Into<String>, role: NodeRole) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Box::new(SimNode::new(id, name, role))));
        self.routing.invalidate();
        id
    }

    /// 连接两个节点（创建双向链路）
    pub fn connect(&mut self, a: NodeId, b: NodeId, params: LinkParams) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(Link::new(a, b, params));
        self.edges.insert((a, b), id);
        self.edges.insert((b, a), id);
        self.routing.invalidate();
        id
    }

    /// 在链路上启用子网：两端依次拿到子网内第一、第二个可用地址。
    pub fn assign_address(&mut self, link: LinkId, subnet: Ipv4Net) -> (Ipv4Addr, Ipv4Addr) {
        let base = u32::from(subnet.network());
        let pair = [Ipv4Addr::from(base + 1), Ipv4Addr::from(base + 2)];
        let l = &mut self.links[link.0];
        for (end, addr) in l.ends.iter().zip(pair) {
            if let Some(prev) = self.ifaces.insert(addr, *end) {
                warn!(addr = %addr, prev = ?prev, now = ?end, "接口地址被覆盖");
            }
        }
        l.subnet = Some(subnet);
        l.addrs = Some(pair);
        debug!(link = ?link, subnet = %subnet, a = %pair[0], b = %pair[1], "分配接口地址");
        (pair[0], pair[1])
    }

    /// 地址 -> 持有该接口的节点
    pub fn resolve(&self, addr: Ipv4Addr) -> Option<NodeId> {
        self.ifaces.get(&addr).copied()
    }

    /// 节点在投递过程中会被暂时取出，此时返回 None
    pub fn node(&self, id: NodeId) -> Option<&dyn Node> {
        self.nodes.get(id.0)?.as_deref()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link_between(&self, a: NodeId, b: NodeId) -> Option<LinkId> {
        self.edges.get(&(a, b)).copied()
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    /// 计算全局路由表
    pub fn build_routes(&mut self) {
        let mut adj: Vec<Vec<NodeId>> = vec![Vec::new(); self.nodes.len()];
        for link in &self.links {
            let [a, b] = link.ends;
            adj[a.0].push(b);
            adj[b.0].push(a);
        }
        self.routing.build(&adj);
        debug!(nodes = adj.len(), links = self.links.len(), "路由表已填充");
    }

    /// 创建数据包；目的地址无法解析时返回 None
    pub fn make_packet(
        &mut self,
        flow_id: u64,
        src: NodeId,
        dst_addr: Ipv4Addr,
        dst_port: u16,
        size_bytes: u32,
        now: SimTime,
    ) -> Option<Packet> {
        let dst = self.resolve(dst_addr)?;
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        Some(Packet {
            id,
            flow_id,
            size_bytes,
            src,
            dst,
            dst_addr,
            dst_port,
            sent_at: now,
            hops: 0,
        })
    }

    /// 将数据包交付给节点处理
    #[tracing::instrument(skip(self, sim), fields(pkt_id = pkt.id, to = ?to))]
    pub fn deliver(&mut self, to: NodeId, pkt: Packet, sim: &mut Simulator) {
        // 暂时把节点取出来，避免 &mut self 与 &mut node 的重叠借用。
        let Some(mut node) = self.nodes.get_mut(to.0).and_then(Option::take) else {
            warn!("目标节点不存在，丢弃数据包");
            self.stats.unroutable_pkts += 1;
            return;
        };
        node.on_packet(pkt, sim, self);
        self.nodes[to.0] = Some(node);
    }

    /// 记录一次发送
    pub(crate) fn on_sent(&mut self, pkt: &Packet) {
        self.stats.sent_pkts += 1;
        let fs = self.stats.per_flow.entry(pkt.flow_id).or_default();
        fs.sent_pkts += 1;
        fs.sent_bytes += pkt.size_bytes as u64;
        fs.first_tx.get_or_insert(pkt.sent_at);
        fs.last_tx = Some(pkt.sent_at);
    }

    pub(crate) fn on_unroutable(&mut self, flow_id: u64) {
        trace!(flow_id, "无路由，丢弃");
        self.stats.unroutable_pkts += 1;
    }

    /// 从指定节点转发数据包
    #[tracing::instrument(skip(self, sim), fields(pkt_id = pkt.id, from = ?from, hops = pkt.hops))]
    pub fn forward_from(&mut self, from: NodeId, pkt: Packet, sim: &mut Simulator) {
        let Some(to) = self.routing.next_hop(from, pkt.dst) else {
            self.on_unroutable(pkt.flow_id);
            return;
        };
        let Some(link_id) = self.link_between(from, to) else {
            self.on_unroutable(pkt.flow_id);
            return;
        };
        let link = &mut self.links[link_id.0];
        let Some(dir) = link.direction(from) else {
            self.on_unroutable(pkt.flow_id);
            return;
        };

        let now = sim.now();
        let start = now.max(link.busy_until[dir]);
        let tx_time = link.tx_time(pkt.size_bytes);
        let depart = start.saturating_add(tx_time);
        link.busy_until[dir] = depart;
        let arrive = depart.saturating_add(link.params.delay);

        trace!(
            link_id = ?link_id,
            start = ?start,
            tx_time = ?tx_time,
            arrive = ?arrive,
            "计算传输时间"
        );

        sim.schedule(arrive, DeliverPacket { to, pkt: pkt.advance() });
    }

    /// 数据包送达目的地时的处理
    pub(crate) fn on_delivered(&mut self, pkt: Packet, now: SimTime) {
        self.stats.delivered_pkts += 1;
        self.stats.delivered_bytes += pkt.size_bytes as u64;

        let fs = self.stats.per_flow.entry(pkt.flow_id).or_default();
        fs.delivered_pkts += 1;
        fs.delivered_bytes += pkt.size_bytes as u64;
        fs.first_rx.get_or_insert(now);
        fs.last_rx = Some(now);
        fs.total_delay = fs.total_delay.saturating_add(now.saturating_sub(pkt.sent_at));
    }
}
