//! 数据包类型
//!
//! 逐跳路由的数据包：只携带源/目的，下一跳由路由表在每个节点上查出。

use std::net::Ipv4Addr;

use super::id::NodeId;
use crate::sim::SimTime;

/// 网络数据包
#[derive(Debug, Clone)]
pub struct Packet {
    pub id: u64,
    pub flow_id: u64,
    pub size_bytes: u32,
    pub src: NodeId,
    pub dst: NodeId,
    pub dst_addr: Ipv4Addr,
    pub dst_port: u16,
    pub sent_at: SimTime,
    pub hops: u32,
}

impl Packet {
    /// 经过一跳
    pub fn advance(mut self) -> Self {
        self.hops += 1;
        self
    }
}
