//! 链路类型
//!
//! 点对点双向链路：两个方向各自串行发送（FIFO，`busy_until`），共享带宽与传播时延参数。

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use super::id::NodeId;
use crate::sim::SimTime;
use crate::topo::LinkParams;

/// 网络链路
#[derive(Debug)]
pub struct Link {
    pub ends: [NodeId; 2],
    pub params: LinkParams,
    /// 以发送端下标区分的两个方向
    pub busy_until: [SimTime; 2],
    pub subnet: Option<Ipv4Net>,
    pub addrs: Option<[Ipv4Addr; 2]>,
}

impl Link {
    /// 创建新链路
    pub fn new(a: NodeId, b: NodeId, params: LinkParams) -> Self {
        Self {
            ends: [a, b],
            params,
            busy_until: [SimTime::ZERO; 2],
            subnet: None,
            addrs: None,
        }
    }

    /// `from` 作为发送端时的方向下标
    pub fn direction(&self, from: NodeId) -> Option<usize> {
        self.ends.iter().position(|&n| n == from)
    }

    /// 计算传输指定字节数所需的时间
    pub(crate) fn tx_time(&self, bytes: u32) -> SimTime {
        // ceil(bytes*8 / bps) 秒 -> 纳秒
        let bps = self.params.bandwidth_bps;
        if bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bits = (bytes as u128).saturating_mul(8);
        let nanos = (bits.saturating_mul(1_000_000_000u128) + (bps as u128 - 1)) / bps as u128;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }
}
