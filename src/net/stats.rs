//! 统计信息
//!
//! 全局与逐 flow 的收发计数。

use std::collections::BTreeMap;

use crate::sim::SimTime;

/// 单条 flow 的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlowStats {
    pub sent_pkts: u64,
    pub sent_bytes: u64,
    pub delivered_pkts: u64,
    pub delivered_bytes: u64,
    /// 首/末个包的发送时刻
    pub first_tx: Option<SimTime>,
    pub last_tx: Option<SimTime>,
    pub first_rx: Option<SimTime>,
    pub last_rx: Option<SimTime>,
    /// 累计单程时延，用于求平均
    pub total_delay: SimTime,
}

impl FlowStats {
    pub fn mean_delay(&self) -> Option<SimTime> {
        (self.delivered_pkts > 0).then(|| SimTime(self.total_delay.0 / self.delivered_pkts))
    }
}

/// 网络统计信息
#[derive(Debug, Default, Clone)]
pub struct Stats {
    pub sent_pkts: u64,
    pub delivered_pkts: u64,
    pub delivered_bytes: u64,
    /// 目的地址无法解析或无路由而丢弃的包
    pub unroutable_pkts: u64,
    pub per_flow: BTreeMap<u64, FlowStats>,
}

impl Stats {
    pub fn flow(&self, flow_id: u64) -> Option<&FlowStats> {
        self.per_flow.get(&flow_id)
    }
}
