//! On/Off 发送器
//!
//! 每条 flow 对应一个发送器：在预先采样好的每个 on 区间内，按 `data_rate_bps`
//! 以固定间隔发出 `pkt_bytes` 大小的包；off 区间静默。

use std::net::Ipv4Addr;

use tracing::{debug, error};

use super::id::NodeId;
use super::net_world::NetWorld;
use crate::sim::{Event, SimTime, Simulator, World};
use crate::traffic::{Flow, OnPeriod};

/// 已调度到引擎中的 flow
#[derive(Debug, Clone)]
pub struct OnOffApp {
    pub flow_id: u64,
    pub src: NodeId,
    pub dst_addr: Ipv4Addr,
    pub dst_port: u16,
    pub pkt_bytes: u32,
    /// 相邻两个包的发送间隔
    pub interval: SimTime,
    pub periods: Vec<OnPeriod>,
}

impl OnOffApp {
    /// `src` 为引擎内的节点编号（可能与拓扑描述中的编号不同）
    pub fn from_flow(flow: &Flow, src: NodeId) -> Self {
        Self {
            flow_id: flow.id,
            src,
            dst_addr: flow.dst_addr,
            dst_port: flow.dst_port,
            pkt_bytes: flow.pkt_bytes,
            interval: flow.send_interval(),
            periods: flow.on_periods.clone(),
        }
    }

    /// 第一次发送的事件
    pub fn first_tick(&self, app: usize) -> Option<(SimTime, OnOffTick)> {
        self.slot_from(SimTime::ZERO, 0)
            .map(|(at, period)| (at, OnOffTick { app, period }))
    }

    /// 在 `now` 发完一个包之后，下一次发送的时间与区间
    fn next_after(&self, now: SimTime, period: usize) -> Option<(SimTime, usize)> {
        self.slot_from(now.saturating_add(self.interval), period)
    }

    /// 从第 `period` 个区间起，找到第一个能容纳 `at`（或其后起点）的 on 区间；
    /// 发送时刻总在 `[start, end)` 内，没有剩余区间时停止。
    fn slot_from(&self, at: SimTime, period: usize) -> Option<(SimTime, usize)> {
        self.periods
            .iter()
            .enumerate()
            .skip(period)
            .map(|(i, p)| (p.start.max(at), i, p.end))
            .find(|&(t, _, end)| t < end)
            .map(|(t, i, _)| (t, i))
    }
}

/// 事件：发送器在当前 on 区间内发出一个包
#[derive(Debug)]
pub struct OnOffTick {
    pub app: usize,
    pub period: usize,
}

impl Event for OnOffTick {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let OnOffTick { app, period } = *self;
        let Some(w) = world.as_any_mut().downcast_mut::<NetWorld>() else {
            error!("world must be NetWorld");
            return;
        };
        let Some(a) = w.apps.get(app) else {
            error!(app, "unknown on/off app");
            return;
        };

        let now = sim.now();
        match w
            .net
            .make_packet(a.flow_id, a.src, a.dst_addr, a.dst_port, a.pkt_bytes, now)
        {
            Some(pkt) => {
                w.net.on_sent(&pkt);
                w.net.forward_from(a.src, pkt, sim);
            }
            None => {
                debug!(flow_id = a.flow_id, dst = %a.dst_addr, "目的地址未分配");
                w.net.on_unroutable(a.flow_id);
            }
        }

        if let Some((at, period)) = a.next_after(now, period) {
            sim.schedule(at, OnOffTick { app, period });
        }
    }
}
