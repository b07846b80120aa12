//! 内存仿真驱动
//!
//! 把 [`SimEngine`] 落到离散事件核心上：`Simulator` 负责时钟与事件，`NetWorld` 负责网络。

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use tracing::{debug, info};

use super::api::SimEngine;
use super::id::{LinkId, NodeId};
use super::net_world::NetWorld;
use super::onoff::OnOffApp;
use super::stats::Stats;
use crate::sim::{SimTime, Simulator};
use crate::topo::{LinkParams, NodeRole};
use crate::traffic::Flow;

#[derive(Default)]
pub struct NetSim {
    pub sim: Simulator,
    pub world: NetWorld,
    stop_at: Option<SimTime>,
}

impl NetSim {
    /// 运行到 `stop_at` 为止，之后的事件不再执行
    pub fn with_stop(stop_at: SimTime) -> Self {
        Self {
            stop_at: Some(stop_at),
            ..Self::default()
        }
    }

    pub fn now(&self) -> SimTime {
        self.sim.now()
    }

    pub fn stats(&self) -> &Stats {
        &self.world.net.stats
    }
}

impl SimEngine for NetSim {
    fn create_node(&mut self, name: &str, role: NodeRole) -> NodeId {
        self.world.net.add_node(name, role)
    }

    fn create_link(&mut self, a: NodeId, b: NodeId, params: LinkParams) -> LinkId {
        self.world.net.connect(a, b, params)
    }

    fn assign_address(&mut self, link: LinkId, subnet: Ipv4Net) -> (Ipv4Addr, Ipv4Addr) {
        self.world.net.assign_address(link, subnet)
    }

    fn schedule_flow(&mut self, flow: &Flow) {
        let idx = self.world.apps.len();
        let app = OnOffApp::from_flow(flow, flow.src);
        if let Some((at, tick)) = app.first_tick(idx) {
            self.sim.schedule(at, tick);
        }
        debug!(flow_id = flow.id, periods = app.periods.len(), "调度 flow");
        self.world.apps.push(app);
    }

    fn populate_routing_tables(&mut self) {
        self.world.net.build_routes();
    }

    fn run(&mut self) {
        let until = self.stop_at.unwrap_or(SimTime::MAX);
        self.sim.run_until(until, &mut self.world);
        let stats = &self.world.net.stats;
        info!(
            now = ?self.sim.now(),
            sent = stats.sent_pkts,
            delivered = stats.delivered_pkts,
            unroutable = stats.unroutable_pkts,
            "仿真完成"
        );
    }

    fn reset(&mut self) {
        self.sim.reset();
        self.world = NetWorld::default();
    }
}
