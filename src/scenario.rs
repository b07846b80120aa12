//! 场景构建流水线
//!
//! 拓扑 -> 地址 -> 流量，严格按序执行；任一阶段失败即整体失败，不会产出半成品。
//! 构建结果是只读的描述，再通过 [`SimEngine`] 安装到具体的仿真引擎里。

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::addr::{AddressAssignment, AddressPlan, allocate};
use crate::error::{Result, ScenarioError};
use crate::net::{LinkId, NodeId, SimEngine};
use crate::topo::{DumbbellOpts, DumbbellTopology, LinkClassCatalog, build_dumbbell};
use crate::traffic::{Flow, TrafficOpts, generate};

/// 场景参数（可由 JSON 加载，缺省字段取默认值）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub topology: DumbbellOpts,
    pub links: LinkClassCatalog,
    pub addressing: AddressPlan,
    pub traffic: TrafficOpts,
}

impl ScenarioConfig {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// 完整的场景描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub config: ScenarioConfig,
    pub topology: DumbbellTopology,
    pub addresses: AddressAssignment,
    pub flows: Vec<Flow>,
}

/// 安装到引擎后，拓扑编号 -> 引擎编号的映射
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    pub nodes: Vec<NodeId>,
    pub links: Vec<LinkId>,
}

impl Installed {
    pub fn node(&self, topo_id: NodeId) -> NodeId {
        self.nodes[topo_id.0]
    }

    pub fn link(&self, topo_id: LinkId) -> LinkId {
        self.links[topo_id.0]
    }
}

impl Scenario {
    /// 依次运行拓扑构建、子网分配与流量矩阵生成
    #[tracing::instrument(skip_all)]
    pub fn build(config: &ScenarioConfig) -> Result<Self> {
        let topology = build_dumbbell(&config.topology, &config.links)?;
        let addresses = allocate(&topology, &config.addressing)?;
        let flows = generate(&topology, &addresses, &config.traffic)?;

        info!(
            nodes = topology.nodes.len(),
            links = topology.links.len(),
            flows = flows.len(),
            "✅ 场景构建完成"
        );

        Ok(Self {
            config: config.clone(),
            topology,
            addresses,
            flows,
        })
    }

    /// 把场景安装到引擎：节点、链路、地址、flow，最后填充一次路由表。
    ///
    /// 引擎返回的地址必须与规划一致，否则重置引擎并返回 [`ScenarioError::AddressMismatch`]。
    #[tracing::instrument(skip_all)]
    pub fn install<E: SimEngine + ?Sized>(&self, engine: &mut E) -> Result<Installed> {
        let nodes: Vec<NodeId> = self
            .topology
            .nodes
            .iter()
            .map(|n| engine.create_node(&n.name, n.role))
            .collect();

        let links: Vec<LinkId> = self
            .topology
            .links
            .iter()
            .map(|l| engine.create_link(nodes[l.a.0], nodes[l.b.0], l.params))
            .collect();

        for la in &self.addresses.links {
            let link = links[la.link.0];
            let expected = (la.a.addr, la.b.addr);
            let got = engine.assign_address(link, la.subnet);
            if got != expected {
                // 不把装了一半的场景留给引擎
                engine.reset();
                return Err(ScenarioError::AddressMismatch {
                    link: la.link,
                    expected,
                    got,
                });
            }
        }

        for flow in &self.flows {
            let mut f = flow.clone();
            f.src = nodes[flow.src.0];
            f.dst = nodes[flow.dst.0];
            engine.schedule_flow(&f);
        }

        engine.populate_routing_tables();
        debug!(nodes = nodes.len(), links = links.len(), "场景已安装");

        Ok(Installed { nodes, links })
    }
}
