//! Dumbbell 拓扑构建
//!
//! 拓扑结构：
//!
//! ```text
//! left0 ─┐                       ┌─ right0
//! left1 ─┼─ r0 ══ bottleneck ══ r1 ─┼─ right1
//!  ...  ─┘                       └─ ...
//! ```
//!
//! 这里只生成节点/链路描述，不触碰任何仿真引擎；真正创建节点由
//! [`crate::scenario::Scenario::install`] 通过 [`crate::net::SimEngine`] 完成。

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::link_class::{LinkClass, LinkClassCatalog, LinkParams};
use crate::error::{Result, ScenarioError};
use crate::net::{LinkId, NodeId};

/// 左侧 / 右侧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// 该侧路由器在 `routers` 中的下标
    pub fn router_index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// 节点角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    Router,
    LeftLeaf,
    RightLeaf,
}

impl NodeRole {
    pub fn leaf(side: Side) -> Self {
        match side {
            Side::Left => NodeRole::LeftLeaf,
            Side::Right => NodeRole::RightLeaf,
        }
    }

    pub fn is_leaf(self) -> bool {
        !matches!(self, NodeRole::Router)
    }
}

/// Dumbbell 拓扑配置选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DumbbellOpts {
    pub left_count: usize,
    pub right_count: usize,
    pub left_long_count: usize,
    pub right_long_count: usize,
}

impl Default for DumbbellOpts {
    fn default() -> Self {
        Self {
            left_count: 6,
            right_count: 6,
            left_long_count: 3,
            right_long_count: 3,
        }
    }
}

impl DumbbellOpts {
    pub fn new(left_count: usize, right_count: usize, left_long_count: usize, right_long_count: usize) -> Self {
        Self {
            left_count,
            right_count,
            left_long_count,
            right_long_count,
        }
    }

    pub fn count(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left_count,
            Side::Right => self.right_count,
        }
    }

    pub fn long_count(&self, side: Side) -> usize {
        match side {
            Side::Left => self.left_long_count,
            Side::Right => self.right_long_count,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for side in [Side::Left, Side::Right] {
            let (count, long) = (self.count(side), self.long_count(side));
            if count == 0 {
                return Err(ScenarioError::config(format!("{side:?} side has no leaves")));
            }
            if long > count {
                return Err(ScenarioError::config(format!(
                    "{side:?} long link count {long} exceeds leaf count {count}"
                )));
            }
        }
        Ok(())
    }
}

/// 拓扑节点描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopoNode {
    pub id: NodeId,
    pub role: NodeRole,
    /// 在同角色节点中的序号
    pub index: usize,
    pub name: String,
}

/// 拓扑链路描述。接入链路 `a` 为叶子、`b` 为路由器；瓶颈链路 `a` 为 r0、`b` 为 r1。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopoLink {
    pub id: LinkId,
    pub a: NodeId,
    pub b: NodeId,
    pub class: LinkClass,
    pub params: LinkParams,
}

impl TopoLink {
    pub fn touches(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }
}

/// 构建完成的 dumbbell 拓扑
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumbbellTopology {
    pub opts: DumbbellOpts,
    pub nodes: Vec<TopoNode>,
    pub links: Vec<TopoLink>,
    pub routers: [NodeId; 2],
    pub bottleneck: LinkId,
    pub left_leaves: Vec<NodeId>,
    pub right_leaves: Vec<NodeId>,
    pub left_links: Vec<LinkId>,
    pub right_links: Vec<LinkId>,
}

impl DumbbellTopology {
    pub fn node(&self, id: NodeId) -> &TopoNode {
        &self.nodes[id.0]
    }

    pub fn link(&self, id: LinkId) -> &TopoLink {
        &self.links[id.0]
    }

    pub fn router(&self, side: Side) -> NodeId {
        self.routers[side.router_index()]
    }

    pub fn leaves(&self, side: Side) -> &[NodeId] {
        match side {
            Side::Left => &self.left_leaves,
            Side::Right => &self.right_leaves,
        }
    }

    pub fn access_links(&self, side: Side) -> &[LinkId] {
        match side {
            Side::Left => &self.left_links,
            Side::Right => &self.right_links,
        }
    }

    pub fn leaf(&self, side: Side, index: usize) -> Option<NodeId> {
        self.leaves(side).get(index).copied()
    }

    pub fn access_link(&self, side: Side, index: usize) -> Option<LinkId> {
        self.access_links(side).get(index).copied()
    }

    pub fn left_leaf(&self, index: usize) -> Option<NodeId> {
        self.leaf(Side::Left, index)
    }

    pub fn right_leaf(&self, index: usize) -> Option<NodeId> {
        self.leaf(Side::Right, index)
    }

    pub fn left_link(&self, index: usize) -> Option<LinkId> {
        self.access_link(Side::Left, index)
    }

    pub fn right_link(&self, index: usize) -> Option<LinkId> {
        self.access_link(Side::Right, index)
    }

    /// 节点的度（连接的链路数）
    pub fn degree(&self, node: NodeId) -> usize {
        self.links.iter().filter(|l| l.touches(node)).count()
    }
}

/// 构建 dumbbell 拓扑
///
/// 节点编号：r0, r1，然后左侧叶子，再右侧叶子；链路编号：瓶颈链路，然后左侧接入链路，
/// 再右侧接入链路。编号与插入顺序一致，后续地址分配与 flow 映射依赖这一点。
#[tracing::instrument(skip(catalog))]
pub fn build_dumbbell(opts: &DumbbellOpts, catalog: &LinkClassCatalog) -> Result<DumbbellTopology> {
    opts.validate()?;
    catalog.validate()?;

    let mut nodes = Vec::with_capacity(opts.left_count + opts.right_count + 2);
    let mut add_node = |role: NodeRole, index: usize, name: String| {
        let id = NodeId(nodes.len());
        nodes.push(TopoNode {
            id,
            role,
            index,
            name,
        });
        id
    };

    let routers = [
        add_node(NodeRole::Router, 0, "r0".to_string()),
        add_node(NodeRole::Router, 1, "r1".to_string()),
    ];
    let left_leaves: Vec<NodeId> = (0..opts.left_count)
        .map(|i| add_node(NodeRole::LeftLeaf, i, format!("left{i}")))
        .collect();
    let right_leaves: Vec<NodeId> = (0..opts.right_count)
        .map(|i| add_node(NodeRole::RightLeaf, i, format!("right{i}")))
        .collect();

    let mut links = Vec::with_capacity(opts.left_count + opts.right_count + 1);
    let mut add_link = |a: NodeId, b: NodeId, class: LinkClass| {
        let id = LinkId(links.len());
        links.push(TopoLink {
            id,
            a,
            b,
            class,
            params: catalog.params(class),
        });
        id
    };

    // r0 <-> r1 (bottleneck)
    let bottleneck = add_link(routers[0], routers[1], LinkClass::Bottleneck);

    let mut access = |side: Side, leaves: &[NodeId]| -> Result<Vec<LinkId>> {
        let router = routers[side.router_index()];
        let count = opts.count(side);
        let long = opts.long_count(side);
        let mut ids = Vec::with_capacity(count);
        for (i, &leaf) in leaves.iter().enumerate() {
            let class = LinkClassCatalog::class_for(i, count, long)?;
            debug!(side = ?side, index = i, class = ?class, "接入链路");
            ids.push(add_link(leaf, router, class));
        }
        Ok(ids)
    };
    let left_links = access(Side::Left, &left_leaves)?;
    let right_links = access(Side::Right, &right_leaves)?;

    info!(
        nodes = nodes.len(),
        links = links.len(),
        "🏗️  dumbbell 拓扑构建完成"
    );

    Ok(DumbbellTopology {
        opts: opts.clone(),
        nodes,
        links,
        routers,
        bottleneck,
        left_leaves,
        right_leaves,
        left_links,
        right_links,
    })
}
