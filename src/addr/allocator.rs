//! 子网分配器
//!
//! 瓶颈链路从路由器池取一个子网；左右两侧的接入链路按叶子下标依次从各自的池中取子网。
//! 接入链路上叶子拿第一个可用地址、路由器拿第二个。游标只存在于一次 `allocate`
//! 调用内部，相同输入总是得到相同结果。

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::pool::{SubnetPool, nth_host};
use crate::error::{PoolKind, Result, ScenarioError};
use crate::net::{LinkId, NodeId};
use crate::topo::{DumbbellTopology, Side, TopoLink};

/// 三个基础前缀
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressPlan {
    pub router_base: Ipv4Net,
    pub left_base: Ipv4Net,
    pub right_base: Ipv4Net,
}

impl Default for AddressPlan {
    fn default() -> Self {
        let net = |c: u8| Ipv4Net::new(Ipv4Addr::new(10, c, 1, 0), 24).expect("/24 is a valid prefix");
        Self {
            router_base: net(3),
            left_base: net(1),
            right_base: net(2),
        }
    }
}

impl AddressPlan {
    pub fn base(&self, pool: PoolKind) -> Ipv4Net {
        match pool {
            PoolKind::Router => self.router_base,
            PoolKind::Left => self.left_base,
            PoolKind::Right => self.right_base,
        }
    }
}

/// 链路一端的地址
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub node: NodeId,
    pub addr: Ipv4Addr,
}

/// 一条链路的子网与两端地址；`a`/`b` 与拓扑中的链路端点一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAddressing {
    pub link: LinkId,
    pub pool: PoolKind,
    pub subnet: Ipv4Net,
    pub a: Endpoint,
    pub b: Endpoint,
}

/// 整个拓扑的地址分配结果，按 `LinkId` 排序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressAssignment {
    pub links: Vec<LinkAddressing>,
}

impl AddressAssignment {
    pub fn link_addressing(&self, id: LinkId) -> Option<&LinkAddressing> {
        self.links
            .get(id.0)
            .filter(|l| l.link == id)
            .or_else(|| self.links.iter().find(|l| l.link == id))
    }

    /// 叶子在其接入链路上的地址
    pub fn leaf_address(&self, leaf: NodeId) -> Option<Ipv4Addr> {
        self.links
            .iter()
            .filter(|l| l.pool != PoolKind::Router)
            .find(|l| l.a.node == leaf)
            .map(|l| l.a.addr)
    }

    /// 某节点的所有接口地址
    pub fn addresses_of(&self, node: NodeId) -> Vec<Ipv4Addr> {
        self.links
            .iter()
            .flat_map(|l| [l.a, l.b])
            .filter(|e| e.node == node)
            .map(|e| e.addr)
            .collect()
    }

    pub fn all_addresses(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.links.iter().flat_map(|l| [l.a.addr, l.b.addr])
    }

    pub fn subnets(&self, pool: PoolKind) -> Vec<Ipv4Net> {
        self.links
            .iter()
            .filter(|l| l.pool == pool)
            .map(|l| l.subnet)
            .collect()
    }
}

fn assign_link(pool: &mut SubnetPool, link: &TopoLink) -> Result<LinkAddressing> {
    let subnet = pool.next_subnet()?;
    let la = LinkAddressing {
        link: link.id,
        pool: pool.kind(),
        subnet,
        a: Endpoint {
            node: link.a,
            addr: nth_host(subnet, 1),
        },
        b: Endpoint {
            node: link.b,
            addr: nth_host(subnet, 2),
        },
    };
    debug!(link = ?link.id, subnet = %subnet, a = %la.a.addr, b = %la.b.addr, "分配子网");
    Ok(la)
}

/// 不同池切出的子网也不能重叠（例如左侧池一路推进到右侧基础前缀）
fn check_disjoint(links: &[LinkAddressing], plan: &AddressPlan) -> Result<()> {
    let span = |n: &Ipv4Net| {
        let start = u32::from(n.network()) as u64;
        (start, start + (1u64 << (32 - n.prefix_len())))
    };
    let mut sorted: Vec<&LinkAddressing> = links.iter().collect();
    sorted.sort_by_key(|l| span(&l.subnet));
    for pair in sorted.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if span(&prev.subnet).1 > span(&next.subnet).0 {
            let (culprit, other) = if prev.link > next.link { (prev, next) } else { (next, prev) };
            return Err(ScenarioError::AddressSpaceExhausted {
                pool: culprit.pool,
                base: plan.base(culprit.pool),
                detail: format!(
                    "subnet {} overlaps {} from the {} pool",
                    culprit.subnet, other.subnet, other.pool
                ),
            });
        }
    }
    Ok(())
}

/// 为拓扑中所有链路分配子网与地址
#[tracing::instrument(skip_all, fields(router = %plan.router_base, left = %plan.left_base, right = %plan.right_base))]
pub fn allocate(topology: &DumbbellTopology, plan: &AddressPlan) -> Result<AddressAssignment> {
    let mut router_pool = SubnetPool::new(PoolKind::Router, plan.router_base)?;
    let mut left_pool = SubnetPool::new(PoolKind::Left, plan.left_base)?;
    let mut right_pool = SubnetPool::new(PoolKind::Right, plan.right_base)?;

    router_pool.reserve(1)?;
    left_pool.reserve(topology.access_links(Side::Left).len())?;
    right_pool.reserve(topology.access_links(Side::Right).len())?;

    let mut links = Vec::with_capacity(topology.links.len());
    links.push(assign_link(&mut router_pool, topology.link(topology.bottleneck))?);
    for &id in topology.access_links(Side::Left) {
        links.push(assign_link(&mut left_pool, topology.link(id))?);
    }
    for &id in topology.access_links(Side::Right) {
        links.push(assign_link(&mut right_pool, topology.link(id))?);
    }

    check_disjoint(&links, plan)?;
    links.sort_by_key(|l| l.link);

    info!(subnets = links.len(), "🧮 地址分配完成");
    Ok(AddressAssignment { links })
}
