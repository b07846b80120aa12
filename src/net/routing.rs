//! 全局路由
//!
//! 等价于一次性的“全局路由表填充”：在所有链路与地址就绪后，对每个目的节点在
//! 无向邻接图上做 BFS，记录每个节点朝目的方向的下一跳。dumbbell 是树，
//! 最短路径唯一；若出现等长候选，取编号最小者以保持确定性。

use std::collections::{HashMap, VecDeque};

use super::id::NodeId;

#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    built: bool,
    /// (from, dst) -> 下一跳
    next_hop: HashMap<(NodeId, NodeId), NodeId>,
}

impl RoutingTable {
    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn invalidate(&mut self) {
        self.built = false;
        self.next_hop.clear();
    }

    /// 基于当前邻接关系重建路由表。`adj[n]` 为节点 n 的所有邻居。
    pub fn build(&mut self, adj: &[Vec<NodeId>]) {
        let n = adj.len();
        self.next_hop.clear();

        let mut dist: Vec<u32> = vec![u32::MAX; n];
        let mut q: VecDeque<NodeId> = VecDeque::new();

        for dst_idx in 0..n {
            dist.fill(u32::MAX);
            q.clear();
            dist[dst_idx] = 0;
            q.push_back(NodeId(dst_idx));

            while let Some(v) = q.pop_front() {
                let dv = dist[v.0];
                for &u in &adj[v.0] {
                    if dist[u.0] == u32::MAX {
                        dist[u.0] = dv + 1;
                        q.push_back(u);
                    }
                }
            }

            for from_idx in 0..n {
                let df = dist[from_idx];
                if from_idx == dst_idx || df == u32::MAX {
                    continue;
                }
                let best = adj[from_idx]
                    .iter()
                    .copied()
                    .filter(|nh| dist[nh.0] == df - 1)
                    .min();
                if let Some(nh) = best {
                    self.next_hop.insert((NodeId(from_idx), NodeId(dst_idx)), nh);
                }
            }
        }

        self.built = true;
    }

    /// 查询 `from` 去往 `dst` 的下一跳
    pub fn next_hop(&self, from: NodeId, dst: NodeId) -> Option<NodeId> {
        self.next_hop.get(&(from, dst)).copied()
    }

    /// 沿路由表走出完整路径（含首尾）；不可达时返回 None。
    pub fn path(&self, src: NodeId, dst: NodeId) -> Option<Vec<NodeId>> {
        let mut path = vec![src];
        let mut at = src;
        while at != dst {
            at = self.next_hop(at, dst)?;
            path.push(at);
            if path.len() > self.next_hop.len() + 2 {
                return None;
            }
        }
        Some(path)
    }
}
