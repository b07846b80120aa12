//! 错误类型
//!
//! 场景构建流水线中所有阶段共享的错误定义。任一阶段失败都会直接中止整个构建。

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;
use thiserror::Error;

use crate::net::LinkId;

/// 子网池的种类（路由器互联 / 左侧 / 右侧）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Router,
    Left,
    Right,
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PoolKind::Router => "router",
            PoolKind::Left => "left",
            PoolKind::Right => "right",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// 参数不合法：叶子数为 0、long 数超过叶子数、地址前缀不可用等
    #[error("configuration error: {0}")]
    Configuration(String),

    /// 基础前缀无法提供足够多互不重叠的子网
    #[error("address space exhausted in {pool} pool ({base}): {detail}")]
    AddressSpaceExhausted {
        pool: PoolKind,
        base: Ipv4Net,
        detail: String,
    },

    /// 按映射策略无法为某条 flow 找到目的叶子
    #[error("flow mapping error: {0}")]
    FlowMapping(String),

    /// 仿真引擎分配的地址与规划不一致
    #[error("engine assigned {got:?} to {link}, planned {expected:?}")]
    AddressMismatch {
        link: LinkId,
        expected: (Ipv4Addr, Ipv4Addr),
        got: (Ipv4Addr, Ipv4Addr),
    },
}

impl ScenarioError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        ScenarioError::Configuration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ScenarioError>;
