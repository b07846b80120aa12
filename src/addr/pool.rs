//! 子网池
//!
//! 从一个基础前缀出发，每次切出下一个同长度、互不重叠的子网。池的上界是基础前缀
//! 所在的有类网络（A 类 /8、B 类 /16、C 类 /24）；越界即视为地址空间耗尽。

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use crate::error::{PoolKind, Result, ScenarioError};

/// 点对点链路至少需要两个可用地址
const MAX_PREFIX_LEN: u8 = 30;

/// 有类网络的前缀长度；D/E 类地址返回 None
pub fn classful_prefix_len(addr: Ipv4Addr) -> Option<u8> {
    match addr.octets()[0] {
        0..=127 => Some(8),
        128..=191 => Some(16),
        192..=223 => Some(24),
        _ => None,
    }
}

/// 子网池（分配游标）
#[derive(Debug, Clone)]
pub struct SubnetPool {
    kind: PoolKind,
    base: Ipv4Net,
    /// 下一个子网的网络地址
    next: u64,
    /// 池的上界（不含）
    limit: u64,
    /// 每个子网的地址数
    block: u64,
}

impl SubnetPool {
    pub fn new(kind: PoolKind, base: Ipv4Net) -> Result<Self> {
        if base.addr() != base.network() {
            return Err(ScenarioError::config(format!(
                "{kind} base {base} has host bits set (network is {})",
                base.trunc()
            )));
        }
        if base.prefix_len() > MAX_PREFIX_LEN {
            return Err(ScenarioError::config(format!(
                "{kind} base {base} leaves fewer than two usable addresses per subnet"
            )));
        }
        let Some(class_len) = classful_prefix_len(base.network()) else {
            return Err(ScenarioError::config(format!(
                "{kind} base {base} is not a class A/B/C unicast network"
            )));
        };

        let enclosing = class_len.min(base.prefix_len());
        let enclosing_size = 1u64 << (32 - enclosing);
        let start = u32::from(base.network()) as u64;
        let enclosing_start = start & !(enclosing_size - 1);

        Ok(Self {
            kind,
            base,
            next: start,
            limit: enclosing_start + enclosing_size,
            block: 1u64 << (32 - base.prefix_len()),
        })
    }

    pub fn kind(&self) -> PoolKind {
        self.kind
    }

    pub fn base(&self) -> Ipv4Net {
        self.base
    }

    /// 剩余可切出的子网数
    pub fn remaining(&self) -> u64 {
        (self.limit - self.next) / self.block
    }

    /// 预先检查能否再切出 `needed` 个子网
    pub fn reserve(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if (needed as u64) > remaining {
            return Err(self.exhausted(format!(
                "{needed} subnets needed, only {remaining} fit before {}",
                Ipv4Addr::from(self.limit.min(u32::MAX as u64) as u32)
            )));
        }
        Ok(())
    }

    /// 切出下一个子网并推进游标
    pub fn next_subnet(&mut self) -> Result<Ipv4Net> {
        if self.next + self.block > self.limit {
            return Err(self.exhausted("no subnet left in the classful network".to_string()));
        }
        let net = Ipv4Addr::from(self.next as u32);
        let subnet = Ipv4Net::new(net, self.base.prefix_len())
            .map_err(|e| ScenarioError::config(format!("{} pool: {e}", self.kind)))?;
        self.next += self.block;
        Ok(subnet)
    }

    fn exhausted(&self, detail: String) -> ScenarioError {
        ScenarioError::AddressSpaceExhausted {
            pool: self.kind,
            base: self.base,
            detail,
        }
    }
}

/// 子网内第 `n` 个地址（n = 1 即第一个可用地址）
pub(crate) fn nth_host(subnet: Ipv4Net, n: u32) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(subnet.network()) + n)
}
