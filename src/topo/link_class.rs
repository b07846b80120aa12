//! 链路类别目录
//!
//! 三种固定的链路参数集：瓶颈链路、long 接入链路（高带宽高时延）、short 接入链路（低时延）。

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};
use crate::sim::SimTime;
use crate::sim::time::serde_micros;

/// 链路类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkClass {
    Bottleneck,
    Long,
    Short,
}

/// 链路参数：带宽 + 单向传播时延
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkParams {
    pub bandwidth_bps: u64,
    #[serde(rename = "delay_us", with = "serde_micros")]
    pub delay: SimTime,
}

impl LinkParams {
    pub fn new(bandwidth_bps: u64, delay: SimTime) -> Self {
        Self {
            bandwidth_bps,
            delay,
        }
    }

    pub fn mbps(mbps: u64, delay: SimTime) -> Self {
        Self::new(mbps.saturating_mul(1_000_000), delay)
    }
}

/// 链路类别目录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkClassCatalog {
    pub bottleneck: LinkParams,
    pub long: LinkParams,
    pub short: LinkParams,
}

impl Default for LinkClassCatalog {
    fn default() -> Self {
        Self {
            bottleneck: LinkParams::mbps(10, SimTime::from_millis(10)),
            long: LinkParams::mbps(100, SimTime::from_millis(50)),
            short: LinkParams::mbps(100, SimTime::from_millis(5)),
        }
    }
}

impl LinkClassCatalog {
    pub fn params(&self, class: LinkClass) -> LinkParams {
        match class {
            LinkClass::Bottleneck => self.bottleneck,
            LinkClass::Long => self.long,
            LinkClass::Short => self.short,
        }
    }

    /// 带宽为 0 的链路永远发不完一个包，直接拒绝。
    pub fn validate(&self) -> Result<()> {
        for class in [LinkClass::Bottleneck, LinkClass::Long, LinkClass::Short] {
            if self.params(class).bandwidth_bps == 0 {
                return Err(ScenarioError::config(format!(
                    "{class:?} link class has zero bandwidth"
                )));
            }
        }
        Ok(())
    }

    /// 为某一侧第 `index` 个叶子选择接入链路类别。
    ///
    /// `[0, long_count)` 为 Long，`[long_count, side_count)` 为 Short。
    pub fn class_for(index: usize, side_count: usize, long_count: usize) -> Result<LinkClass> {
        if long_count > side_count {
            return Err(ScenarioError::config(format!(
                "long link count {long_count} exceeds leaf count {side_count}"
            )));
        }
        if index >= side_count {
            return Err(ScenarioError::config(format!(
                "leaf index {index} out of range for side with {side_count} leaves"
            )));
        }
        Ok(if index < long_count {
            LinkClass::Long
        } else {
            LinkClass::Short
        })
    }
}
