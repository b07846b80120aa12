//! 流量矩阵生成
//!
//! 默认映射：第 k 条 flow 从右侧叶子 k 发往左侧叶子 `k mod left_count` 的地址。
//! 所有 flow 共享同一个活跃窗口；各自的 on 区间在生成时用种子化的 RNG 预先采样，
//! 相同输入（含种子）得到逐字节相同的 flow 列表。

use std::net::Ipv4Addr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::distribution::Distribution;
use crate::addr::AddressAssignment;
use crate::error::{Result, ScenarioError};
use crate::net::NodeId;
use crate::sim::SimTime;
use crate::sim::time::serde_millis;
use crate::topo::{DumbbellTopology, Side};

/// 右侧叶子多于左侧时如何选目的
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingPolicy {
    /// 目的下标按 `left_count` 取模
    #[default]
    Wrap,
    /// 要求 `right_count <= left_count`，严格一一对应
    Strict,
}

impl MappingPolicy {
    /// 第 `k` 条 flow 的目的叶子下标
    pub fn destination(self, k: usize, left_count: usize) -> Result<usize> {
        if left_count == 0 {
            return Err(ScenarioError::FlowMapping(format!(
                "flow {k} has no left leaf to target"
            )));
        }
        match self {
            MappingPolicy::Wrap => Ok(k % left_count),
            MappingPolicy::Strict if k < left_count => Ok(k),
            MappingPolicy::Strict => Err(ScenarioError::FlowMapping(format!(
                "flow {k} has no matching left leaf (left side has {left_count}) under strict mapping"
            ))),
        }
    }
}

/// 活跃窗口 `[start, stop]`（仿真时间）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    #[serde(rename = "start_ms", with = "serde_millis")]
    pub start: SimTime,
    #[serde(rename = "stop_ms", with = "serde_millis")]
    pub stop: SimTime,
}

impl Default for ActiveWindow {
    fn default() -> Self {
        Self {
            start: SimTime::ZERO,
            stop: SimTime::from_secs(10),
        }
    }
}

impl ActiveWindow {
    pub fn new(start: SimTime, stop: SimTime) -> Self {
        Self { start, stop }
    }
}

/// 一个 on 区间 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnPeriod {
    pub start: SimTime,
    pub end: SimTime,
}

impl OnPeriod {
    pub fn len(&self) -> SimTime {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// 流量参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficOpts {
    pub port: u16,
    pub window: ActiveWindow,
    pub on_time: Distribution,
    pub off_time: Distribution,
    pub seed: u64,
    pub mapping: MappingPolicy,
    /// on 状态下的发送速率
    pub data_rate_bps: u64,
    pub pkt_bytes: u32,
}

impl Default for TrafficOpts {
    fn default() -> Self {
        Self {
            port: 1000,
            window: ActiveWindow::default(),
            on_time: Distribution::default(),
            off_time: Distribution::default(),
            seed: 1,
            mapping: MappingPolicy::Wrap,
            data_rate_bps: 500_000,
            pkt_bytes: 512,
        }
    }
}

impl TrafficOpts {
    pub fn validate(&self) -> Result<()> {
        if self.window.start > self.window.stop {
            return Err(ScenarioError::config(format!(
                "active window starts at {:?} after it stops at {:?}",
                self.window.start, self.window.stop
            )));
        }
        self.on_time.validate()?;
        self.off_time.validate()?;
        if !self.on_time.can_be_nonzero() && !self.off_time.can_be_nonzero() {
            return Err(ScenarioError::config(
                "on and off time distributions can only produce zero durations",
            ));
        }
        if self.data_rate_bps == 0 || self.pkt_bytes == 0 {
            return Err(ScenarioError::config("data rate and packet size must be non-zero"));
        }
        Ok(())
    }
}

/// 一条 flow 的完整描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub id: u64,
    pub src: NodeId,
    /// 源叶子在右侧的下标
    pub src_index: usize,
    pub dst: NodeId,
    /// 目的叶子在左侧的下标
    pub dst_index: usize,
    pub dst_addr: Ipv4Addr,
    pub dst_port: u16,
    pub on_time: Distribution,
    pub off_time: Distribution,
    pub window: ActiveWindow,
    pub data_rate_bps: u64,
    pub pkt_bytes: u32,
    pub on_periods: Vec<OnPeriod>,
}

impl Flow {
    /// on 状态下相邻两个包的间隔（向上取整，至少 1ns）
    pub fn send_interval(&self) -> SimTime {
        let bits = self.pkt_bytes as u128 * 8;
        let rate = self.data_rate_bps.max(1) as u128;
        let nanos = (bits * 1_000_000_000 + rate - 1) / rate;
        SimTime((nanos.min(u64::MAX as u128) as u64).max(1))
    }

    /// 所有 on 区间的总时长
    pub fn on_duration(&self) -> SimTime {
        self.on_periods
            .iter()
            .fold(SimTime::ZERO, |acc, p| acc.saturating_add(p.len()))
    }
}

/// 单条 flow 在活跃窗口内最多允许的 off/on 轮数
pub const MAX_ON_OFF_CYCLES: usize = 1_000_000;

/// 从 `window.start` 开始先 off 再 on 交替采样，on 区间截断到窗口内。
fn sample_on_periods<R: Rng>(
    window: ActiveWindow,
    on_time: &Distribution,
    off_time: &Distribution,
    rng: &mut R,
) -> Result<Vec<OnPeriod>> {
    let mut periods = Vec::new();
    let mut cursor = window.start;
    let mut cycles = 0usize;
    while cursor < window.stop {
        cycles += 1;
        if cycles > MAX_ON_OFF_CYCLES {
            return Err(ScenarioError::config(format!(
                "on/off durations too short for window {:?}..{:?}: more than {MAX_ON_OFF_CYCLES} cycles per flow",
                window.start, window.stop
            )));
        }
        let off_for = off_time.sample(rng);
        let on_for = on_time.sample(rng);
        let start = cursor.saturating_add(off_for);
        if start >= window.stop {
            break;
        }
        let next = start.saturating_add(on_for);
        let end = next.min(window.stop);
        if end > start {
            periods.push(OnPeriod { start, end });
        }
        // 两次采样都为 0 时也要前进
        cursor = next.max(SimTime(cursor.0.saturating_add(1)));
    }
    Ok(periods)
}

/// 生成流量矩阵
#[tracing::instrument(skip_all, fields(port = opts.port, seed = opts.seed, mapping = ?opts.mapping))]
pub fn generate(
    topology: &DumbbellTopology,
    addresses: &AddressAssignment,
    opts: &TrafficOpts,
) -> Result<Vec<Flow>> {
    opts.validate()?;

    let left = topology.leaves(Side::Left);
    let right = topology.leaves(Side::Right);

    let mut flows = Vec::with_capacity(right.len());
    for (k, &src) in right.iter().enumerate() {
        let dst_index = opts.mapping.destination(k, left.len())?;
        let dst = left[dst_index];
        let dst_addr = addresses.leaf_address(dst).ok_or_else(|| {
            ScenarioError::FlowMapping(format!("left leaf {dst_index} ({dst}) has no address"))
        })?;

        // 每条 flow 使用独立的 ChaCha 流，互不影响
        let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);
        rng.set_stream(k as u64);
        let on_periods = sample_on_periods(opts.window, &opts.on_time, &opts.off_time, &mut rng)?;

        debug!(
            flow = k,
            dst_index,
            dst_addr = %dst_addr,
            periods = on_periods.len(),
            "生成 flow"
        );

        flows.push(Flow {
            id: k as u64,
            src,
            src_index: k,
            dst,
            dst_index,
            dst_addr,
            dst_port: opts.port,
            on_time: opts.on_time,
            off_time: opts.off_time,
            window: opts.window,
            data_rate_bps: opts.data_rate_bps,
            pkt_bytes: opts.pkt_bytes,
            on_periods,
        });
    }

    info!(flows = flows.len(), "🚦 流量矩阵生成完成");
    Ok(flows)
}
