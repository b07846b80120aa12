//! on/off 时长分布

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScenarioError};
use crate::sim::SimTime;
use crate::sim::time::serde_millis;

/// 时长分布。配置中以毫秒书写，采样结果精确到纳秒。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Distribution {
    /// 固定时长
    Constant {
        #[serde(rename = "value_ms", with = "serde_millis")]
        value: SimTime,
    },
    /// `[min, max]` 上的均匀分布
    Uniform {
        #[serde(rename = "min_ms", with = "serde_millis")]
        min: SimTime,
        #[serde(rename = "max_ms", with = "serde_millis")]
        max: SimTime,
    },
    /// 指数分布；`bound` 非零时按截断到 `[0, bound]` 的指数分布采样
    Exponential {
        #[serde(rename = "mean_ms", with = "serde_millis")]
        mean: SimTime,
        #[serde(rename = "bound_ms", with = "serde_millis", default)]
        bound: SimTime,
    },
}

impl Default for Distribution {
    fn default() -> Self {
        Distribution::Uniform {
            min: SimTime::ZERO,
            max: SimTime::from_secs(1),
        }
    }
}

impl Distribution {
    pub fn validate(&self) -> Result<()> {
        if let Distribution::Uniform { min, max } = self {
            if min > max {
                return Err(ScenarioError::config(format!(
                    "uniform distribution min {min:?} exceeds max {max:?}"
                )));
            }
        }
        Ok(())
    }

    /// 是否可能采出非零时长
    pub fn can_be_nonzero(&self) -> bool {
        match *self {
            Distribution::Constant { value } => value > SimTime::ZERO,
            Distribution::Uniform { max, .. } => max > SimTime::ZERO,
            Distribution::Exponential { mean, .. } => mean > SimTime::ZERO,
        }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> SimTime {
        match *self {
            Distribution::Constant { value } => value,
            Distribution::Uniform { min, max } => {
                if min >= max {
                    min
                } else {
                    SimTime(rng.gen_range(min.0..=max.0))
                }
            }
            Distribution::Exponential { mean, bound } => {
                if mean == SimTime::ZERO {
                    return SimTime::ZERO;
                }
                let mean = mean.0 as f64;
                let u: f64 = rng.gen_range(0.0..1.0);
                let x = if bound == SimTime::ZERO {
                    -mean * (-u).ln_1p()
                } else {
                    // 截断指数分布的逆 CDF：1 - e^{-bound/mean} 用 exp_m1 保留小比值的精度
                    let mass = -(-(bound.0 as f64) / mean).exp_m1();
                    (-mean * (-u * mass).ln_1p()).min(bound.0 as f64)
                };
                SimTime(x.round() as u64)
            }
        }
    }
}
