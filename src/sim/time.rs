//! 仿真时间类型
//!
//! 定义仿真时间及其单位转换，以及配置文件里按毫秒/微秒书写时间的 serde 适配。

use serde::{Deserialize, Serialize};

/// 仿真时间（纳秒）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);
    pub const MAX: SimTime = SimTime(u64::MAX);

    pub fn from_micros(us: u64) -> SimTime {
        SimTime(us.saturating_mul(1_000))
    }
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms.saturating_mul(1_000_000))
    }
    pub fn from_secs(s: u64) -> SimTime {
        SimTime(s.saturating_mul(1_000_000_000))
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1e9
    }

    pub fn saturating_add(self, other: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(other.0))
    }
}

/// 按某个单位书写的时间：整数倍时写成整数，否则写成小数，保证纳秒精度可往返。
mod unit {
    use super::SimTime;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Whole(u64),
        Fraction(f64),
    }

    pub fn serialize<S: Serializer>(t: &SimTime, nanos_per_unit: u64, s: S) -> Result<S::Ok, S::Error> {
        if t.0 % nanos_per_unit == 0 {
            s.serialize_u64(t.0 / nanos_per_unit)
        } else {
            s.serialize_f64(t.0 as f64 / nanos_per_unit as f64)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(nanos_per_unit: u64, d: D) -> Result<SimTime, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Whole(v) => Ok(SimTime(v.saturating_mul(nanos_per_unit))),
            Raw::Fraction(v) if v.is_finite() && v >= 0.0 => {
                let nanos = (v * nanos_per_unit as f64).round();
                if nanos >= u64::MAX as f64 {
                    Ok(SimTime::MAX)
                } else {
                    Ok(SimTime(nanos as u64))
                }
            }
            Raw::Fraction(v) => Err(<D::Error as serde::de::Error>::custom(format!("invalid duration {v}"))),
        }
    }
}

/// `#[serde(with = "serde_millis")]`：毫秒 <-> SimTime
pub mod serde_millis {
    use super::{SimTime, unit};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &SimTime, s: S) -> Result<S::Ok, S::Error> {
        unit::serialize(t, 1_000_000, s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SimTime, D::Error> {
        unit::deserialize(1_000_000, d)
    }
}

/// `#[serde(with = "serde_micros")]`：微秒 <-> SimTime
pub mod serde_micros {
    use super::{SimTime, unit};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &SimTime, s: S) -> Result<S::Ok, S::Error> {
        unit::serialize(t, 1_000, s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SimTime, D::Error> {
        unit::deserialize(1_000, d)
    }
}
