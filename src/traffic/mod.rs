//! 流量矩阵
//!
//! on/off 时长分布与“右侧叶子 -> 左侧叶子”的 flow 生成。

mod distribution;
mod matrix;

pub use distribution::Distribution;
pub use matrix::{ActiveWindow, Flow, MAX_ON_OFF_CYCLES, MappingPolicy, OnPeriod, TrafficOpts, generate};
