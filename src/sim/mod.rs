//! 仿真核心模块
//!
//! 离散事件仿真引擎：仿真时间、事件、世界和仿真器。场景构建本身不依赖这里，
//! 只有内置的 `NetSim` 驱动会用它来真正跑一遍时间线。

mod simulator;
pub mod time;

pub use simulator::{Event, Simulator, World};
pub use time::SimTime;
