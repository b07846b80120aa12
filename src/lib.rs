pub mod addr;
pub mod error;
pub mod net;
pub mod scenario;
pub mod sim;
pub mod topo;
pub mod traffic;

pub use error::{PoolKind, Result, ScenarioError};
pub use scenario::{Installed, Scenario, ScenarioConfig};

#[cfg(test)]
mod test;
