//! 网络世界实现
//!
//! 仿真世界：持有网络拓扑与已调度的 on/off 发送器。

use super::network::Network;
use super::onoff::OnOffApp;
use crate::sim::World;
use std::any::Any;

#[derive(Default)]
pub struct NetWorld {
    pub net: Network,
    pub apps: Vec<OnOffApp>,
}

impl World for NetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
