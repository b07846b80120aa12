//! 网络模拟模块
//!
//! 仿真引擎的能力接口 [`SimEngine`]，以及基于离散事件核心的内存实现 [`NetSim`]：
//! 节点、双向链路、接口地址表、最短路径路由与 on/off 发送器。

// 子模块声明
mod api;
mod deliver_packet;
mod id;
mod link;
mod net_world;
mod netsim;
mod network;
mod node;
mod onoff;
mod packet;
mod routing;
mod stats;

// 重新导出公共接口
pub use api::SimEngine;
pub use deliver_packet::DeliverPacket;
pub use id::{LinkId, NodeId};
pub use link::Link;
pub use net_world::NetWorld;
pub use netsim::NetSim;
pub use network::Network;
pub use node::{Node, SimNode};
pub use onoff::{OnOffApp, OnOffTick};
pub use packet::Packet;
pub use routing::RoutingTable;
pub use stats::{FlowStats, Stats};
