//! 拓扑构建
//!
//! 链路类别目录与 dumbbell 拓扑构建器。

pub mod dumbbell;
pub mod link_class;

pub use dumbbell::{DumbbellOpts, DumbbellTopology, NodeRole, Side, TopoLink, TopoNode, build_dumbbell};
pub use link_class::{LinkClass, LinkClassCatalog, LinkParams};
