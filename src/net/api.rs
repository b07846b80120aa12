//! Capability interface of the simulation engine.
//!
//! Scenario installation only talks to the engine through this trait, so the
//! scenario pipeline can be exercised against an in-memory fake as well as
//! against [`super::NetSim`].

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use super::{LinkId, NodeId};
use crate::topo::{LinkParams, NodeRole};
use crate::traffic::Flow;

/// Minimal engine API consumed by [`crate::scenario::Scenario::install`].
pub trait SimEngine {
    fn create_node(&mut self, name: &str, role: NodeRole) -> NodeId;
    fn create_link(&mut self, a: NodeId, b: NodeId, params: LinkParams) -> LinkId;
    /// Enable `subnet` on `link`; returns the addresses of its two endpoints,
    /// in the order the endpoints were passed to `create_link`.
    fn assign_address(&mut self, link: LinkId, subnet: Ipv4Net) -> (Ipv4Addr, Ipv4Addr);
    /// `flow.src` is already translated to this engine's node id.
    fn schedule_flow(&mut self, flow: &Flow);
    /// Called once, after every link and address exists.
    fn populate_routing_tables(&mut self);
    /// Execute until no events remain or the stop time is reached.
    fn run(&mut self);
    /// Drop all nodes, links, flows and pending events and rewind the clock.
    fn reset(&mut self);
}
