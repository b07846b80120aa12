//! 地址分配
//!
//! 三个互相独立推进的子网池（路由器互联 / 左侧 / 右侧），每条链路独占一个子网。

mod allocator;
mod pool;

pub use allocator::{AddressAssignment, AddressPlan, Endpoint, LinkAddressing, allocate};
pub use pool::{SubnetPool, classful_prefix_len};
