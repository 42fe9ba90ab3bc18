// ABOUTME: Cloud provider abstraction used by the cluster lifecycle.
// ABOUTME: Capability traits plus the OpenStack and in-memory backends.

mod error;
pub mod memory;
pub mod openstack;
pub mod traits;
pub mod wait;

pub use error::CloudError;
pub use memory::MemoryCloud;
pub use openstack::{OpenStackCloud, OpenStackSettings};
pub use traits::*;
