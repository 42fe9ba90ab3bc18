// ABOUTME: Composable capability traits for cloud providers.
// ABOUTME: Defines SecurityGroupOps, NetworkOps, ComputeOps, KeypairOps, FloatingIpOps.

mod compute;
mod floating_ip;
mod keypair;
mod network;
pub(crate) mod sealed;
mod security_group;
mod shared_types;

pub use compute::ComputeOps;
pub use floating_ip::FloatingIpOps;
pub use keypair::KeypairOps;
pub use network::NetworkOps;
pub use security_group::SecurityGroupOps;
pub use shared_types::*;

/// Every capability the cluster lifecycle needs.
pub trait FullCloud: SecurityGroupOps + NetworkOps + ComputeOps + KeypairOps + FloatingIpOps {}

impl<T> FullCloud for T where
    T: SecurityGroupOps + NetworkOps + ComputeOps + KeypairOps + FloatingIpOps
{
}
