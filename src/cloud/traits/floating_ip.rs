// ABOUTME: Floating IP operations trait for cloud providers.
// ABOUTME: Allocate from the external network, attach to and detach from instances.

use super::sealed::Sealed;
use super::shared_types::{FloatingIp, FloatingIpConfig};
use crate::cloud::CloudError;
use crate::types::{FloatingIpId, InstanceId};
use async_trait::async_trait;

/// Floating IP operations.
#[async_trait]
pub trait FloatingIpOps: Sealed + Send + Sync {
    /// Allocate a public address from the external network.
    async fn create_floating_ip(&self, config: &FloatingIpConfig) -> Result<FloatingIp, CloudError>;

    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>, CloudError>;

    async fn attach_floating_ip(
        &self,
        instance: &InstanceId,
        floating_ip: &FloatingIp,
    ) -> Result<(), CloudError>;

    async fn detach_floating_ip(
        &self,
        instance: &InstanceId,
        floating_ip: &FloatingIp,
    ) -> Result<(), CloudError>;

    /// Release the address back to the pool.
    async fn delete_floating_ip(&self, id: &FloatingIpId) -> Result<(), CloudError>;
}
