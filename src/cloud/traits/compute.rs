// ABOUTME: Compute operations trait for cloud providers.
// ABOUTME: Image and flavor lookup plus instance create, list, wait, delete.

use super::sealed::Sealed;
use super::shared_types::{Flavor, Image, Instance, InstanceConfig};
use crate::cloud::CloudError;
use crate::types::InstanceId;
use async_trait::async_trait;
use std::time::Duration;

/// Instance lifecycle operations.
#[async_trait]
pub trait ComputeOps: Sealed + Send + Sync {
    /// Images whose name matches exactly.
    async fn list_images_by_name(&self, name: &str) -> Result<Vec<Image>, CloudError>;

    /// Flavors whose name matches exactly.
    async fn list_flavors_by_name(&self, name: &str) -> Result<Vec<Flavor>, CloudError>;

    /// Request an instance. Returns as soon as the provider accepts it.
    async fn create_instance(&self, config: &InstanceConfig) -> Result<Instance, CloudError>;

    /// Every instance visible to the tenant, with current status and addresses.
    async fn list_instances(&self) -> Result<Vec<Instance>, CloudError>;

    /// Block until every instance in `ids` is active.
    ///
    /// Fails with [`CloudError::Timeout`] once `timeout` has passed and with
    /// [`CloudError::InstanceFailed`] if any instance enters an error state.
    async fn wait_until_running(
        &self,
        ids: &[InstanceId],
        poll: Duration,
        timeout: Duration,
    ) -> Result<Vec<Instance>, CloudError>;

    /// Request deletion. Deletion completes asynchronously.
    async fn delete_instance(&self, id: &InstanceId) -> Result<(), CloudError>;
}
