// ABOUTME: Keypair operations trait for cloud providers.
// ABOUTME: The provider generates the key; the private half is returned once.

use super::sealed::Sealed;
use super::shared_types::{KeyMaterial, Keypair};
use crate::cloud::CloudError;
use async_trait::async_trait;

#[async_trait]
pub trait KeypairOps: Sealed + Send + Sync {
    async fn find_keypair_by_name(&self, name: &str) -> Result<Option<Keypair>, CloudError>;

    /// Have the provider generate a keypair and return its material.
    async fn create_keypair(&self, name: &str) -> Result<KeyMaterial, CloudError>;

    async fn delete_keypair(&self, name: &str) -> Result<(), CloudError>;
}
