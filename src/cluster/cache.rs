// ABOUTME: Per-run lookup cache for images, flavors, and the external network.
// ABOUTME: Each distinct name hits the cloud at most once per orchestrator run.

use std::collections::HashMap;

use tracing::debug;

use crate::cloud::{CloudError, ComputeOps, Flavor, Image, Network, NetworkOps};

/// Lookups memoised for the lifetime of one create run. Misses are cached too.
#[derive(Debug, Default)]
pub struct RunCache {
    images: HashMap<String, Option<Image>>,
    flavors: HashMap<String, Option<Flavor>>,
    external_networks: HashMap<String, Option<Network>>,
}

impl RunCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn image<C: ComputeOps>(
        &mut self,
        cloud: &C,
        name: &str,
    ) -> Result<Option<Image>, CloudError> {
        if let Some(hit) = self.images.get(name) {
            return Ok(hit.clone());
        }

        let found = cloud.list_images_by_name(name).await?.into_iter().next();
        debug!(image = name, found = found.is_some(), "resolved image");
        self.images.insert(name.to_string(), found.clone());
        Ok(found)
    }

    pub async fn flavor<C: ComputeOps>(
        &mut self,
        cloud: &C,
        name: &str,
    ) -> Result<Option<Flavor>, CloudError> {
        if let Some(hit) = self.flavors.get(name) {
            return Ok(hit.clone());
        }

        let found = cloud.list_flavors_by_name(name).await?.into_iter().next();
        debug!(flavor = name, found = found.is_some(), "resolved flavor");
        self.flavors.insert(name.to_string(), found.clone());
        Ok(found)
    }

    pub async fn external_network<C: NetworkOps>(
        &mut self,
        cloud: &C,
        name: &str,
    ) -> Result<Option<Network>, CloudError> {
        if let Some(hit) = self.external_networks.get(name) {
            return Ok(hit.clone());
        }

        let found = cloud.find_network_by_name(name).await?;
        debug!(network = name, found = found.is_some(), "resolved external network");
        self.external_networks
            .insert(name.to_string(), found.clone());
        Ok(found)
    }
}
