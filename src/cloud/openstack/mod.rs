// ABOUTME: OpenStack backend for the cloud capability traits.
// ABOUTME: Neutron for networking, Nova for compute and keypairs, Glance for images.

mod client;
mod models;
mod provider;
mod settings;

pub use settings::OpenStackSettings;

use client::Session;
use tracing::info;

use super::CloudError;
use super::traits::sealed::Sealed;

/// OpenStack connection holding a project-scoped token.
#[derive(Debug, Clone)]
pub struct OpenStackCloud {
    session: Session,
}

impl OpenStackCloud {
    /// Authenticate against Keystone and resolve service endpoints.
    pub async fn connect(settings: &OpenStackSettings) -> Result<Self, CloudError> {
        let session = Session::authenticate(settings).await?;
        info!(
            project = %settings.project_name,
            compute = %session.endpoints.compute,
            network = %session.endpoints.network,
            "connected to OpenStack"
        );
        Ok(Self { session })
    }

    fn network_url(&self, path: &str) -> String {
        format!("{}/{path}", self.session.endpoints.network)
    }

    fn compute_url(&self, path: &str) -> String {
        format!("{}/{path}", self.session.endpoints.compute)
    }

    fn image_url(&self, path: &str) -> String {
        format!("{}/{path}", self.session.endpoints.image)
    }
}

impl Sealed for OpenStackCloud {}
