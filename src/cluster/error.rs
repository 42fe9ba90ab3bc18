// ABOUTME: Cluster lifecycle error types with SNAFU pattern.
// ABOUTME: Each fatal step carries context; kind() gives a stable taxonomy.

use std::path::PathBuf;
use std::time::Duration;

use snafu::Snafu;

use crate::cidr::CidrError;
use crate::cloud::CloudError;

/// The sort of cloud resource an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    SecurityGroup,
    Network,
    ExternalNetwork,
    Keypair,
    Image,
    Flavor,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResourceKind::SecurityGroup => "security group",
            ResourceKind::Network => "network",
            ResourceKind::ExternalNetwork => "external network",
            ResourceKind::Keypair => "keypair",
            ResourceKind::Image => "image",
            ResourceKind::Flavor => "flavor",
        };
        f.write_str(name)
    }
}

/// Fatal errors from cluster create and cleanup.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClusterError {
    #[snafu(display("{kind} '{name}' already exists; use a unique project name or run cleanup first"))]
    Collision { kind: ResourceKind, name: String },

    #[snafu(display("{kind} '{name}' not found"))]
    MissingDependency { kind: ResourceKind, name: String },

    #[snafu(display(
        "{count} instance(s) did not become active within {}s",
        timeout.as_secs()
    ))]
    StartupTimeout { timeout: Duration, count: usize },

    #[snafu(display(
        "instances still present {}s after termination was requested: {}",
        timeout.as_secs(),
        remaining.join(", ")
    ))]
    ConvergenceTimeout {
        timeout: Duration,
        remaining: Vec<String>,
    },

    #[snafu(display("cannot derive project subnet: {source}"))]
    InvalidCidr { source: CidrError },

    #[snafu(display("failed to save key material to {}: {source}", path.display()))]
    KeyMaterial {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("{step} failed: {source}"))]
    Cloud {
        step: &'static str,
        source: CloudError,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterErrorKind {
    /// A resource with a project-derived name already exists.
    Collision,
    /// An image, flavor or external network the cluster needs does not exist.
    MissingDependency,
    /// Instances did not start or terminate in time.
    Timeout,
    /// The cloud rejected or failed a request.
    Cloud,
    /// Local files could not be written.
    LocalState,
    /// The cluster layout cannot be realised (e.g. no usable subnet).
    InvalidSpec,
}

impl ClusterError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ClusterErrorKind {
        match self {
            ClusterError::Collision { .. } => ClusterErrorKind::Collision,
            ClusterError::MissingDependency { .. } => ClusterErrorKind::MissingDependency,
            ClusterError::StartupTimeout { .. } | ClusterError::ConvergenceTimeout { .. } => {
                ClusterErrorKind::Timeout
            }
            ClusterError::InvalidCidr { .. } => ClusterErrorKind::InvalidSpec,
            ClusterError::KeyMaterial { .. } => ClusterErrorKind::LocalState,
            ClusterError::Cloud { source, .. } => match source {
                CloudError::Timeout(..) => ClusterErrorKind::Timeout,
                _ => ClusterErrorKind::Cloud,
            },
        }
    }
}
