// ABOUTME: Application-wide error types for cirrus.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::cloud::CloudError;
use crate::cluster::ClusterError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("cloud error: {0}")]
    Cloud(#[from] CloudError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("cleanup finished with {0} failed step(s); re-run cleanup to retry")]
    IncompleteCleanup(usize),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
