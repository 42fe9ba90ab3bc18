// ABOUTME: Error type shared by every cloud capability trait.
// ABOUTME: Distinguishes not-found from real failures so cleanup can skip gracefully.

use std::time::Duration;

/// Errors from cloud operations.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("cloud API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("instance {0} entered error state")]
    InstanceFailed(String),

    #[error("timed out after {0:?} waiting for {1}")]
    Timeout(Duration, String),
}

impl CloudError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        CloudError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::NotFound { .. })
    }
}
