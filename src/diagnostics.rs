// ABOUTME: Diagnostics accumulator for non-fatal warnings during create and cleanup.
// ABOUTME: Collects warnings that shouldn't abort a phase but should be shown to users.

/// Collects non-fatal warnings during cluster operations.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of warnings of the given kind.
    pub fn count(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

/// A non-fatal warning collected during a cluster operation.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// Create a warning for a resource that was expected but absent.
    pub fn missing_resource(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::MissingResource,
            message: message.into(),
        }
    }

    /// Create a floating IP attach warning.
    pub fn floating_ip_attach(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::FloatingIpAttach,
            message: message.into(),
        }
    }

    /// Create a warning for a cleanup step the cloud refused.
    pub fn cleanup_failure(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::CleanupFailure,
            message: message.into(),
        }
    }

    /// Create a warning for an instance that reported no private address.
    pub fn missing_address(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::MissingAddress,
            message: message.into(),
        }
    }

    /// Create a warning about local key material.
    pub fn key_material(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::KeyMaterial,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during cluster operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A resource to look up or delete did not exist; the step was skipped.
    MissingResource,
    /// A floating IP could not be attached; the instance stays private.
    FloatingIpAttach,
    /// The cloud rejected a cleanup step; the resource may remain.
    CleanupFailure,
    /// An instance had no fixed address and was left out of the roster.
    MissingAddress,
    /// A reused keypair has no private key in the project directory.
    KeyMaterial,
}
