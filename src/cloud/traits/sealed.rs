// ABOUTME: Sealed trait pattern for cloud capability traits.
// ABOUTME: Prevents external implementations, allowing non-breaking evolution.

/// Sealed trait to prevent external implementations.
///
/// Only the cloud backends shipped in this crate implement `Sealed`, so new
/// capability methods can be added without breaking downstream code.
pub trait Sealed {}
