// ABOUTME: Cluster lifecycle using the type state pattern.
// ABOUTME: Exports state markers, the Cluster struct, roster, and error types.

mod cache;
mod cleanup;
mod create;
mod error;
pub mod keys;
mod lifecycle;
mod names;
mod roster;
mod state;

pub use cache::RunCache;
pub use create::default_rules;
pub use error::{ClusterError, ClusterErrorKind, ResourceKind};
pub use lifecycle::{Cluster, TransitionResult};
pub use names::ResourceNames;
pub use roster::{RosterEntry, build_roster};
pub use state::{Cleanable, CreateStage, Failed, Gone, Idle, Ready};
