// ABOUTME: Cluster state marker types for the type state pattern.
// ABOUTME: Create and cleanup are only callable from states where they make sense.

use super::roster::RosterEntry;

/// Nothing provisioned by this run yet.
/// Available actions: `create()`, `cleanup()`, `discover_roster()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

/// Every instance is running.
/// Available actions: `roster()`, `cleanup()`
#[derive(Debug, Clone)]
pub struct Ready {
    pub(crate) roster: Vec<RosterEntry>,
}

/// Creation stopped partway; resources up to `stage` may exist.
/// Available actions: `stage()`, `cleanup()`
#[derive(Debug, Clone, Copy)]
pub struct Failed {
    pub(crate) stage: CreateStage,
}

/// Cleanup finished. Terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gone;

/// Step of the creation sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CreateStage {
    SecurityGroup,
    Network,
    Keypair,
    Instances,
    FloatingIps,
    Roster,
}

impl std::fmt::Display for CreateStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CreateStage::SecurityGroup => "security group",
            CreateStage::Network => "network",
            CreateStage::Keypair => "keypair",
            CreateStage::Instances => "instances",
            CreateStage::FloatingIps => "floating IPs",
            CreateStage::Roster => "roster",
        };
        f.write_str(name)
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Idle {}
    impl Sealed for super::Ready {}
    impl Sealed for super::Failed {}
}

/// States from which cleanup may run. `Gone` is deliberately excluded.
pub trait Cleanable: sealed::Sealed {}

impl Cleanable for Idle {}
impl Cleanable for Ready {}
impl Cleanable for Failed {}
