// ABOUTME: Generic cluster struct parameterized by state marker.
// ABOUTME: Holds the immutable spec and derived resource names across transitions.

use crate::config::ClusterSpec;
use crate::hosts::{self, InstanceIdentity};
use crate::types::ProjectName;

use super::error::ClusterError;
use super::names::ResourceNames;
use super::roster::RosterEntry;
use super::state::{CreateStage, Failed, Idle, Ready};

/// Result type for transitions that hand the cluster back on failure.
pub type TransitionResult<T, S> = Result<Cluster<T>, (Cluster<S>, ClusterError)>;

/// A cluster for one project, parameterized by its lifecycle state.
#[derive(Debug)]
pub struct Cluster<S> {
    pub(crate) spec: ClusterSpec,
    pub(crate) names: ResourceNames,
    pub(crate) state: S,
}

impl Cluster<Idle> {
    pub fn new(spec: ClusterSpec) -> Self {
        let names = ResourceNames::for_project(&spec.project);
        Cluster {
            spec,
            names,
            state: Idle,
        }
    }
}

impl<S> Cluster<S> {
    /// Internal helper to move into the next state.
    pub(crate) fn transition<T>(self, state: T) -> Cluster<T> {
        Cluster {
            spec: self.spec,
            names: self.names,
            state,
        }
    }

    pub fn spec(&self) -> &ClusterSpec {
        &self.spec
    }

    pub fn project(&self) -> &ProjectName {
        &self.spec.project
    }

    pub fn names(&self) -> &ResourceNames {
        &self.names
    }

    /// Every instance the cluster spec calls for, in host order.
    pub fn expected_instances(&self) -> Vec<InstanceIdentity> {
        hosts::expand(&self.spec.project, &self.spec.hosts)
    }
}

impl Cluster<Ready> {
    pub fn roster(&self) -> &[RosterEntry] {
        &self.state.roster
    }
}

impl Cluster<Failed> {
    /// The step that failed; earlier steps may have left resources behind.
    pub fn stage(&self) -> CreateStage {
        self.state.stage
    }
}
