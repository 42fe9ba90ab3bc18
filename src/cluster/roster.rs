// ABOUTME: The address roster of a running cluster.
// ABOUTME: Built after create and rediscoverable later from live instances.

use std::collections::HashMap;
use std::net::IpAddr;

use serde::Serialize;
use snafu::ResultExt;
use tracing::{debug, info};

use crate::cloud::{ComputeOps, Instance, InstanceStatus};
use crate::diagnostics::{Diagnostics, Warning};
use crate::hosts::InstanceIdentity;

use super::error::{ClusterError, CloudSnafu};
use super::lifecycle::Cluster;

/// One instance with its addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub name: String,
    pub inventory_name: String,
    pub host: String,
    pub position: usize,
    pub private_address: IpAddr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_address: Option<IpAddr>,
}

impl RosterEntry {
    /// Address to reach the instance from outside: public when attached.
    pub fn reachable_address(&self) -> IpAddr {
        self.public_address.unwrap_or(self.private_address)
    }
}

/// Pair expected identities with live instances, in spec order.
///
/// Instances without a fixed address are reported and left out; instances
/// that do not exist (or are being deleted) are skipped. `attached` holds
/// floating addresses known to be attached that the listing may not show yet.
pub fn build_roster(
    expected: &[InstanceIdentity],
    live: &[Instance],
    attached: &HashMap<String, IpAddr>,
    diag: &mut Diagnostics,
) -> Vec<RosterEntry> {
    let mut roster = Vec::with_capacity(expected.len());

    for identity in expected {
        let Some(instance) = live
            .iter()
            .find(|i| i.name == identity.full_name && i.status != InstanceStatus::Deleting)
        else {
            debug!(instance = %identity.full_name, "instance not found");
            continue;
        };

        let Some(private_address) = instance.fixed_address() else {
            diag.warn(Warning::missing_address(format!(
                "instance {} has no private address; leaving it out of the roster",
                identity.full_name
            )));
            continue;
        };

        roster.push(RosterEntry {
            name: identity.full_name.clone(),
            inventory_name: identity.inventory_name.clone(),
            host: identity.host.clone(),
            position: identity.position,
            private_address,
            public_address: instance
                .floating_addresses()
                .into_iter()
                .next()
                .or_else(|| attached.get(&identity.full_name).copied()),
        });
    }

    roster
}

impl<S> Cluster<S> {
    /// Rebuild the roster from whatever instances of this cluster are running.
    pub async fn discover_roster<C: ComputeOps>(
        &self,
        cloud: &C,
        diag: &mut Diagnostics,
    ) -> Result<Vec<RosterEntry>, ClusterError> {
        let live = cloud
            .list_instances()
            .await
            .context(CloudSnafu {
                step: "list instances",
            })?;

        let roster = build_roster(&self.expected_instances(), &live, &HashMap::new(), diag);
        info!(project = %self.project(), instances = roster.len(), "discovered roster");
        Ok(roster)
    }
}
