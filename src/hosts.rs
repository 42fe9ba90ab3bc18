// ABOUTME: Expands host specs into the concrete, ordered instance roster.
// ABOUTME: The only place instance names are derived; every phase goes through it.

use serde::Serialize;

use crate::config::HostSpec;
use crate::types::ProjectName;

/// One concrete instance derived from a host spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InstanceIdentity {
    pub host: String,
    pub position: usize,
    pub full_name: String,
    /// Name without the project prefix, as used in inventories.
    pub inventory_name: String,
}

/// Expand `hosts` into instance identities: host order first, then position.
///
/// A host with `count == 1` yields `<project>-<host>`; larger counts yield
/// `<project>-<host>_1` through `<project>-<host>_<count>`.
pub fn expand<'a, I>(project: &ProjectName, hosts: I) -> Vec<InstanceIdentity>
where
    I: IntoIterator<Item = &'a HostSpec>,
{
    let mut roster = Vec::new();

    for host in hosts {
        for position in 0..host.count {
            let inventory_name = if host.count > 1 {
                format!("{}_{}", host.name, position + 1)
            } else {
                host.name.clone()
            };

            roster.push(InstanceIdentity {
                host: host.name.clone(),
                position,
                full_name: format!("{}-{}", project, inventory_name),
                inventory_name,
            });
        }
    }

    roster
}

/// Find the identity of `host` at `position` in an expanded roster.
pub fn find<'a>(
    roster: &'a [InstanceIdentity],
    host: &str,
    position: usize,
) -> Option<&'a InstanceIdentity> {
    roster
        .iter()
        .find(|identity| identity.host == host && identity.position == position)
}
