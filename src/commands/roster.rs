// ABOUTME: Roster command implementation.
// ABOUTME: Prints instance addresses and, optionally, resolved inventory groups.

use serde::Serialize;

use super::{connect, emit_warnings};
use cirrus::cluster::{Cluster, RosterEntry};
use cirrus::config::ClusterSpec;
use cirrus::diagnostics::Diagnostics;
use cirrus::error::Result;
use cirrus::inventory::{self, Inventory};
use cirrus::output::Output;

#[derive(Serialize)]
struct RosterReport<'a> {
    project: &'a str,
    instances: &'a [RosterEntry],
    #[serde(skip_serializing_if = "Option::is_none")]
    inventory: Option<Inventory>,
}

pub async fn roster(spec: ClusterSpec, vars: bool, output: Output) -> Result<()> {
    let cloud = connect(&spec).await?;

    let mut diag = Diagnostics::default();
    let cluster = Cluster::new(spec);
    let entries = cluster.discover_roster(&cloud, &mut diag).await?;
    emit_warnings(&diag, &output);

    let report = RosterReport {
        project: cluster.project().as_str(),
        instances: &entries,
        inventory: vars.then(|| inventory::resolve_inventory_hosts(cluster.spec(), &entries)),
    };
    output.data(&report)
}
