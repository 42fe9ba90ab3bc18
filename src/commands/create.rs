// ABOUTME: Create command implementation.
// ABOUTME: Prepares the project directory, then runs the cluster create sequence.

use super::{connect, emit_warnings};
use cirrus::cluster::Cluster;
use cirrus::config::ClusterSpec;
use cirrus::diagnostics::Diagnostics;
use cirrus::error::Result;
use cirrus::output::Output;
use cirrus::workspace;

pub async fn create(spec: ClusterSpec, mut output: Output) -> Result<()> {
    output.start_timer();

    let instances = spec.hosts.iter().map(|h| h.count).sum::<usize>();
    output.progress(&format!(
        "Creating cluster {} ({} instance(s))",
        spec.project, instances
    ));

    if let Some(backup) = workspace::prepare_project_dir(&spec, chrono::Local::now())? {
        output.progress(&format!(
            "  → Previous project directory moved to {}",
            backup.display()
        ));
    }

    output.progress("  → Connecting to OpenStack...");
    let cloud = connect(&spec).await?;

    let mut diag = Diagnostics::default();
    let result = Cluster::new(spec).create(&cloud, &mut diag).await;
    emit_warnings(&diag, &output);

    match result {
        Ok(cluster) => {
            for entry in cluster.roster() {
                match entry.public_address {
                    Some(public) => output.progress(&format!(
                        "  ✓ {} {} (public {})",
                        entry.name, entry.private_address, public
                    )),
                    None => output.progress(&format!("  ✓ {} {}", entry.name, entry.private_address)),
                }
            }
            output.success(&format!("Cluster {} created", cluster.project()));
            Ok(())
        }
        Err((cluster, e)) => {
            output.warning(&format!(
                "creation stopped at the {} step; run `cirrus cleanup {}` to remove what was created",
                cluster.stage(),
                cluster.project()
            ));
            Err(e.into())
        }
    }
}
