// ABOUTME: Cleanup command implementation.
// ABOUTME: Removes every cluster resource and fails if any step was refused.

use super::{connect, emit_warnings};
use cirrus::cluster::Cluster;
use cirrus::config::ClusterSpec;
use cirrus::diagnostics::{Diagnostics, WarningKind};
use cirrus::error::{Error, Result};
use cirrus::output::Output;

pub async fn cleanup(spec: ClusterSpec, mut output: Output) -> Result<()> {
    output.start_timer();
    output.progress(&format!("Cleaning up cluster {}", spec.project));

    output.progress("  → Connecting to OpenStack...");
    let cloud = connect(&spec).await?;

    let mut diag = Diagnostics::default();
    let result = Cluster::new(spec).cleanup(&cloud, &mut diag).await;
    emit_warnings(&diag, &output);

    let cluster = result?;

    let failures = diag.count(WarningKind::CleanupFailure);
    if failures > 0 {
        return Err(Error::IncompleteCleanup(failures));
    }

    output.success(&format!("Cluster {} cleaned up", cluster.project()));
    Ok(())
}
