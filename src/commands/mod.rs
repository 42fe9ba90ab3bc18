// ABOUTME: Command module aggregator for the cirrus CLI.
// ABOUTME: Shared spec loading and cloud connection plus the per-command handlers.

mod cleanup;
mod create;
mod roster;

pub use cleanup::cleanup;
pub use create::create;
pub use roster::roster;

use std::path::Path;

use cirrus::cloud::{OpenStackCloud, OpenStackSettings};
use cirrus::config::ClusterSpec;
use cirrus::diagnostics::Diagnostics;
use cirrus::error::Result;
use cirrus::output::Output;

/// Load the cluster spec from `file`, or discover it in `cwd`.
pub fn load_spec(cwd: &Path, file: Option<&Path>, project: Option<&str>) -> Result<ClusterSpec> {
    match file {
        Some(path) => ClusterSpec::load(path, project),
        None => ClusterSpec::discover(cwd, project),
    }
}

async fn connect(spec: &ClusterSpec) -> Result<OpenStackCloud> {
    let settings = OpenStackSettings::load(spec.platform_settings_file.as_deref())?;
    Ok(OpenStackCloud::connect(&settings).await?)
}

fn emit_warnings(diag: &Diagnostics, output: &Output) {
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }
}
