// ABOUTME: Test support utilities.
// ABOUTME: Provides tracing setup and cluster spec fixtures for integration tests.

use std::path::Path;
use std::sync::Once;

use cirrus::config::{ClusterSpec, CloudVarRule, HostSpec};
use cirrus::rules::IndexSelector;
use cirrus::types::ProjectName;
use nonempty::NonEmpty;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env()
            .add_directive("cirrus=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A host with a public IP on the given index.
#[allow(dead_code)]
pub fn public_host(name: &str, count: usize, index: IndexSelector) -> HostSpec {
    let mut host = HostSpec::new(name, count);
    host.cloud_vars.push(CloudVarRule {
        index,
        assign_public_ip: true,
    });
    host
}

/// `demo` project with a single bastion (public IP) and two workers.
#[allow(dead_code)]
pub fn demo_spec(projects_dir: &Path) -> ClusterSpec {
    let hosts = NonEmpty::from_vec(vec![
        public_host("bastion", 1, IndexSelector::All),
        HostSpec::new("worker", 2),
    ])
    .unwrap();
    let mut spec = ClusterSpec::new(ProjectName::new("demo").unwrap(), hosts);
    spec.projects_dir = projects_dir.to_path_buf();
    spec
}
