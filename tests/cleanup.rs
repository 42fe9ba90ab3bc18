// ABOUTME: Integration tests for cluster cleanup against the in-memory cloud.
// ABOUTME: Verifies full teardown, idempotence, partial clusters, and stuck terminations.

mod support;

use std::time::Duration;

use cirrus::cloud::MemoryCloud;
use cirrus::cluster::{Cluster, ClusterError, ClusterErrorKind};
use cirrus::diagnostics::{Diagnostics, WarningKind};

use support::demo_spec;

async fn created(cloud: &MemoryCloud, dir: &std::path::Path) {
    let mut diag = Diagnostics::default();
    Cluster::new(demo_spec(dir))
        .create(cloud, &mut diag)
        .await
        .map_err(|(_, e)| e)
        .unwrap();
}

mod teardown {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn removes_everything_create_made() {
        support::init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        created(&cloud, dir.path()).await;

        let mut diag = Diagnostics::default();
        Cluster::new(demo_spec(dir.path()))
            .cleanup(&cloud, &mut diag)
            .await
            .unwrap();

        assert!(cloud.is_clean_of("demo"));
        assert_eq!(cloud.port_count(), 0);
        assert_eq!(diag.count(WarningKind::CleanupFailure), 0);
        assert_eq!(diag.count(WarningKind::MissingResource), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn leaves_shared_resources_alone() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        created(&cloud, dir.path()).await;

        let mut diag = Diagnostics::default();
        Cluster::new(demo_spec(dir.path()))
            .cleanup(&cloud, &mut diag)
            .await
            .unwrap();

        assert_eq!(cloud.security_group_names(), ["default"]);
        assert_eq!(cloud.network_names(), ["ext-net"]);
    }

    #[tokio::test(start_paused = true)]
    async fn other_projects_survive() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        created(&cloud, dir.path()).await;

        let mut other = demo_spec(dir.path());
        other.project = cirrus::types::ProjectName::new("other").unwrap();
        let mut diag = Diagnostics::default();
        Cluster::new(other)
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        let mut diag = Diagnostics::default();
        Cluster::new(demo_spec(dir.path()))
            .cleanup(&cloud, &mut diag)
            .await
            .unwrap();

        assert!(!cloud.network_names().contains(&"demo_network".to_string()));
        assert_eq!(cloud.keypair_names(), ["other_ssh"]);
        assert_eq!(
            cloud.instance_names(),
            ["other-bastion", "other-worker_1", "other-worker_2"]
        );
        assert_eq!(cloud.instances_with_floating_ip(), ["other-bastion"]);
    }
}

mod idempotence {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn create_after_cleanup_rebuilds_same_roster() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();

        let mut diag = Diagnostics::default();
        let first = Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();
        let first_names: Vec<String> = first.roster().iter().map(|e| e.name.clone()).collect();

        first.cleanup(&cloud, &mut diag).await.unwrap();

        let second = Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();
        let second_names: Vec<String> = second.roster().iter().map(|e| e.name.clone()).collect();

        assert_eq!(first_names, second_names);
        assert_eq!(cloud.subnet_cidrs(), ["10.1.100.0/24"]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_cloud_only_warns() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();

        let mut diag = Diagnostics::default();
        let result = Cluster::new(demo_spec(dir.path()))
            .cleanup(&cloud, &mut diag)
            .await;

        assert!(result.is_ok());
        assert!(diag.count(WarningKind::MissingResource) > 0);
        assert!(
            diag.warnings()
                .iter()
                .all(|w| w.kind == WarningKind::MissingResource)
        );
        assert_eq!(cloud.call_count("delete_instance"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn second_cleanup_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        created(&cloud, dir.path()).await;

        let mut first = Diagnostics::default();
        Cluster::new(demo_spec(dir.path()))
            .cleanup(&cloud, &mut first)
            .await
            .unwrap();

        let mut second = Diagnostics::default();
        Cluster::new(demo_spec(dir.path()))
            .cleanup(&cloud, &mut second)
            .await
            .unwrap();

        assert!(cloud.is_clean_of("demo"));
        assert_eq!(second.count(WarningKind::CleanupFailure), 0);
        assert!(second.count(WarningKind::MissingResource) >= 4);
    }
}

mod partial {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn failed_create_can_be_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::new()
            .with_image("Ubuntu 14.04.2_20150505")
            .with_flavor("m1.medium");

        let mut diag = Diagnostics::default();
        let (failed, _) = Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .unwrap_err();
        assert!(cloud.network_names().contains(&"demo_network".to_string()));

        let mut diag = Diagnostics::default();
        failed.cleanup(&cloud, &mut diag).await.unwrap();

        assert!(cloud.is_clean_of("demo"));
        assert!(cloud.subnet_cidrs().is_empty());
        assert_eq!(diag.count(WarningKind::CleanupFailure), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn instances_left_by_a_startup_timeout_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard().instances_never_start();
        let mut spec = demo_spec(dir.path());
        spec.vm_management.hosts_startup_timeout = Duration::from_secs(20);

        let mut diag = Diagnostics::default();
        let (failed, _) = Cluster::new(spec)
            .create(&cloud, &mut diag)
            .await
            .unwrap_err();
        assert_eq!(cloud.instance_names().len(), 3);

        let mut diag = Diagnostics::default();
        failed.cleanup(&cloud, &mut diag).await.unwrap();

        assert!(cloud.is_clean_of("demo"));
        assert_eq!(cloud.call_count("delete_instance"), 3);
    }
}

mod convergence {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn stuck_termination_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard().deletes_never_converge();
        created(&cloud, dir.path()).await;

        let mut spec = demo_spec(dir.path());
        spec.vm_management.terminate_timeout = Duration::from_secs(60);

        let mut diag = Diagnostics::default();
        let err = Cluster::new(spec)
            .cleanup(&cloud, &mut diag)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ClusterErrorKind::Timeout);
        let ClusterError::ConvergenceTimeout { remaining, .. } = err else {
            panic!("expected convergence timeout");
        };
        assert_eq!(remaining.len(), 3);

        // the network is never touched while instances linger
        assert_eq!(cloud.call_count("delete_network"), 0);
        assert!(cloud.router_names().contains(&"demo_network_router".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_listing_during_termination_wait_keeps_polling() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        created(&cloud, dir.path()).await;

        // floating IP release and the termination pass list once each
        cloud.fail_instance_listing_after(2);

        let mut diag = Diagnostics::default();
        Cluster::new(demo_spec(dir.path()))
            .cleanup(&cloud, &mut diag)
            .await
            .unwrap();

        assert!(cloud.is_clean_of("demo"));
        assert_eq!(cloud.call_count("delete_network"), 1);
        assert_eq!(cloud.security_group_names(), ["default"]);
    }
}
