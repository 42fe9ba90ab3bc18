// ABOUTME: Integration tests for cluster creation against the in-memory cloud.
// ABOUTME: Covers the happy path, collisions, missing dependencies, and degraded floating IPs.

mod support;

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use cirrus::cloud::MemoryCloud;
use cirrus::cluster::{Cluster, ClusterError, ClusterErrorKind, CreateStage, ResourceKind};
use cirrus::config::{CidrSetting, HostSpec};
use cirrus::diagnostics::{Diagnostics, WarningKind};
use cirrus::rules::IndexSelector;
use nonempty::NonEmpty;

use support::{demo_spec, public_host};

mod happy_path {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn creates_every_resource_and_builds_roster() {
        support::init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        let mut diag = Diagnostics::default();

        let cluster = Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        assert!(!diag.has_warnings(), "unexpected warnings: {:?}", diag.warnings());

        let names: Vec<_> = cluster.roster().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["demo-bastion", "demo-worker_1", "demo-worker_2"]);

        // .1 gateway, .2 DHCP
        let bastion = &cluster.roster()[0];
        assert_eq!(
            bastion.private_address,
            IpAddr::V4(Ipv4Addr::new(10, 1, 100, 3))
        );
        assert!(bastion.public_address.is_some());
        assert!(cluster.roster()[1].public_address.is_none());

        assert_eq!(cloud.security_group_rule_count("demo_secgroup"), 2);
        assert_eq!(cloud.network_names().iter().filter(|n| *n == "demo_network").count(), 1);
        assert_eq!(cloud.router_names(), ["demo_network_router"]);
        assert_eq!(cloud.keypair_names(), ["demo_ssh"]);
        assert_eq!(cloud.floating_ip_count(), 1);
        assert_eq!(cloud.instances_with_floating_ip(), ["demo-bastion"]);
    }

    #[tokio::test(start_paused = true)]
    async fn writes_key_material_to_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        let mut diag = Diagnostics::default();

        Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        let project_dir = dir.path().join("demo");
        let private = std::fs::read_to_string(project_dir.join("demo_ssh")).unwrap();
        assert!(private.contains("PRIVATE KEY"));
        assert!(project_dir.join("demo_ssh.pub").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn instances_join_project_and_default_groups() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        let mut diag = Diagnostics::default();

        Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        assert_eq!(
            cloud.instance_security_groups("demo-worker_2"),
            ["demo_secgroup", "default"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn default_group_can_be_left_out() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        let mut diag = Diagnostics::default();
        let mut spec = demo_spec(dir.path());
        spec.vm_management.attach_default_security_group = false;

        Cluster::new(spec)
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        assert_eq!(cloud.instance_security_groups("demo-bastion"), ["demo_secgroup"]);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_slow_instances() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard().startup_polls(4);
        let mut diag = Diagnostics::default();

        let cluster = Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        assert_eq!(cluster.roster().len(), 3);
    }
}

mod subnets {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn auto_cidr_skips_taken_ranges() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard().with_foreign_subnet("10.2.100.0/24");
        let mut diag = Diagnostics::default();

        Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        // one existing subnet: probing starts at 2, which is taken
        assert!(cloud.subnet_cidrs().contains(&"10.3.100.0/24".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_cidr_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        let mut diag = Diagnostics::default();
        let mut spec = demo_spec(dir.path());
        spec.network.cidr = CidrSetting::Explicit("192.168.50.0/24".to_string());

        let cluster = Cluster::new(spec)
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        assert_eq!(cloud.subnet_cidrs(), ["192.168.50.0/24"]);
        assert_eq!(
            cluster.roster()[0].private_address,
            IpAddr::V4(Ipv4Addr::new(192, 168, 50, 3))
        );
        assert_eq!(cloud.call_count("list_subnets"), 0);
    }
}

mod collisions {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn existing_security_group_stops_before_any_create() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard().with_security_group("demo_secgroup");
        let mut diag = Diagnostics::default();

        let (cluster, e) = Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .unwrap_err();

        assert_eq!(e.kind(), ClusterErrorKind::Collision);
        assert_eq!(cluster.stage(), CreateStage::SecurityGroup);
        assert_eq!(cloud.calls(), ["find_security_group_by_name"]);
    }

    #[tokio::test(start_paused = true)]
    async fn existing_network_is_a_collision() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard().with_network("demo_network");
        let mut diag = Diagnostics::default();

        let (cluster, e) = Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .unwrap_err();

        assert!(matches!(
            e,
            ClusterError::Collision {
                kind: ResourceKind::Network,
                ..
            }
        ));
        assert_eq!(cluster.stage(), CreateStage::Network);
        assert_eq!(cloud.call_count("create_network"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn existing_keypair_is_reused_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard().with_keypair("demo_ssh");
        let mut diag = Diagnostics::default();

        Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        assert_eq!(cloud.call_count("create_keypair"), 0);
        assert_eq!(diag.count(WarningKind::KeyMaterial), 1);
    }
}

mod missing_dependencies {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn missing_external_network_fails_network_stage() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::new()
            .with_image("Ubuntu 14.04.2_20150505")
            .with_flavor("m1.medium");
        let mut diag = Diagnostics::default();

        let (cluster, e) = Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .unwrap_err();

        assert!(matches!(
            e,
            ClusterError::MissingDependency {
                kind: ResourceKind::ExternalNetwork,
                ..
            }
        ));
        assert_eq!(cluster.stage(), CreateStage::Network);
        assert_eq!(cloud.call_count("create_router"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_image_fails_instance_stage() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        let mut diag = Diagnostics::default();
        let mut spec = demo_spec(dir.path());
        spec.vm_management.default_image_name = "CentOS 7".to_string();

        let (cluster, e) = Cluster::new(spec)
            .create(&cloud, &mut diag)
            .await
            .unwrap_err();

        assert_eq!(e.kind(), ClusterErrorKind::MissingDependency);
        assert!(e.to_string().contains("CentOS 7"));
        assert_eq!(cluster.stage(), CreateStage::Instances);
        assert_eq!(cloud.call_count("create_instance"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn host_flavor_override_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        let mut diag = Diagnostics::default();
        let mut worker = HostSpec::new("worker", 1);
        worker.vm_flavor = Some("m1.xlarge".to_string());
        let mut spec = demo_spec(dir.path());
        spec.hosts = NonEmpty::new(worker);

        let (_, e) = Cluster::new(spec)
            .create(&cloud, &mut diag)
            .await
            .unwrap_err();

        assert!(matches!(
            e,
            ClusterError::MissingDependency {
                kind: ResourceKind::Flavor,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn image_lookups_are_cached_per_run() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        let mut diag = Diagnostics::default();

        Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        assert_eq!(cloud.call_count("list_images_by_name"), 1);
        assert_eq!(cloud.call_count("list_flavors_by_name"), 1);
    }
}

mod startup {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn instances_that_never_start_time_out() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard().instances_never_start();
        let mut diag = Diagnostics::default();
        let mut spec = demo_spec(dir.path());
        spec.vm_management.hosts_startup_timeout = Duration::from_secs(30);

        let (cluster, e) = Cluster::new(spec)
            .create(&cloud, &mut diag)
            .await
            .unwrap_err();

        assert!(matches!(e, ClusterError::StartupTimeout { count: 3, .. }));
        assert_eq!(e.kind(), ClusterErrorKind::Timeout);
        assert_eq!(cluster.stage(), CreateStage::Instances);
        assert_eq!(cloud.floating_ip_count(), 0);
    }
}

mod floating_ips {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn attach_failure_is_a_warning_and_releases_the_address() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard().fail_floating_ip_attach();
        let mut diag = Diagnostics::default();

        let cluster = Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        assert_eq!(diag.count(WarningKind::FloatingIpAttach), 1);
        assert_eq!(cloud.floating_ip_count(), 0);
        assert!(cluster.roster().iter().all(|e| e.public_address.is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn roster_keeps_address_the_listing_has_not_caught_up_with() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard().lagging_addresses();
        let mut diag = Diagnostics::default();

        let cluster = Cluster::new(demo_spec(dir.path()))
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        let bastion = &cluster.roster()[0];
        assert_eq!(bastion.name, "demo-bastion");
        let public = bastion.public_address.expect("bastion has a public address");

        let rediscovered = cluster.discover_roster(&cloud, &mut diag).await.unwrap();
        assert_eq!(rediscovered[0].public_address, Some(public));
        assert_eq!(diag.count(WarningKind::FloatingIpAttach), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn index_rule_targets_one_instance() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        let mut diag = Diagnostics::default();
        let mut spec = demo_spec(dir.path());
        spec.hosts = NonEmpty::new(public_host("worker", 3, IndexSelector::Index(1)));

        Cluster::new(spec)
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        assert_eq!(cloud.instances_with_floating_ip(), ["demo-worker_2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_rules_assign_once() {
        let dir = tempfile::tempdir().unwrap();
        let cloud = MemoryCloud::standard();
        let mut diag = Diagnostics::default();
        let mut host = public_host("edge", 2, IndexSelector::All);
        host.cloud_vars.push(cirrus::config::CloudVarRule {
            index: IndexSelector::Index(0),
            assign_public_ip: true,
        });
        let mut spec = demo_spec(dir.path());
        spec.hosts = NonEmpty::new(host);

        Cluster::new(spec)
            .create(&cloud, &mut diag)
            .await
            .map_err(|(_, e)| e)
            .unwrap();

        assert_eq!(cloud.floating_ip_count(), 2);
        assert_eq!(cloud.call_count("create_floating_ip"), 2);
    }
}
