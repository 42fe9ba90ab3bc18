// ABOUTME: Integration tests for cluster spec parsing, discovery, and validation.
// ABOUTME: Tests YAML parsing, project override, defaults, and rejected specs.

use cirrus::config::*;
use cirrus::rules::{IndexSelector, Substitution};
use std::fs;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_spec() {
        let yaml = r#"
project: demo
hosts:
  - name: web
"#;
        let spec = ClusterSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.project.as_str(), "demo");
        assert_eq!(spec.hosts.len(), 1);
        assert_eq!(spec.hosts.head.count, 1);
        assert_eq!(spec.network.cidr, CidrSetting::Auto);
        assert_eq!(spec.network.cidr_template, "10.X.100.0/24");
        assert_eq!(spec.network.ext_net_name, "ext-net");
        assert_eq!(spec.vm_management.default_vm_flavor, "m1.medium");
        assert_eq!(
            spec.vm_management.hosts_startup_timeout,
            Duration::from_secs(600)
        );
        assert!(spec.vm_management.attach_default_security_group);
    }

    #[test]
    fn parse_full_spec() {
        let yaml = r#"
project: analytics
projects_dir: /var/lib/cirrus
platform_settings_file: openstack.yml

network:
  cidr: 192.168.10.0/24
  ext_net_name: public

vm_management:
  default_image_name: ubuntu-22.04
  default_vm_flavor: m1.small
  hosts_startup_timeout: 15m
  startup_poll: 2s
  terminate_vm_poll: 1s
  terminate_timeout: 5m
  attach_default_security_group: false

hosts:
  - name: master
    vm_flavor: m1.large
    cloud_vars:
      - index: 0
        assignPublicIP: true
  - name: worker
    count: 3
    image_name: centos-7
    ansible_settings:
      - ansible_group: workers
        item_vars:
          - ansible_host:
              substitute: ansible_host
            role: compute
        group_vars:
          - index: counter
            worker_id: ""
          - index: 0
            leader: true
"#;
        let spec = ClusterSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.projects_dir.to_str(), Some("/var/lib/cirrus"));
        assert_eq!(
            spec.platform_settings_file.as_deref().and_then(|p| p.to_str()),
            Some("openstack.yml")
        );
        assert_eq!(
            spec.network.cidr,
            CidrSetting::Explicit("192.168.10.0/24".to_string())
        );
        assert_eq!(spec.network.ext_net_name, "public");
        assert_eq!(spec.vm_management.startup_poll, Duration::from_secs(2));
        assert_eq!(spec.vm_management.terminate_timeout, Duration::from_secs(300));
        assert!(!spec.vm_management.attach_default_security_group);

        let master = &spec.hosts.head;
        assert_eq!(master.vm_flavor.as_deref(), Some("m1.large"));
        assert_eq!(master.cloud_vars[0].index, IndexSelector::Index(0));
        assert!(master.cloud_vars[0].assign_public_ip);

        let worker = &spec.hosts.tail[0];
        assert_eq!(worker.count, 3);
        assert_eq!(worker.image_name.as_deref(), Some("centos-7"));
        let setting = &worker.ansible_settings[0];
        assert_eq!(setting.ansible_group, "workers");
        assert_eq!(
            setting.item_vars[0]["ansible_host"],
            VarValue::Substitute {
                substitute: Substitution::AnsibleHost
            }
        );
        assert_eq!(
            setting.item_vars[0]["role"],
            VarValue::Literal(Scalar::Text("compute".to_string()))
        );
        assert_eq!(setting.group_vars[0].index, IndexSelector::Counter);
        assert_eq!(setting.group_vars[1].index, IndexSelector::Index(0));
        assert_eq!(
            setting.group_vars[1].vars["leader"],
            VarValue::Literal(Scalar::Bool(true))
        );
    }

    #[test]
    fn cidr_auto_is_case_insensitive() {
        let yaml = r#"
project: demo
network:
  cidr: AUTO
hosts:
  - name: web
"#;
        let spec = ClusterSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.network.cidr, CidrSetting::Auto);
    }

    #[test]
    fn saved_spec_parses_back() {
        let yaml = r#"
project: demo
hosts:
  - name: web
    count: 2
    cloud_vars:
      - index: all
        assignPublicIP: true
"#;
        let spec = ClusterSpec::from_yaml(yaml).unwrap();
        let reparsed = ClusterSpec::from_yaml(&spec.to_yaml().unwrap()).unwrap();

        assert_eq!(reparsed.project, spec.project);
        assert_eq!(reparsed.hosts.head.count, 2);
        assert_eq!(reparsed.hosts.head.cloud_vars[0].index, IndexSelector::All);
        assert_eq!(
            reparsed.vm_management.terminate_vm_poll,
            spec.vm_management.terminate_vm_poll
        );
    }
}

mod project_override {
    use super::*;

    #[test]
    fn override_replaces_file_project() {
        let yaml = r#"
project: from-file
hosts:
  - name: web
"#;
        let spec = ClusterSpec::from_yaml_for_project(yaml, Some("from-cli")).unwrap();
        assert_eq!(spec.project.as_str(), "from-cli");
    }

    #[test]
    fn override_supplies_missing_project() {
        let yaml = r#"
hosts:
  - name: web
"#;
        assert!(ClusterSpec::from_yaml(yaml).is_err());
        let spec = ClusterSpec::from_yaml_for_project(yaml, Some("cli-only")).unwrap();
        assert_eq!(spec.project.as_str(), "cli-only");
    }

    #[test]
    fn override_is_validated() {
        let yaml = r#"
project: fine
hosts:
  - name: web
"#;
        assert!(ClusterSpec::from_yaml_for_project(yaml, Some("bad name")).is_err());
    }
}

mod validation {
    use super::*;

    fn rejects(yaml: &str, needle: &str) {
        let err = ClusterSpec::from_yaml(yaml).unwrap_err().to_string();
        assert!(err.contains(needle), "'{err}' should mention '{needle}'");
    }

    #[test]
    fn empty_hosts_rejected() {
        rejects("project: demo\nhosts: []\n", "at least one host");
    }

    #[test]
    fn duplicate_host_names_rejected() {
        rejects(
            "project: demo\nhosts:\n  - name: web\n  - name: web\n",
            "duplicate host name",
        );
    }

    #[test]
    fn zero_count_rejected() {
        rejects(
            "project: demo\nhosts:\n  - name: web\n    count: 0\n",
            "count >= 1",
        );
    }

    #[test]
    fn underscore_in_host_name_accepted() {
        let spec =
            ClusterSpec::from_yaml("project: demo\nhosts:\n  - name: spark_master\n").unwrap();
        assert_eq!(spec.hosts.head.name, "spark_master");
    }

    #[test]
    fn colliding_instance_names_rejected() {
        rejects(
            "project: demo\nhosts:\n  - name: web\n    count: 2\n  - name: web_1\n",
            "instance name demo-web_1",
        );
    }

    #[test]
    fn space_in_host_name_rejected() {
        rejects("project: demo\nhosts:\n  - name: web 1\n", "invalid character");
    }

    #[test]
    fn public_ip_index_out_of_range_rejected() {
        rejects(
            "project: demo\nhosts:\n  - name: web\n    count: 2\n    cloud_vars:\n      - index: 2\n        assignPublicIP: true\n",
            "index 2",
        );
    }

    #[test]
    fn template_without_token_rejected() {
        rejects(
            "project: demo\nnetwork:\n  cidr_template: 10.0.100.0/24\nhosts:\n  - name: web\n",
            "exactly one 'X'",
        );
    }

    #[test]
    fn unusable_explicit_cidr_rejected() {
        rejects(
            "project: demo\nnetwork:\n  cidr: 10.0.0.0/31\nhosts:\n  - name: web\n",
            "no usable host",
        );
    }

    #[test]
    fn bad_index_word_rejected() {
        let yaml = "project: demo\nhosts:\n  - name: web\n    cloud_vars:\n      - index: some\n        assignPublicIP: true\n";
        assert!(ClusterSpec::from_yaml(yaml).is_err());
    }
}

mod discovery {
    use super::*;

    const SPEC: &str = "project: found\nhosts:\n  - name: web\n";

    #[test]
    fn finds_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), SPEC).unwrap();

        let spec = ClusterSpec::discover(dir.path(), None).unwrap();
        assert_eq!(spec.project.as_str(), "found");
    }

    #[test]
    fn finds_config_dir_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME_DIR), SPEC).unwrap();

        let spec = ClusterSpec::discover(dir.path(), Some("renamed")).unwrap();
        assert_eq!(spec.project.as_str(), "renamed");
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClusterSpec::discover(dir.path(), None).unwrap_err();
        assert!(matches!(err, cirrus::error::Error::ConfigNotFound(_)));
    }
}

mod init {
    use super::*;

    #[test]
    fn template_is_a_valid_spec() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), Some("starter"), false).unwrap();

        let spec = ClusterSpec::discover(dir.path(), None).unwrap();
        assert_eq!(spec.project.as_str(), "starter");
        assert_eq!(spec.hosts.len(), 2);
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), None, false).unwrap();

        assert!(init_config(dir.path(), None, false).is_err());
        assert!(init_config(dir.path(), None, true).is_ok());
    }
}
