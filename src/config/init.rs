// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates a commented cirrus.yml template.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::ProjectName;

use super::CONFIG_FILENAME;

pub fn init_config(dir: &Path, project: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let project = ProjectName::new(project.unwrap_or("my-cluster"))
        .map_err(|e| Error::InvalidConfig(e.to_string()))?;

    std::fs::write(&config_path, generate_template_yaml(&project))?;

    Ok(())
}

fn generate_template_yaml(project: &ProjectName) -> String {
    format!(
        r#"project: {project}
projects_dir: ./projects
# Cloud credentials; OS_* environment variables are used when unset.
# platform_settings_file: openstack.yml

network:
  cidr: auto
  cidr_template: 10.X.100.0/24
  ext_net_name: ext-net

vm_management:
  default_image_name: ubuntu-22.04
  default_vm_flavor: m1.medium
  hosts_startup_timeout: 10m
  startup_poll: 5s
  terminate_vm_poll: 5s
  terminate_timeout: 10m

hosts:
  - name: bastion
    cloud_vars:
      - assignPublicIP: true
  - name: worker
    count: 3
    ansible_settings:
      - ansible_group: workers
        item_vars:
          - ansible_host:
              substitute: private_address
        group_vars:
          - index: counter
            worker_id: ""
"#
    )
}
