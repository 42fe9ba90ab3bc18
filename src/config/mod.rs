// ABOUTME: Cluster specification parsed from cirrus.yml.
// ABOUTME: Handles YAML parsing, project override, defaults, and validation.

mod host;
mod init;
mod network;
mod vm;

pub use host::{AnsibleSetting, CloudVarRule, GroupVar, HostSpec, Scalar, VarValue};
pub use init::init_config;
pub use network::{CidrSetting, NetworkConfig};
pub use vm::VmManagementConfig;

use crate::cidr;
use crate::error::{Error, Result};
use crate::hosts;
use crate::rules::IndexSelector;
use crate::types::ProjectName;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "cirrus.yml";
pub const CONFIG_FILENAME_ALT: &str = "cirrus.yaml";
pub const CONFIG_FILENAME_DIR: &str = "config/default.yml";

/// Everything one orchestrator run needs to know about a cluster.
///
/// Built once per invocation and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub project: ProjectName,

    #[serde(default = "default_projects_dir")]
    pub projects_dir: PathBuf,

    /// YAML file with cloud credentials; `OS_*` variables are used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_settings_file: Option<PathBuf>,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub vm_management: VmManagementConfig,

    #[serde(deserialize_with = "deserialize_hosts")]
    pub hosts: NonEmpty<HostSpec>,
}

fn default_projects_dir() -> PathBuf {
    PathBuf::from("./projects")
}

impl ClusterSpec {
    pub fn new(project: ProjectName, hosts: NonEmpty<HostSpec>) -> Self {
        Self {
            project,
            projects_dir: default_projects_dir(),
            platform_settings_file: None,
            network: NetworkConfig::default(),
            vm_management: VmManagementConfig::default(),
            hosts,
        }
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_yaml_for_project(yaml, None)
    }

    /// Parse a cluster file, letting `project` replace whatever the file names.
    pub fn from_yaml_for_project(yaml: &str, project: Option<&str>) -> Result<Self> {
        let mut value: serde_yaml::Value = serde_yaml::from_str(yaml)?;

        if let Some(project) = project {
            let map = value.as_mapping_mut().ok_or_else(|| {
                Error::InvalidConfig("cluster file must be a YAML mapping".to_string())
            })?;
            map.insert("project".into(), project.into());
        }

        let spec: ClusterSpec = serde_yaml::from_value(value)?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn load(path: &Path, project: Option<&str>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_for_project(&content, project)
    }

    pub fn discover(dir: &Path, project: Option<&str>) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path, project);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Local working directory for this project's key material and config copy.
    pub fn project_dir(&self) -> PathBuf {
        self.projects_dir.join(self.project.as_str())
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::from)
    }

    /// Reject specs the orchestrator could only fail on halfway through a run.
    pub fn validate(&self) -> Result<()> {
        cidr::validate_template(&self.network.cidr_template)
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;

        if let CidrSetting::Explicit(ref value) = self.network.cidr {
            cidr::gateway_address(value).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        }

        let mut seen = HashSet::new();
        for host in &self.hosts {
            validate_host_name(&host.name)?;

            if !seen.insert(host.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate host name: {}",
                    host.name
                )));
            }

            if host.count == 0 {
                return Err(Error::InvalidConfig(format!(
                    "host '{}' must have count >= 1",
                    host.name
                )));
            }

            for rule in host.public_ip_rules() {
                if let IndexSelector::Index(k) = rule.index
                    && k >= host.count
                {
                    return Err(Error::InvalidConfig(format!(
                        "host '{}' assigns a public IP to index {} but has only {} instance(s)",
                        host.name, k, host.count
                    )));
                }
            }
        }

        // "web" x2 expands to web_1, which a separate "web_1" host would shadow.
        let mut names = HashSet::new();
        for identity in hosts::expand(&self.project, &self.hosts) {
            if !names.insert(identity.full_name.clone()) {
                return Err(Error::InvalidConfig(format!(
                    "instance name {} is produced by more than one host",
                    identity.full_name
                )));
            }
        }

        Ok(())
    }
}

fn validate_host_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidConfig("host name cannot be empty".to_string()));
    }

    if let Some(c) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(*c, '-' | '_' | '.'))
    {
        return Err(Error::InvalidConfig(format!(
            "invalid character '{}' in host name '{}'",
            c, name
        )));
    }

    Ok(())
}

fn deserialize_hosts<'de, D>(deserializer: D) -> std::result::Result<NonEmpty<HostSpec>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let hosts: Vec<HostSpec> = Vec::deserialize(deserializer)?;
    NonEmpty::from_vec(hosts).ok_or_else(|| serde::de::Error::custom("at least one host is required"))
}
