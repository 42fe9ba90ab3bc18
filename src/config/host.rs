// ABOUTME: Host specification: a logical host name replicated `count` times.
// ABOUTME: Carries cloud-side rules (public IPs) and pass-through ansible settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::rules::{IndexSelector, Substitution};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostSpec {
    pub name: String,

    #[serde(default = "default_count")]
    pub count: usize,

    /// Overrides `vm_management.default_vm_flavor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_flavor: Option<String>,

    /// Overrides `vm_management.default_image_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,

    #[serde(default)]
    pub cloud_vars: Vec<CloudVarRule>,

    #[serde(default)]
    pub ansible_settings: Vec<AnsibleSetting>,
}

fn default_count() -> usize {
    1
}

impl HostSpec {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
            vm_flavor: None,
            image_name: None,
            cloud_vars: Vec::new(),
            ansible_settings: Vec::new(),
        }
    }

    /// Rules asking for a floating IP on some of this host's instances.
    pub fn public_ip_rules(&self) -> impl Iterator<Item = &CloudVarRule> {
        self.cloud_vars.iter().filter(|rule| rule.assign_public_ip)
    }
}

/// A cloud-side rule applied to selected instances of a host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudVarRule {
    #[serde(default)]
    pub index: IndexSelector,

    #[serde(rename = "assignPublicIP", default)]
    pub assign_public_ip: bool,
}

/// Inventory group membership plus variables for each instance of a host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsibleSetting {
    pub ansible_group: String,

    /// Variables every instance receives.
    #[serde(default)]
    pub item_vars: Vec<BTreeMap<String, VarValue>>,

    /// Variables gated by an index rule.
    #[serde(default)]
    pub group_vars: Vec<GroupVar>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupVar {
    #[serde(default)]
    pub index: IndexSelector,

    #[serde(flatten)]
    pub vars: BTreeMap<String, VarValue>,
}

/// A variable value: a literal scalar, or a per-instance substitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Substitute { substitute: Substitution },
    Literal(Scalar),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Text(s) => write!(f, "{s}"),
        }
    }
}
