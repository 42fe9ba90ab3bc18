// ABOUTME: Project network settings: CIDR (explicit or auto) and router gateway.
// ABOUTME: "auto" defers the CIDR choice to the template-based allocator.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub cidr: CidrSetting,

    #[serde(default = "default_cidr_template")]
    pub cidr_template: String,

    #[serde(default = "default_ext_net_name")]
    pub ext_net_name: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            cidr: CidrSetting::Auto,
            cidr_template: default_cidr_template(),
            ext_net_name: default_ext_net_name(),
        }
    }
}

fn default_cidr_template() -> String {
    "10.X.100.0/24".to_string()
}

fn default_ext_net_name() -> String {
    "ext-net".to_string()
}

/// Either a fixed CIDR or the `auto` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CidrSetting {
    #[default]
    Auto,
    Explicit(String),
}

impl fmt::Display for CidrSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CidrSetting::Auto => write!(f, "auto"),
            CidrSetting::Explicit(cidr) => write!(f, "{cidr}"),
        }
    }
}

impl Serialize for CidrSetting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CidrSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            Ok(CidrSetting::Auto)
        } else if s.is_empty() {
            Err(serde::de::Error::custom("network cidr cannot be empty"))
        } else {
            Ok(CidrSetting::Explicit(s.to_string()))
        }
    }
}
