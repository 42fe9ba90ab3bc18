// ABOUTME: VM management defaults: image, flavor, and polling/timeout bounds.
// ABOUTME: Durations use humantime strings such as "5s" or "10m".

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmManagementConfig {
    #[serde(default = "default_image_name")]
    pub default_image_name: String,

    #[serde(default = "default_vm_flavor")]
    pub default_vm_flavor: String,

    #[serde(default = "default_startup_timeout", with = "humantime_serde")]
    pub hosts_startup_timeout: Duration,

    #[serde(default = "default_poll", with = "humantime_serde")]
    pub startup_poll: Duration,

    #[serde(default = "default_poll", with = "humantime_serde")]
    pub terminate_vm_poll: Duration,

    #[serde(default = "default_terminate_timeout", with = "humantime_serde")]
    pub terminate_timeout: Duration,

    /// Also put instances in the project's `default` security group.
    #[serde(default = "default_attach_default_group")]
    pub attach_default_security_group: bool,
}

impl Default for VmManagementConfig {
    fn default() -> Self {
        Self {
            default_image_name: default_image_name(),
            default_vm_flavor: default_vm_flavor(),
            hosts_startup_timeout: default_startup_timeout(),
            startup_poll: default_poll(),
            terminate_vm_poll: default_poll(),
            terminate_timeout: default_terminate_timeout(),
            attach_default_security_group: default_attach_default_group(),
        }
    }
}

fn default_image_name() -> String {
    "Ubuntu 14.04.2_20150505".to_string()
}

fn default_vm_flavor() -> String {
    "m1.medium".to_string()
}

fn default_startup_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_poll() -> Duration {
    Duration::from_secs(5)
}

fn default_terminate_timeout() -> Duration {
    Duration::from_secs(600)
}

fn default_attach_default_group() -> bool {
    true
}
