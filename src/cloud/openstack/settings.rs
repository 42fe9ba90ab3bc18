// ABOUTME: OpenStack credentials and endpoint selection.
// ABOUTME: Loaded from a YAML settings file or the standard OS_* environment variables.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Keystone v3 password credentials scoped to one project.
#[derive(Clone, Deserialize)]
pub struct OpenStackSettings {
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub project_name: String,

    #[serde(default = "default_domain")]
    pub user_domain_name: String,

    #[serde(default = "default_domain")]
    pub project_domain_name: String,

    #[serde(default)]
    pub region_name: Option<String>,

    /// Catalog endpoint interface: `public`, `internal` or `admin`.
    #[serde(default = "default_interface")]
    pub interface: String,
}

fn default_domain() -> String {
    "Default".to_string()
}

fn default_interface() -> String {
    "public".to_string()
}

impl std::fmt::Debug for OpenStackSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenStackSettings")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("project_name", &self.project_name)
            .field("user_domain_name", &self.user_domain_name)
            .field("project_domain_name", &self.project_domain_name)
            .field("region_name", &self.region_name)
            .field("interface", &self.interface)
            .finish()
    }
}

impl OpenStackSettings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self {
            auth_url: required_env("OS_AUTH_URL")?,
            username: required_env("OS_USERNAME")?,
            password: required_env("OS_PASSWORD")?,
            project_name: match std::env::var("OS_PROJECT_NAME") {
                Ok(name) => name,
                Err(_) => required_env("OS_TENANT_NAME")?,
            },
            user_domain_name: std::env::var("OS_USER_DOMAIN_NAME")
                .unwrap_or_else(|_| default_domain()),
            project_domain_name: std::env::var("OS_PROJECT_DOMAIN_NAME")
                .unwrap_or_else(|_| default_domain()),
            region_name: std::env::var("OS_REGION_NAME").ok(),
            interface: std::env::var("OS_INTERFACE").unwrap_or_else(|_| default_interface()),
        })
    }

    /// The settings file when one is configured, the environment otherwise.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    /// Identity endpoint with the `/v3` suffix applied exactly once.
    pub fn identity_url(&self) -> String {
        let base = self.auth_url.trim_end_matches('/');
        if base.ends_with("/v3") {
            base.to_string()
        } else {
            format!("{base}/v3")
        }
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::MissingEnvVar(name.to_string()))
}
