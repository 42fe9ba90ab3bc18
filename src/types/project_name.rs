// ABOUTME: Validated project name used as the namespace for every cloud resource.
// ABOUTME: Restricts names to characters that are safe in resource names and file paths.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectNameError {
    #[error("project name cannot be empty")]
    Empty,

    #[error("project name exceeds maximum length of 48 characters")]
    TooLong,

    #[error("project name cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in project name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName(String);

impl ProjectName {
    pub fn new(value: &str) -> Result<Self, ProjectNameError> {
        if value.is_empty() {
            return Err(ProjectNameError::Empty);
        }

        // Leaves room for the longest derived suffix ("_network_router_port").
        if value.len() > 48 {
            return Err(ProjectNameError::TooLong);
        }

        if let Some(first) = value.chars().next()
            && (first == '-' || first == '_' || first == '.')
        {
            return Err(ProjectNameError::InvalidStart(first));
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.' {
                return Err(ProjectNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ProjectName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProjectName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ProjectName::new(&s).map_err(serde::de::Error::custom)
    }
}
