// ABOUTME: Security group operations trait for cloud providers.
// ABOUTME: Find, create, and delete groups and their rules.

use super::sealed::Sealed;
use super::shared_types::{SecurityGroup, SecurityGroupRuleSpec};
use crate::cloud::CloudError;
use crate::types::{SecurityGroupId, SecurityGroupRuleId};
use async_trait::async_trait;

/// Security group operations.
#[async_trait]
pub trait SecurityGroupOps: Sealed + Send + Sync {
    /// Find a security group by exact name, including its rule ids.
    async fn find_security_group_by_name(
        &self,
        name: &str,
    ) -> Result<Option<SecurityGroup>, CloudError>;

    async fn create_security_group(
        &self,
        name: &str,
        description: &str,
    ) -> Result<SecurityGroup, CloudError>;

    async fn create_security_group_rule(
        &self,
        group: &SecurityGroupId,
        rule: &SecurityGroupRuleSpec,
    ) -> Result<SecurityGroupRuleId, CloudError>;

    async fn delete_security_group_rule(&self, id: &SecurityGroupRuleId) -> Result<(), CloudError>;

    async fn delete_security_group(&self, id: &SecurityGroupId) -> Result<(), CloudError>;
}
