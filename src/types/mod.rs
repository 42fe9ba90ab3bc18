// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent cloud resource ID confusion at compile time.

mod id;
mod project_name;

pub use id::{
    FlavorId, FloatingIpId, Id, ImageId, InstanceId, NetworkId, PortId, RouterId,
    SecurityGroupId, SecurityGroupRuleId, SubnetId,
};
pub use project_name::{ProjectName, ProjectNameError};
