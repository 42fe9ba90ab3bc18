// ABOUTME: Shared resource types used across cloud capability traits.
// ABOUTME: Handles returned by the cloud plus the configs used to create them.

use std::net::{IpAddr, Ipv4Addr};

use crate::types::{
    FlavorId, FloatingIpId, ImageId, InstanceId, NetworkId, PortId, RouterId, SecurityGroupId,
    SecurityGroupRuleId, SubnetId,
};

// =============================================================================
// Security Groups
// =============================================================================

#[derive(Debug, Clone)]
pub struct SecurityGroup {
    pub id: SecurityGroupId,
    pub name: String,
    pub rules: Vec<SecurityGroupRuleId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ingress,
    Egress,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ingress => "ingress",
            Direction::Egress => "egress",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityGroupRuleSpec {
    pub direction: Direction,
    pub protocol: Protocol,
    /// Inclusive port range; `None` means every port.
    pub port_range: Option<(u16, u16)>,
    /// Only traffic from/to members of this group matches.
    pub remote_group: Option<SecurityGroupId>,
}

impl SecurityGroupRuleSpec {
    /// All ports of `protocol` between members of `group`.
    pub fn within_group(direction: Direction, protocol: Protocol, group: &SecurityGroupId) -> Self {
        Self {
            direction,
            protocol,
            port_range: Some((1, 65535)),
            remote_group: Some(group.clone()),
        }
    }
}

// =============================================================================
// Networking
// =============================================================================

#[derive(Debug, Clone)]
pub struct Network {
    pub id: NetworkId,
    pub name: String,
    pub subnet_ids: Vec<SubnetId>,
    pub external: bool,
}

#[derive(Debug, Clone)]
pub struct Subnet {
    pub id: SubnetId,
    pub name: String,
    pub network_id: NetworkId,
    pub cidr: String,
    pub gateway_ip: Option<IpAddr>,
}

#[derive(Debug, Clone)]
pub struct SubnetConfig {
    pub name: String,
    pub network_id: NetworkId,
    pub cidr: String,
    pub gateway_ip: Ipv4Addr,
}

#[derive(Debug, Clone)]
pub struct Router {
    pub id: RouterId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub name: String,
    pub external_network_id: NetworkId,
}

/// Prefix of `device_owner` for ports the network service owns itself
/// (DHCP agents, router interfaces, gateways).
pub const PROVIDER_OWNER_PREFIX: &str = "network:";

#[derive(Debug, Clone)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub network_id: NetworkId,
    pub device_owner: String,
    pub fixed_ips: Vec<FixedIp>,
}

impl Port {
    pub fn is_provider_owned(&self) -> bool {
        self.device_owner.starts_with(PROVIDER_OWNER_PREFIX)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedIp {
    pub subnet_id: SubnetId,
    pub ip_address: IpAddr,
}

#[derive(Debug, Clone)]
pub struct PortConfig {
    pub name: String,
    pub network_id: NetworkId,
    pub subnet_id: SubnetId,
    pub ip_address: Ipv4Addr,
}

// =============================================================================
// Compute
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub id: ImageId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flavor {
    pub id: FlavorId,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct InstanceConfig {
    pub name: String,
    pub image_id: ImageId,
    pub flavor_id: FlavorId,
    pub keypair: String,
    pub network_id: NetworkId,
    /// Security groups by name.
    pub security_groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Building,
    Active,
    Error,
    Deleting,
    Other(String),
}

impl InstanceStatus {
    /// Map a compute API status string.
    pub fn from_api(status: &str) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "BUILD" | "BUILDING" => InstanceStatus::Building,
            "ACTIVE" => InstanceStatus::Active,
            "ERROR" => InstanceStatus::Error,
            "DELETED" | "DELETING" | "SOFT_DELETED" => InstanceStatus::Deleting,
            other => InstanceStatus::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Fixed,
    Floating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceAddress {
    pub addr: IpAddr,
    pub kind: AddressKind,
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub id: InstanceId,
    pub name: String,
    pub status: InstanceStatus,
    pub addresses: Vec<InstanceAddress>,
}

impl Instance {
    /// First fixed (private) address.
    pub fn fixed_address(&self) -> Option<IpAddr> {
        self.addresses
            .iter()
            .find(|a| a.kind == AddressKind::Fixed)
            .map(|a| a.addr)
    }

    /// Every non-fixed (public) address.
    pub fn floating_addresses(&self) -> Vec<IpAddr> {
        self.addresses
            .iter()
            .filter(|a| a.kind != AddressKind::Fixed)
            .map(|a| a.addr)
            .collect()
    }
}

// =============================================================================
// Keypairs and Floating IPs
// =============================================================================

#[derive(Debug, Clone)]
pub struct Keypair {
    pub name: String,
    pub fingerprint: Option<String>,
}

/// Key material of a keypair the cloud just generated. Only returned once.
#[derive(Clone)]
pub struct KeyMaterial {
    pub name: String,
    pub private_key: String,
    pub public_key: String,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("name", &self.name)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct FloatingIp {
    pub id: FloatingIpId,
    pub address: IpAddr,
    pub port_id: Option<PortId>,
}

#[derive(Debug, Clone)]
pub struct FloatingIpConfig {
    pub external_network_id: NetworkId,
    pub description: String,
}
