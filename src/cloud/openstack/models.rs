// ABOUTME: Wire models for the Keystone, Neutron, Nova and Glance JSON APIs.
// ABOUTME: Only the fields the adapter reads or writes are modelled.

use std::collections::HashMap;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Keystone
// =============================================================================

#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub auth: Auth<'a>,
}

#[derive(Debug, Serialize)]
pub struct Auth<'a> {
    pub identity: Identity<'a>,
    pub scope: Scope<'a>,
}

#[derive(Debug, Serialize)]
pub struct Identity<'a> {
    pub methods: [&'static str; 1],
    pub password: PasswordMethod<'a>,
}

#[derive(Debug, Serialize)]
pub struct PasswordMethod<'a> {
    pub user: User<'a>,
}

#[derive(Debug, Serialize)]
pub struct User<'a> {
    pub name: &'a str,
    pub domain: Named<'a>,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Scope<'a> {
    pub project: Project<'a>,
}

#[derive(Debug, Serialize)]
pub struct Project<'a> {
    pub name: &'a str,
    pub domain: Named<'a>,
}

#[derive(Debug, Serialize)]
pub struct Named<'a> {
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: Token,
}

#[derive(Debug, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Deserialize)]
pub struct Endpoint {
    pub interface: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
    pub url: String,
}

// =============================================================================
// Neutron
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SecurityGroupList {
    pub security_groups: Vec<SecurityGroupBody>,
}

#[derive(Debug, Deserialize)]
pub struct SecurityGroupEnvelope {
    pub security_group: SecurityGroupBody,
}

#[derive(Debug, Deserialize)]
pub struct SecurityGroupBody {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub security_group_rules: Vec<IdOnly>,
}

#[derive(Debug, Deserialize)]
pub struct IdOnly {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct NewSecurityGroup<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
pub struct NewSecurityGroupRule<'a> {
    pub security_group_id: &'a str,
    pub direction: &'static str,
    pub ethertype: &'static str,
    pub protocol: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range_min: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range_max: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_group_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct SecurityGroupRuleEnvelope {
    pub security_group_rule: IdOnly,
}

#[derive(Debug, Deserialize)]
pub struct NetworkList {
    pub networks: Vec<NetworkBody>,
}

#[derive(Debug, Deserialize)]
pub struct NetworkEnvelope {
    pub network: NetworkBody,
}

#[derive(Debug, Deserialize)]
pub struct NetworkBody {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subnets: Vec<String>,
    #[serde(rename = "router:external", default)]
    pub external: bool,
}

#[derive(Debug, Serialize)]
pub struct NewNetwork<'a> {
    pub name: &'a str,
    pub admin_state_up: bool,
}

#[derive(Debug, Deserialize)]
pub struct SubnetList {
    pub subnets: Vec<SubnetBody>,
}

#[derive(Debug, Deserialize)]
pub struct SubnetEnvelope {
    pub subnet: SubnetBody,
}

#[derive(Debug, Deserialize)]
pub struct SubnetBody {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub network_id: String,
    pub cidr: String,
    #[serde(default)]
    pub gateway_ip: Option<IpAddr>,
}

#[derive(Debug, Serialize)]
pub struct NewSubnet<'a> {
    pub name: &'a str,
    pub network_id: &'a str,
    pub cidr: &'a str,
    pub ip_version: u8,
    pub gateway_ip: String,
    pub enable_dhcp: bool,
}

#[derive(Debug, Deserialize)]
pub struct RouterList {
    pub routers: Vec<RouterBody>,
}

#[derive(Debug, Deserialize)]
pub struct RouterEnvelope {
    pub router: RouterBody,
}

#[derive(Debug, Deserialize)]
pub struct RouterBody {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct NewRouter<'a> {
    pub name: &'a str,
    pub external_gateway_info: GatewayInfo<'a>,
}

#[derive(Debug, Serialize)]
pub struct GatewayInfo<'a> {
    pub network_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RouterInterface<'a> {
    pub port_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct PortList {
    pub ports: Vec<PortBody>,
}

#[derive(Debug, Deserialize)]
pub struct PortEnvelope {
    pub port: PortBody,
}

#[derive(Debug, Deserialize)]
pub struct PortBody {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub network_id: String,
    #[serde(default)]
    pub device_owner: String,
    #[serde(default)]
    pub fixed_ips: Vec<FixedIpBody>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FixedIpBody {
    pub subnet_id: String,
    pub ip_address: IpAddr,
}

#[derive(Debug, Serialize)]
pub struct NewPort<'a> {
    pub name: &'a str,
    pub network_id: &'a str,
    pub fixed_ips: Vec<FixedIpBody>,
}

#[derive(Debug, Deserialize)]
pub struct FloatingIpList {
    pub floatingips: Vec<FloatingIpBody>,
}

#[derive(Debug, Deserialize)]
pub struct FloatingIpEnvelope {
    pub floatingip: FloatingIpBody,
}

#[derive(Debug, Deserialize)]
pub struct FloatingIpBody {
    pub id: String,
    pub floating_ip_address: IpAddr,
    #[serde(default)]
    pub port_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewFloatingIp<'a> {
    pub floating_network_id: &'a str,
    pub description: &'a str,
}

/// Body of a floating IP update; a `None` port detaches it.
#[derive(Debug, Serialize)]
pub struct FloatingIpPort<'a> {
    pub port_id: Option<&'a str>,
}

// =============================================================================
// Nova and Glance
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct FlavorList {
    pub flavors: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
pub struct ImageList {
    pub images: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
pub struct NamedResource {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct NewServer<'a> {
    pub name: &'a str,
    #[serde(rename = "imageRef")]
    pub image_ref: &'a str,
    #[serde(rename = "flavorRef")]
    pub flavor_ref: &'a str,
    pub key_name: &'a str,
    pub networks: Vec<ServerNetwork<'a>>,
    pub security_groups: Vec<Named<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ServerNetwork<'a> {
    pub uuid: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ServerCreated {
    pub server: IdOnly,
}

#[derive(Debug, Deserialize)]
pub struct ServerList {
    pub servers: Vec<ServerBody>,
}

#[derive(Debug, Deserialize)]
pub struct ServerEnvelope {
    pub server: ServerBody,
}

#[derive(Debug, Deserialize)]
pub struct ServerBody {
    pub id: String,
    pub name: String,
    pub status: String,
    /// Addresses per network name.
    #[serde(default)]
    pub addresses: HashMap<String, Vec<ServerAddress>>,
}

#[derive(Debug, Deserialize)]
pub struct ServerAddress {
    pub addr: IpAddr,
    #[serde(rename = "OS-EXT-IPS:type", default)]
    pub ip_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewKeypair<'a> {
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct KeypairEnvelope {
    pub keypair: KeypairBody,
}

#[derive(Debug, Deserialize)]
pub struct KeypairBody {
    pub name: String,
    #[serde(default)]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub private_key: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
}
