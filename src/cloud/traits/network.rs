// ABOUTME: Network operations trait for cloud providers.
// ABOUTME: Networks, subnets, routers, router interfaces, and ports.

use super::sealed::Sealed;
use super::shared_types::{
    Network, Port, PortConfig, Router, RouterConfig, Subnet, SubnetConfig,
};
use crate::cloud::CloudError;
use crate::types::{NetworkId, PortId, RouterId, SubnetId};
use async_trait::async_trait;

/// Network operations: the project network, its subnet, and the router to the outside.
#[async_trait]
pub trait NetworkOps: Sealed + Send + Sync {
    /// Find a network by exact name. Also used for the external network.
    async fn find_network_by_name(&self, name: &str) -> Result<Option<Network>, CloudError>;

    async fn create_network(&self, name: &str) -> Result<Network, CloudError>;

    async fn delete_network(&self, id: &NetworkId) -> Result<(), CloudError>;

    /// Every subnet visible to the tenant, used for CIDR allocation.
    async fn list_subnets(&self) -> Result<Vec<Subnet>, CloudError>;

    async fn create_subnet(&self, config: &SubnetConfig) -> Result<Subnet, CloudError>;

    async fn delete_subnet(&self, id: &SubnetId) -> Result<(), CloudError>;

    async fn find_router_by_name(&self, name: &str) -> Result<Option<Router>, CloudError>;

    /// Create a router with its gateway on the external network.
    async fn create_router(&self, config: &RouterConfig) -> Result<Router, CloudError>;

    async fn delete_router(&self, id: &RouterId) -> Result<(), CloudError>;

    /// Create a port with a fixed address on `config.subnet_id`.
    async fn create_port(&self, config: &PortConfig) -> Result<Port, CloudError>;

    async fn delete_port(&self, id: &PortId) -> Result<(), CloudError>;

    /// Ports holding an address on the given subnet.
    async fn list_ports_by_subnet(&self, subnet: &SubnetId) -> Result<Vec<Port>, CloudError>;

    /// Plug `port` into `router` as its interface on `subnet`.
    async fn attach_router_interface(
        &self,
        router: &RouterId,
        subnet: &SubnetId,
        port: &PortId,
    ) -> Result<(), CloudError>;

    /// Remove the interface `port` provides on `subnet`. The provider deletes the port.
    async fn detach_router_interface(
        &self,
        router: &RouterId,
        subnet: &SubnetId,
        port: &PortId,
    ) -> Result<(), CloudError>;
}
