// ABOUTME: Capability trait implementations for OpenStackCloud.
// ABOUTME: Maps each operation onto one or two REST calls and converts wire models.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;
use tracing::debug;
use urlencoding::encode;

use super::OpenStackCloud;
use super::models::*;
use crate::cloud::CloudError;
use crate::cloud::traits::{
    AddressKind, ComputeOps, FixedIp, Flavor, FloatingIp, FloatingIpConfig, FloatingIpOps, Image,
    Instance, InstanceAddress, InstanceConfig, InstanceStatus, KeyMaterial, Keypair, KeypairOps,
    Network, NetworkOps, Port, PortConfig, Router, RouterConfig, SecurityGroup, SecurityGroupOps,
    SecurityGroupRuleSpec, Subnet, SubnetConfig,
};
use crate::cloud::wait::{self, PollError};
use crate::types::{
    FlavorId, FloatingIpId, ImageId, InstanceId, NetworkId, PortId, RouterId, SecurityGroupId,
    SecurityGroupRuleId, SubnetId,
};

impl From<SecurityGroupBody> for SecurityGroup {
    fn from(body: SecurityGroupBody) -> Self {
        SecurityGroup {
            id: SecurityGroupId::new(body.id),
            name: body.name,
            rules: body
                .security_group_rules
                .into_iter()
                .map(|r| SecurityGroupRuleId::new(r.id))
                .collect(),
        }
    }
}

impl From<NetworkBody> for Network {
    fn from(body: NetworkBody) -> Self {
        Network {
            id: NetworkId::new(body.id),
            name: body.name,
            subnet_ids: body.subnets.into_iter().map(SubnetId::new).collect(),
            external: body.external,
        }
    }
}

impl From<SubnetBody> for Subnet {
    fn from(body: SubnetBody) -> Self {
        Subnet {
            id: SubnetId::new(body.id),
            name: body.name,
            network_id: NetworkId::new(body.network_id),
            cidr: body.cidr,
            gateway_ip: body.gateway_ip,
        }
    }
}

impl From<RouterBody> for Router {
    fn from(body: RouterBody) -> Self {
        Router {
            id: RouterId::new(body.id),
            name: body.name,
        }
    }
}

impl From<PortBody> for Port {
    fn from(body: PortBody) -> Self {
        Port {
            id: PortId::new(body.id),
            name: body.name,
            network_id: NetworkId::new(body.network_id),
            device_owner: body.device_owner,
            fixed_ips: body
                .fixed_ips
                .into_iter()
                .map(|ip| FixedIp {
                    subnet_id: SubnetId::new(ip.subnet_id),
                    ip_address: ip.ip_address,
                })
                .collect(),
        }
    }
}

impl From<FloatingIpBody> for FloatingIp {
    fn from(body: FloatingIpBody) -> Self {
        FloatingIp {
            id: FloatingIpId::new(body.id),
            address: body.floating_ip_address,
            port_id: body.port_id.map(PortId::new),
        }
    }
}

impl From<ServerBody> for Instance {
    fn from(body: ServerBody) -> Self {
        let mut networks: Vec<_> = body.addresses.into_iter().collect();
        networks.sort_by(|a, b| a.0.cmp(&b.0));

        let addresses = networks
            .into_iter()
            .flat_map(|(_, addrs)| addrs)
            .map(|a| InstanceAddress {
                addr: a.addr,
                kind: match a.ip_type.as_deref() {
                    Some("floating") => AddressKind::Floating,
                    _ => AddressKind::Fixed,
                },
            })
            .collect();

        Instance {
            id: InstanceId::new(body.id),
            name: body.name,
            status: InstanceStatus::from_api(&body.status),
            addresses,
        }
    }
}

impl OpenStackCloud {
    async fn instance_port(&self, instance: &InstanceId) -> Result<PortId, CloudError> {
        let url = self.network_url(&format!("ports?device_id={}", encode(instance.as_str())));
        let list: PortList = self.session.get(&url, "port", instance.as_str()).await?;
        list.ports
            .into_iter()
            .next()
            .map(|p| PortId::new(p.id))
            .ok_or_else(|| CloudError::not_found("instance port", instance.as_str()))
    }

    async fn server(&self, id: &InstanceId) -> Result<Instance, CloudError> {
        let url = self.compute_url(&format!("servers/{id}"));
        let envelope: ServerEnvelope = self.session.get(&url, "instance", id.as_str()).await?;
        Ok(envelope.server.into())
    }
}

#[async_trait]
impl SecurityGroupOps for OpenStackCloud {
    async fn find_security_group_by_name(
        &self,
        name: &str,
    ) -> Result<Option<SecurityGroup>, CloudError> {
        let url = self.network_url(&format!("security-groups?name={}", encode(name)));
        let list: SecurityGroupList = self.session.get(&url, "security group", name).await?;
        Ok(list
            .security_groups
            .into_iter()
            .find(|g| g.name == name)
            .map(Into::into))
    }

    async fn create_security_group(
        &self,
        name: &str,
        description: &str,
    ) -> Result<SecurityGroup, CloudError> {
        let body = json!({ "security_group": NewSecurityGroup { name, description } });
        let envelope: SecurityGroupEnvelope = self
            .session
            .send_json(
                Method::POST,
                &self.network_url("security-groups"),
                &body,
                "security group",
                name,
            )
            .await?;
        Ok(envelope.security_group.into())
    }

    async fn create_security_group_rule(
        &self,
        group: &SecurityGroupId,
        rule: &SecurityGroupRuleSpec,
    ) -> Result<SecurityGroupRuleId, CloudError> {
        let body = json!({
            "security_group_rule": NewSecurityGroupRule {
                security_group_id: group.as_str(),
                direction: rule.direction.as_str(),
                ethertype: "IPv4",
                protocol: rule.protocol.as_str(),
                port_range_min: rule.port_range.map(|(min, _)| min),
                port_range_max: rule.port_range.map(|(_, max)| max),
                remote_group_id: rule.remote_group.as_ref().map(|g| g.as_str()),
            }
        });
        let envelope: SecurityGroupRuleEnvelope = self
            .session
            .send_json(
                Method::POST,
                &self.network_url("security-group-rules"),
                &body,
                "security group",
                group.as_str(),
            )
            .await?;
        Ok(SecurityGroupRuleId::new(envelope.security_group_rule.id))
    }

    async fn delete_security_group_rule(&self, id: &SecurityGroupRuleId) -> Result<(), CloudError> {
        let url = self.network_url(&format!("security-group-rules/{id}"));
        self.session
            .delete(&url, "security group rule", id.as_str())
            .await
    }

    async fn delete_security_group(&self, id: &SecurityGroupId) -> Result<(), CloudError> {
        let url = self.network_url(&format!("security-groups/{id}"));
        self.session.delete(&url, "security group", id.as_str()).await
    }
}

#[async_trait]
impl NetworkOps for OpenStackCloud {
    async fn find_network_by_name(&self, name: &str) -> Result<Option<Network>, CloudError> {
        let url = self.network_url(&format!("networks?name={}", encode(name)));
        let list: NetworkList = self.session.get(&url, "network", name).await?;
        Ok(list
            .networks
            .into_iter()
            .find(|n| n.name == name)
            .map(Into::into))
    }

    async fn create_network(&self, name: &str) -> Result<Network, CloudError> {
        let body = json!({ "network": NewNetwork { name, admin_state_up: true } });
        let envelope: NetworkEnvelope = self
            .session
            .send_json(Method::POST, &self.network_url("networks"), &body, "network", name)
            .await?;
        Ok(envelope.network.into())
    }

    async fn delete_network(&self, id: &NetworkId) -> Result<(), CloudError> {
        let url = self.network_url(&format!("networks/{id}"));
        self.session.delete(&url, "network", id.as_str()).await
    }

    async fn list_subnets(&self) -> Result<Vec<Subnet>, CloudError> {
        let list: SubnetList = self
            .session
            .get(&self.network_url("subnets"), "subnet", "*")
            .await?;
        Ok(list.subnets.into_iter().map(Into::into).collect())
    }

    async fn create_subnet(&self, config: &SubnetConfig) -> Result<Subnet, CloudError> {
        let body = json!({
            "subnet": NewSubnet {
                name: &config.name,
                network_id: config.network_id.as_str(),
                cidr: &config.cidr,
                ip_version: 4,
                gateway_ip: config.gateway_ip.to_string(),
                enable_dhcp: true,
            }
        });
        let envelope: SubnetEnvelope = self
            .session
            .send_json(
                Method::POST,
                &self.network_url("subnets"),
                &body,
                "network",
                config.network_id.as_str(),
            )
            .await?;
        Ok(envelope.subnet.into())
    }

    async fn delete_subnet(&self, id: &SubnetId) -> Result<(), CloudError> {
        let url = self.network_url(&format!("subnets/{id}"));
        self.session.delete(&url, "subnet", id.as_str()).await
    }

    async fn find_router_by_name(&self, name: &str) -> Result<Option<Router>, CloudError> {
        let url = self.network_url(&format!("routers?name={}", encode(name)));
        let list: RouterList = self.session.get(&url, "router", name).await?;
        Ok(list
            .routers
            .into_iter()
            .find(|r| r.name == name)
            .map(Into::into))
    }

    async fn create_router(&self, config: &RouterConfig) -> Result<Router, CloudError> {
        let body = json!({
            "router": NewRouter {
                name: &config.name,
                external_gateway_info: GatewayInfo {
                    network_id: config.external_network_id.as_str(),
                },
            }
        });
        let envelope: RouterEnvelope = self
            .session
            .send_json(
                Method::POST,
                &self.network_url("routers"),
                &body,
                "external network",
                config.external_network_id.as_str(),
            )
            .await?;
        Ok(envelope.router.into())
    }

    async fn delete_router(&self, id: &RouterId) -> Result<(), CloudError> {
        let url = self.network_url(&format!("routers/{id}"));
        self.session.delete(&url, "router", id.as_str()).await
    }

    async fn create_port(&self, config: &PortConfig) -> Result<Port, CloudError> {
        let body = json!({
            "port": NewPort {
                name: &config.name,
                network_id: config.network_id.as_str(),
                fixed_ips: vec![FixedIpBody {
                    subnet_id: config.subnet_id.to_string(),
                    ip_address: config.ip_address.into(),
                }],
            }
        });
        let envelope: PortEnvelope = self
            .session
            .send_json(
                Method::POST,
                &self.network_url("ports"),
                &body,
                "subnet",
                config.subnet_id.as_str(),
            )
            .await?;
        Ok(envelope.port.into())
    }

    async fn delete_port(&self, id: &PortId) -> Result<(), CloudError> {
        let url = self.network_url(&format!("ports/{id}"));
        self.session.delete(&url, "port", id.as_str()).await
    }

    async fn list_ports_by_subnet(&self, subnet: &SubnetId) -> Result<Vec<Port>, CloudError> {
        let filter = format!("subnet_id={subnet}");
        let url = self.network_url(&format!("ports?fixed_ips={}", encode(&filter)));
        let list: PortList = self.session.get(&url, "subnet", subnet.as_str()).await?;
        Ok(list.ports.into_iter().map(Into::into).collect())
    }

    async fn attach_router_interface(
        &self,
        router: &RouterId,
        _subnet: &SubnetId,
        port: &PortId,
    ) -> Result<(), CloudError> {
        let url = self.network_url(&format!("routers/{router}/add_router_interface"));
        let body = RouterInterface {
            port_id: port.as_str(),
        };
        self.session
            .send_unit(Method::PUT, &url, &body, "router", router.as_str())
            .await
    }

    async fn detach_router_interface(
        &self,
        router: &RouterId,
        _subnet: &SubnetId,
        port: &PortId,
    ) -> Result<(), CloudError> {
        let url = self.network_url(&format!("routers/{router}/remove_router_interface"));
        let body = RouterInterface {
            port_id: port.as_str(),
        };
        self.session
            .send_unit(Method::PUT, &url, &body, "router interface", port.as_str())
            .await
    }
}

#[async_trait]
impl ComputeOps for OpenStackCloud {
    async fn list_images_by_name(&self, name: &str) -> Result<Vec<Image>, CloudError> {
        let url = self.image_url(&format!("images?name={}", encode(name)));
        let list: ImageList = self.session.get(&url, "image", name).await?;
        Ok(list
            .images
            .into_iter()
            .filter(|i| i.name == name)
            .map(|i| Image {
                id: ImageId::new(i.id),
                name: i.name,
            })
            .collect())
    }

    async fn list_flavors_by_name(&self, name: &str) -> Result<Vec<Flavor>, CloudError> {
        // Nova has no name filter for flavors.
        let list: FlavorList = self
            .session
            .get(&self.compute_url("flavors"), "flavor", name)
            .await?;
        Ok(list
            .flavors
            .into_iter()
            .filter(|f| f.name == name)
            .map(|f| Flavor {
                id: FlavorId::new(f.id),
                name: f.name,
            })
            .collect())
    }

    async fn create_instance(&self, config: &InstanceConfig) -> Result<Instance, CloudError> {
        let body = json!({
            "server": NewServer {
                name: &config.name,
                image_ref: config.image_id.as_str(),
                flavor_ref: config.flavor_id.as_str(),
                key_name: &config.keypair,
                networks: vec![ServerNetwork {
                    uuid: config.network_id.as_str(),
                }],
                security_groups: config
                    .security_groups
                    .iter()
                    .map(|name| Named { name })
                    .collect(),
            }
        });
        let created: ServerCreated = self
            .session
            .send_json(
                Method::POST,
                &self.compute_url("servers"),
                &body,
                "instance",
                &config.name,
            )
            .await?;

        Ok(Instance {
            id: InstanceId::new(created.server.id),
            name: config.name.clone(),
            status: InstanceStatus::Building,
            addresses: Vec::new(),
        })
    }

    async fn list_instances(&self) -> Result<Vec<Instance>, CloudError> {
        let list: ServerList = self
            .session
            .get(&self.compute_url("servers/detail"), "instance", "*")
            .await?;
        Ok(list.servers.into_iter().map(Into::into).collect())
    }

    async fn wait_until_running(
        &self,
        ids: &[InstanceId],
        poll: Duration,
        timeout: Duration,
    ) -> Result<Vec<Instance>, CloudError> {
        let result = wait::poll_until(poll, timeout, || async move {
            let mut ready = Vec::with_capacity(ids.len());
            for id in ids {
                let instance = self.server(id).await?;
                match instance.status {
                    InstanceStatus::Active => ready.push(instance),
                    InstanceStatus::Error => {
                        return Err(CloudError::InstanceFailed(instance.name));
                    }
                    _ => {
                        debug!(instance = %instance.name, status = ?instance.status, "instance not ready");
                        return Ok(None);
                    }
                }
            }
            Ok(Some(ready))
        })
        .await;

        match result {
            Ok(instances) => Ok(instances),
            Err(PollError::TimedOut) => Err(CloudError::Timeout(
                timeout,
                format!("{} instance(s) to become active", ids.len()),
            )),
            Err(PollError::Check(e)) => Err(e),
        }
    }

    async fn delete_instance(&self, id: &InstanceId) -> Result<(), CloudError> {
        let url = self.compute_url(&format!("servers/{id}"));
        self.session.delete(&url, "instance", id.as_str()).await
    }
}

#[async_trait]
impl KeypairOps for OpenStackCloud {
    async fn find_keypair_by_name(&self, name: &str) -> Result<Option<Keypair>, CloudError> {
        let url = self.compute_url(&format!("os-keypairs/{}", encode(name)));
        match self.session.get::<KeypairEnvelope>(&url, "keypair", name).await {
            Ok(envelope) => Ok(Some(Keypair {
                name: envelope.keypair.name,
                fingerprint: envelope.keypair.fingerprint,
            })),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_keypair(&self, name: &str) -> Result<KeyMaterial, CloudError> {
        let body = json!({ "keypair": NewKeypair { name } });
        let envelope: KeypairEnvelope = self
            .session
            .send_json(
                Method::POST,
                &self.compute_url("os-keypairs"),
                &body,
                "keypair",
                name,
            )
            .await?;

        let keypair = envelope.keypair;
        let private_key = keypair.private_key.ok_or_else(|| {
            CloudError::InvalidResponse(format!("keypair {name} was created without a private key"))
        })?;

        Ok(KeyMaterial {
            name: keypair.name,
            private_key,
            public_key: keypair.public_key.unwrap_or_default(),
        })
    }

    async fn delete_keypair(&self, name: &str) -> Result<(), CloudError> {
        let url = self.compute_url(&format!("os-keypairs/{}", encode(name)));
        self.session.delete(&url, "keypair", name).await
    }
}

#[async_trait]
impl FloatingIpOps for OpenStackCloud {
    async fn create_floating_ip(&self, config: &FloatingIpConfig) -> Result<FloatingIp, CloudError> {
        let body = json!({
            "floatingip": NewFloatingIp {
                floating_network_id: config.external_network_id.as_str(),
                description: &config.description,
            }
        });
        let envelope: FloatingIpEnvelope = self
            .session
            .send_json(
                Method::POST,
                &self.network_url("floatingips"),
                &body,
                "external network",
                config.external_network_id.as_str(),
            )
            .await?;
        Ok(envelope.floatingip.into())
    }

    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>, CloudError> {
        let list: FloatingIpList = self
            .session
            .get(&self.network_url("floatingips"), "floating IP", "*")
            .await?;
        Ok(list.floatingips.into_iter().map(Into::into).collect())
    }

    async fn attach_floating_ip(
        &self,
        instance: &InstanceId,
        floating_ip: &FloatingIp,
    ) -> Result<(), CloudError> {
        let port = self.instance_port(instance).await?;
        let url = self.network_url(&format!("floatingips/{}", floating_ip.id));
        let body = json!({ "floatingip": FloatingIpPort { port_id: Some(port.as_str()) } });
        self.session
            .send_unit(Method::PUT, &url, &body, "floating IP", floating_ip.id.as_str())
            .await
    }

    async fn detach_floating_ip(
        &self,
        _instance: &InstanceId,
        floating_ip: &FloatingIp,
    ) -> Result<(), CloudError> {
        let url = self.network_url(&format!("floatingips/{}", floating_ip.id));
        let body = json!({ "floatingip": FloatingIpPort { port_id: None } });
        self.session
            .send_unit(Method::PUT, &url, &body, "floating IP", floating_ip.id.as_str())
            .await
    }

    async fn delete_floating_ip(&self, id: &FloatingIpId) -> Result<(), CloudError> {
        let url = self.network_url(&format!("floatingips/{id}"));
        self.session.delete(&url, "floating IP", id.as_str()).await
    }
}
