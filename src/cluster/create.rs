// ABOUTME: Cluster creation: security group, network, keypair, instances, floating IPs.
// ABOUTME: Fatal steps abort into the Failed state; partial resources stay for cleanup.

use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::time::Instant;

use snafu::{OptionExt, ResultExt};
use tracing::{debug, error, info, warn};

use crate::cidr;
use crate::cloud::{
    CloudError, ComputeOps, Direction, FloatingIpConfig, FloatingIpOps, FullCloud, Instance,
    InstanceConfig, KeypairOps, Network, NetworkOps, PortConfig, Protocol, RouterConfig,
    SecurityGroup, SecurityGroupOps, SecurityGroupRuleSpec, SubnetConfig,
};
use crate::config::CidrSetting;
use crate::diagnostics::{Diagnostics, Warning};
use crate::hosts::{self, InstanceIdentity};
use crate::rules;
use crate::types::SecurityGroupId;

use super::cache::RunCache;
use super::error::{
    CloudSnafu, ClusterError, CollisionSnafu, InvalidCidrSnafu, KeyMaterialSnafu,
    MissingDependencySnafu, ResourceKind, StartupTimeoutSnafu,
};
use super::keys;
use super::lifecycle::{Cluster, TransitionResult};
use super::roster::{RosterEntry, build_roster};
use super::state::{CreateStage, Failed, Idle, Ready};

/// Name of the security group every tenant has.
const DEFAULT_SECURITY_GROUP: &str = "default";

/// Rules added to a fresh project security group: all TCP between members.
pub fn default_rules(group: &SecurityGroupId) -> [SecurityGroupRuleSpec; 2] {
    [
        SecurityGroupRuleSpec::within_group(Direction::Ingress, Protocol::Tcp, group),
        SecurityGroupRuleSpec::within_group(Direction::Egress, Protocol::Tcp, group),
    ]
}

impl Cluster<Idle> {
    /// Provision the whole cluster.
    ///
    /// On failure the cluster comes back in [`Failed`] with the stage that
    /// broke; nothing is rolled back, so call `cleanup()` to remove leftovers.
    pub async fn create<C: FullCloud>(
        self,
        cloud: &C,
        diag: &mut Diagnostics,
    ) -> TransitionResult<Ready, Failed> {
        info!(project = %self.spec.project, "creating cluster");

        let mut cache = RunCache::new();
        let mut stage = CreateStage::SecurityGroup;

        match self.run_create(cloud, &mut cache, &mut stage, diag).await {
            Ok(roster) => {
                info!(
                    project = %self.spec.project,
                    instances = roster.len(),
                    "cluster created"
                );
                Ok(self.transition(Ready { roster }))
            }
            Err(e) => {
                error!(project = %self.spec.project, %stage, error = %e, "cluster creation failed");
                Err((self.transition(Failed { stage }), e))
            }
        }
    }

    async fn run_create<C: FullCloud>(
        &self,
        cloud: &C,
        cache: &mut RunCache,
        stage: &mut CreateStage,
        diag: &mut Diagnostics,
    ) -> Result<Vec<RosterEntry>, ClusterError> {
        *stage = CreateStage::SecurityGroup;
        let group = self.create_security_group(cloud).await?;

        *stage = CreateStage::Network;
        let network = self.create_network(cloud, cache).await?;

        *stage = CreateStage::Keypair;
        self.ensure_keypair(cloud, diag).await?;

        *stage = CreateStage::Instances;
        let identities = self.expected_instances();
        let running = self
            .create_instances(cloud, cache, &group, &network, &identities)
            .await?;

        *stage = CreateStage::FloatingIps;
        let attached = self
            .assign_floating_ips(cloud, cache, &identities, &running, diag)
            .await?;

        *stage = CreateStage::Roster;
        let live = cloud.list_instances().await.context(CloudSnafu {
            step: "list instances",
        })?;
        Ok(build_roster(&identities, &live, &attached, diag))
    }

    async fn create_security_group<C: SecurityGroupOps>(
        &self,
        cloud: &C,
    ) -> Result<SecurityGroup, ClusterError> {
        let name = &self.names.security_group;

        let existing = cloud
            .find_security_group_by_name(name)
            .await
            .context(CloudSnafu {
                step: "look up security group",
            })?;
        if existing.is_some() {
            error!(
                security_group = %name,
                "security group already exists; cluster creation does not continue"
            );
            return CollisionSnafu {
                kind: ResourceKind::SecurityGroup,
                name: name.as_str(),
            }
            .fail();
        }

        info!(security_group = %name, "creating security group");
        let description = format!("Security group for project {}", self.spec.project);
        let group = cloud
            .create_security_group(name, &description)
            .await
            .context(CloudSnafu {
                step: "create security group",
            })?;

        for rule in default_rules(&group.id) {
            cloud
                .create_security_group_rule(&group.id, &rule)
                .await
                .context(CloudSnafu {
                    step: "create security group rule",
                })?;
        }

        Ok(group)
    }

    async fn create_network<C: NetworkOps>(
        &self,
        cloud: &C,
        cache: &mut RunCache,
    ) -> Result<Network, ClusterError> {
        let names = &self.names;
        let settings = &self.spec.network;

        let existing = cloud
            .find_network_by_name(&names.network)
            .await
            .context(CloudSnafu {
                step: "look up network",
            })?;
        if existing.is_some() {
            error!(network = %names.network, "network already exists; use a unique project name");
            return CollisionSnafu {
                kind: ResourceKind::Network,
                name: names.network.as_str(),
            }
            .fail();
        }

        let cidr = match &settings.cidr {
            CidrSetting::Explicit(cidr) => cidr.clone(),
            CidrSetting::Auto => {
                let subnets = cloud.list_subnets().await.context(CloudSnafu {
                    step: "list subnets",
                })?;
                let taken: Vec<&str> = subnets.iter().map(|s| s.cidr.as_str()).collect();
                cidr::next_free_cidr(&settings.cidr_template, &taken).context(InvalidCidrSnafu)?
            }
        };
        let gateway = cidr::gateway_address(&cidr).context(InvalidCidrSnafu)?;

        info!(network = %names.network, %cidr, "creating network");
        let network = cloud
            .create_network(&names.network)
            .await
            .context(CloudSnafu {
                step: "create network",
            })?;

        info!(subnet = %names.subnet, %cidr, %gateway, "creating subnet");
        let subnet = cloud
            .create_subnet(&SubnetConfig {
                name: names.subnet.clone(),
                network_id: network.id.clone(),
                cidr: cidr.clone(),
                gateway_ip: gateway,
            })
            .await
            .context(CloudSnafu {
                step: "create subnet",
            })?;

        let ext_name = &settings.ext_net_name;
        let Some(external) = cache
            .external_network(cloud, ext_name)
            .await
            .context(CloudSnafu {
                step: "look up external network",
            })?
        else {
            error!(external_network = %ext_name, "cannot wire router to external network");
            return MissingDependencySnafu {
                kind: ResourceKind::ExternalNetwork,
                name: ext_name.as_str(),
            }
            .fail();
        };

        info!(router = %names.router, external_network = %external.name, "creating router");
        let router = cloud
            .create_router(&RouterConfig {
                name: names.router.clone(),
                external_network_id: external.id.clone(),
            })
            .await
            .context(CloudSnafu {
                step: "create router",
            })?;

        let port = cloud
            .create_port(&PortConfig {
                name: names.router_port.clone(),
                network_id: network.id.clone(),
                subnet_id: subnet.id.clone(),
                ip_address: gateway,
            })
            .await
            .context(CloudSnafu {
                step: "create router port",
            })?;

        debug!(router = %names.router, port = %port.id, "attaching router interface");
        cloud
            .attach_router_interface(&router.id, &subnet.id, &port.id)
            .await
            .context(CloudSnafu {
                step: "attach router interface",
            })?;

        Ok(network)
    }

    async fn ensure_keypair<C: KeypairOps>(
        &self,
        cloud: &C,
        diag: &mut Diagnostics,
    ) -> Result<(), ClusterError> {
        let name = &self.names.keypair;
        let project_dir = self.spec.project_dir();

        let existing = cloud
            .find_keypair_by_name(name)
            .await
            .context(CloudSnafu {
                step: "look up keypair",
            })?;

        if existing.is_some() {
            info!(keypair = %name, "reusing existing keypair");
            if !keys::private_key_path(&project_dir, name).exists() {
                diag.warn(Warning::key_material(format!(
                    "keypair {name} already exists but {} has no private key for it",
                    project_dir.display()
                )));
            }
            return Ok(());
        }

        info!(keypair = %name, dir = %project_dir.display(), "creating keypair");
        let material = cloud.create_keypair(name).await.context(CloudSnafu {
            step: "create keypair",
        })?;
        keys::persist(&project_dir, &material).context(KeyMaterialSnafu {
            path: project_dir.clone(),
        })?;

        Ok(())
    }

    async fn create_instances<C: ComputeOps + SecurityGroupOps>(
        &self,
        cloud: &C,
        cache: &mut RunCache,
        group: &SecurityGroup,
        network: &Network,
        identities: &[InstanceIdentity],
    ) -> Result<Vec<Instance>, ClusterError> {
        let vm = &self.spec.vm_management;

        let mut security_groups = vec![group.name.clone()];
        if vm.attach_default_security_group {
            let default = cloud
                .find_security_group_by_name(DEFAULT_SECURITY_GROUP)
                .await
                .context(CloudSnafu {
                    step: "look up default security group",
                })?;
            if default.is_some() {
                security_groups.push(DEFAULT_SECURITY_GROUP.to_string());
            }
        }

        let mut ids = Vec::with_capacity(identities.len());
        for identity in identities {
            let host = self.spec.hosts.iter().find(|h| h.name == identity.host);
            let image_name = host
                .and_then(|h| h.image_name.as_deref())
                .unwrap_or(&vm.default_image_name);
            let flavor_name = host
                .and_then(|h| h.vm_flavor.as_deref())
                .unwrap_or(&vm.default_vm_flavor);

            let image = cache
                .image(cloud, image_name)
                .await
                .context(CloudSnafu {
                    step: "look up image",
                })?
                .context(MissingDependencySnafu {
                    kind: ResourceKind::Image,
                    name: image_name,
                })?;
            let flavor = cache
                .flavor(cloud, flavor_name)
                .await
                .context(CloudSnafu {
                    step: "look up flavor",
                })?
                .context(MissingDependencySnafu {
                    kind: ResourceKind::Flavor,
                    name: flavor_name,
                })?;

            info!(
                instance = %identity.full_name,
                image = %image.name,
                flavor = %flavor.name,
                "creating instance"
            );
            let instance = cloud
                .create_instance(&InstanceConfig {
                    name: identity.full_name.clone(),
                    image_id: image.id,
                    flavor_id: flavor.id,
                    keypair: self.names.keypair.clone(),
                    network_id: network.id.clone(),
                    security_groups: security_groups.clone(),
                })
                .await
                .context(CloudSnafu {
                    step: "create instance",
                })?;
            ids.push(instance.id);
        }

        info!(count = ids.len(), "waiting for instances to become active");
        let started = Instant::now();
        match cloud
            .wait_until_running(&ids, vm.startup_poll, vm.hosts_startup_timeout)
            .await
        {
            Ok(running) => {
                info!(
                    count = running.len(),
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "instances active"
                );
                Ok(running)
            }
            Err(CloudError::Timeout(..)) => StartupTimeoutSnafu {
                timeout: vm.hosts_startup_timeout,
                count: ids.len(),
            }
            .fail(),
            Err(e) => Err(e).context(CloudSnafu {
                step: "wait for instances",
            }),
        }
    }

    async fn assign_floating_ips<C: NetworkOps + FloatingIpOps>(
        &self,
        cloud: &C,
        cache: &mut RunCache,
        identities: &[InstanceIdentity],
        running: &[Instance],
        diag: &mut Diagnostics,
    ) -> Result<HashMap<String, IpAddr>, ClusterError> {
        let ext_name = &self.spec.network.ext_net_name;
        let mut assigned = HashSet::new();
        let mut attached = HashMap::new();

        for host in &self.spec.hosts {
            for rule in host.public_ip_rules() {
                let external = cache
                    .external_network(cloud, ext_name)
                    .await
                    .context(CloudSnafu {
                        step: "look up external network",
                    })?
                    .context(MissingDependencySnafu {
                        kind: ResourceKind::ExternalNetwork,
                        name: ext_name.as_str(),
                    })?;

                for position in rules::floating_ip_targets(rule.index, host.count) {
                    let Some(identity) = hosts::find(identities, &host.name, position) else {
                        diag.warn(Warning::missing_resource(format!(
                            "host {} has no instance at index {position}; no floating IP assigned",
                            host.name
                        )));
                        continue;
                    };
                    if !assigned.insert(identity.full_name.as_str()) {
                        debug!(instance = %identity.full_name, "floating IP already assigned");
                        continue;
                    }
                    let Some(instance) = running.iter().find(|i| i.name == identity.full_name)
                    else {
                        diag.warn(Warning::missing_resource(format!(
                            "instance {} is not running; no floating IP assigned",
                            identity.full_name
                        )));
                        continue;
                    };

                    let floating_ip = cloud
                        .create_floating_ip(&FloatingIpConfig {
                            external_network_id: external.id.clone(),
                            description: format!("Floating IP for {}", identity.full_name),
                        })
                        .await
                        .context(CloudSnafu {
                            step: "allocate floating IP",
                        })?;

                    info!(
                        instance = %identity.full_name,
                        address = %floating_ip.address,
                        "assigning floating IP"
                    );
                    match cloud.attach_floating_ip(&instance.id, &floating_ip).await {
                        Ok(()) => {
                            attached.insert(identity.full_name.clone(), floating_ip.address);
                        }
                        Err(e) => {
                            diag.warn(Warning::floating_ip_attach(format!(
                                "could not attach {} to {}: {e}",
                                floating_ip.address, identity.full_name
                            )));
                            if let Err(e) = cloud.delete_floating_ip(&floating_ip.id).await {
                                warn!(
                                    address = %floating_ip.address,
                                    error = %e,
                                    "could not release unattached floating IP"
                                );
                            }
                        }
                    }
                }
            }
        }

        Ok(attached)
    }
}
