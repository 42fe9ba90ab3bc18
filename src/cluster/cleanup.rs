// ABOUTME: Cluster cleanup: floating IPs, instances, keypair, network, security group.
// ABOUTME: Absent resources are skipped with a warning; only a stuck termination is fatal.

use std::collections::HashSet;
use std::convert::Infallible;

use tracing::{debug, info, warn};

use crate::cloud::wait::{self, PollError};
use crate::cloud::{
    CloudError, ComputeOps, FloatingIpOps, FullCloud, Instance, KeypairOps, NetworkOps,
    SecurityGroupOps,
};
use crate::diagnostics::{Diagnostics, Warning};

use super::error::{ClusterError, ConvergenceTimeoutSnafu};
use super::lifecycle::Cluster;
use super::state::{Cleanable, Gone};

/// Outcome of one cleanup call: the value, or `None` after recording why not.
fn settle<T>(diag: &mut Diagnostics, what: &str, result: Result<T, CloudError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_not_found() => {
            diag.warn(Warning::missing_resource(format!("{what}: not found, skipping")));
            None
        }
        Err(e) => {
            diag.warn(Warning::cleanup_failure(format!("{what} failed: {e}")));
            None
        }
    }
}

/// Like [`settle`] for lookups, where absence is `Ok(None)`.
fn found<T>(
    diag: &mut Diagnostics,
    kind: &str,
    name: &str,
    result: Result<Option<T>, CloudError>,
) -> Option<T> {
    match result {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            diag.warn(Warning::missing_resource(format!(
                "{kind} {name} not found, skipping"
            )));
            None
        }
        Err(e) => settle(diag, &format!("looking up {kind} {name}"), Err(e)),
    }
}

impl<S: Cleanable> Cluster<S> {
    /// Remove every resource this project may own, in dependency order.
    ///
    /// Safe to run against a partial or empty cluster. Returns an error only
    /// when instance termination does not finish in time, since the network
    /// cannot be removed while instances remain.
    pub async fn cleanup<C: FullCloud>(
        self,
        cloud: &C,
        diag: &mut Diagnostics,
    ) -> Result<Cluster<Gone>, ClusterError> {
        info!(project = %self.spec.project, "cleaning up cluster");

        let identities = self.expected_instances();
        let expected: HashSet<&str> = identities.iter().map(|i| i.full_name.as_str()).collect();

        self.release_floating_ips(cloud, &expected, diag).await;
        self.terminate_instances(cloud, &expected, diag).await?;
        self.delete_keypair(cloud, diag).await;
        self.delete_network(cloud, diag).await;
        self.delete_security_group(cloud, diag).await;

        info!(project = %self.spec.project, "cleanup finished");
        Ok(self.transition(Gone))
    }

    async fn release_floating_ips<C: ComputeOps + FloatingIpOps>(
        &self,
        cloud: &C,
        expected: &HashSet<&str>,
        diag: &mut Diagnostics,
    ) {
        let Some(instances) = settle(diag, "listing instances", cloud.list_instances().await)
        else {
            return;
        };

        let holders: Vec<&Instance> = instances
            .iter()
            .filter(|i| expected.contains(i.name.as_str()))
            .filter(|i| !i.floating_addresses().is_empty())
            .collect();
        if holders.is_empty() {
            diag.warn(Warning::missing_resource(
                "no floating IPs attached to cluster instances, skipping",
            ));
            return;
        }

        let Some(floating_ips) = settle(
            diag,
            "listing floating IPs",
            cloud.list_floating_ips().await,
        ) else {
            return;
        };

        for instance in holders {
            for address in instance.floating_addresses() {
                let Some(floating_ip) = floating_ips.iter().find(|f| f.address == address) else {
                    diag.warn(Warning::missing_resource(format!(
                        "floating IP {address} on {} not found, skipping",
                        instance.name
                    )));
                    continue;
                };

                info!(instance = %instance.name, %address, "releasing floating IP");
                settle(
                    diag,
                    &format!("detaching floating IP {address} from {}", instance.name),
                    cloud.detach_floating_ip(&instance.id, floating_ip).await,
                );
                settle(
                    diag,
                    &format!("deleting floating IP {address}"),
                    cloud.delete_floating_ip(&floating_ip.id).await,
                );
            }
        }
    }

    async fn terminate_instances<C: ComputeOps>(
        &self,
        cloud: &C,
        expected: &HashSet<&str>,
        diag: &mut Diagnostics,
    ) -> Result<(), ClusterError> {
        let Some(instances) = settle(diag, "listing instances", cloud.list_instances().await)
        else {
            return Ok(());
        };

        let doomed: Vec<&Instance> = instances
            .iter()
            .filter(|i| expected.contains(i.name.as_str()))
            .collect();
        if doomed.is_empty() {
            diag.warn(Warning::missing_resource(
                "no cluster instances found, skipping termination",
            ));
            return Ok(());
        }

        for instance in &doomed {
            info!(instance = %instance.name, "terminating instance");
            settle(
                diag,
                &format!("terminating instance {}", instance.name),
                cloud.delete_instance(&instance.id).await,
            );
        }

        let vm = &self.spec.vm_management;
        let result = wait::poll_until(vm.terminate_vm_poll, vm.terminate_timeout, || async move {
            let live = match cloud.list_instances().await {
                Ok(live) => live,
                Err(e) => {
                    warn!(error = %e, "listing instances failed while waiting for termination");
                    return Ok::<_, Infallible>(None);
                }
            };
            let remaining = live
                .iter()
                .filter(|i| expected.contains(i.name.as_str()))
                .count();
            if remaining == 0 {
                Ok(Some(()))
            } else {
                debug!(remaining, "waiting for instances to terminate");
                Ok(None)
            }
        })
        .await;

        match result {
            Ok(()) => {
                info!(count = doomed.len(), "instances terminated");
                Ok(())
            }
            Err(PollError::TimedOut) => {
                let remaining: Vec<String> = cloud
                    .list_instances()
                    .await
                    .map(|live| {
                        live.into_iter()
                            .filter(|i| expected.contains(i.name.as_str()))
                            .map(|i| i.name)
                            .collect()
                    })
                    .unwrap_or_default();
                ConvergenceTimeoutSnafu {
                    timeout: vm.terminate_timeout,
                    remaining,
                }
                .fail()
            }
            Err(PollError::Check(never)) => match never {},
        }
    }

    async fn delete_keypair<C: KeypairOps>(&self, cloud: &C, diag: &mut Diagnostics) {
        let name = &self.names.keypair;
        let lookup = cloud.find_keypair_by_name(name).await;

        if found(diag, "SSH keypair", name, lookup).is_some() {
            info!(keypair = %name, "deleting keypair");
            settle(
                diag,
                &format!("deleting keypair {name}"),
                cloud.delete_keypair(name).await,
            );
        }
    }

    async fn delete_network<C: NetworkOps>(&self, cloud: &C, diag: &mut Diagnostics) {
        let names = &self.names;

        let router_lookup = cloud.find_router_by_name(&names.router).await;
        let router = found(diag, "router", &names.router, router_lookup);
        let network_lookup = cloud.find_network_by_name(&names.network).await;
        let network = found(diag, "network", &names.network, network_lookup);

        if let Some(network) = &network {
            if network.subnet_ids.is_empty() {
                diag.warn(Warning::missing_resource(format!(
                    "network {} has no subnet, skipping port cleanup",
                    network.name
                )));
            }

            for subnet in &network.subnet_ids {
                let Some(ports) = settle(
                    diag,
                    &format!("listing ports of subnet {subnet}"),
                    cloud.list_ports_by_subnet(subnet).await,
                ) else {
                    continue;
                };

                for port in ports {
                    if let Some(router) = &router {
                        match cloud
                            .detach_router_interface(&router.id, subnet, &port.id)
                            .await
                        {
                            Ok(()) => info!(port = %port.id, router = %router.name, "removed router interface"),
                            Err(e) if e.is_not_found() => {
                                info!(port = %port.id, error = %e, "port is not a router interface");
                            }
                            Err(e) => diag.warn(Warning::cleanup_failure(format!(
                                "removing interface {} from router {} failed: {e}",
                                port.id, router.name
                            ))),
                        }
                    }

                    if port.is_provider_owned() {
                        debug!(port = %port.id, owner = %port.device_owner, "leaving provider-owned port");
                        continue;
                    }

                    info!(port = %port.id, "deleting port");
                    settle(
                        diag,
                        &format!("deleting port {}", port.id),
                        cloud.delete_port(&port.id).await,
                    );
                }
            }
        }

        if let Some(router) = router {
            info!(router = %router.name, "deleting router");
            settle(
                diag,
                &format!("deleting router {}", router.name),
                cloud.delete_router(&router.id).await,
            );
        }

        if let Some(network) = network {
            for subnet in &network.subnet_ids {
                info!(%subnet, "deleting subnet");
                settle(
                    diag,
                    &format!("deleting subnet {subnet}"),
                    cloud.delete_subnet(subnet).await,
                );
            }

            info!(network = %network.name, "deleting network");
            settle(
                diag,
                &format!("deleting network {}", network.name),
                cloud.delete_network(&network.id).await,
            );
        }
    }

    async fn delete_security_group<C: SecurityGroupOps>(&self, cloud: &C, diag: &mut Diagnostics) {
        let name = &self.names.security_group;
        let lookup = cloud.find_security_group_by_name(name).await;

        let Some(group) = found(diag, "security group", name, lookup) else {
            return;
        };

        for rule in &group.rules {
            settle(
                diag,
                &format!("deleting security group rule {rule}"),
                cloud.delete_security_group_rule(rule).await,
            );
        }

        info!(security_group = %name, "deleting security group");
        settle(
            diag,
            &format!("deleting security group {name}"),
            cloud.delete_security_group(&group.id).await,
        );
    }
}
