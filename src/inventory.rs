// ABOUTME: Resolves per-instance inventory groups and variables from ansible_settings.
// ABOUTME: Output is plain data for an inventory templating step; nothing is rendered here.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cluster::RosterEntry;
use crate::config::{ClusterSpec, Scalar, VarValue};
use crate::hosts::{self, InstanceIdentity};
use crate::rules::{self, InventoryValue, Substitution};

/// One instance as it appears in an inventory group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryHost {
    /// Inventory alias (`<host>[_n]`).
    pub name: String,
    /// Cloud instance name (`<project>-<host>[_n]`).
    pub instance: String,
    pub vars: BTreeMap<String, Scalar>,
}

/// Inventory groups keyed by group name, members in spec order.
pub type Inventory = BTreeMap<String, Vec<InventoryHost>>;

/// Build inventory groups for every instance of `spec`.
///
/// `item_vars` apply to every instance of a host; each `group_vars` entry
/// applies according to its index rule. Substitutions that need an address
/// are omitted for instances missing from `roster`.
pub fn resolve_inventory_hosts(spec: &ClusterSpec, roster: &[RosterEntry]) -> Inventory {
    let mut groups = Inventory::new();

    for identity in hosts::expand(&spec.project, &spec.hosts) {
        let Some(host) = spec.hosts.iter().find(|h| h.name == identity.host) else {
            continue;
        };
        let entry = roster.iter().find(|e| e.name == identity.full_name);

        for setting in &host.ansible_settings {
            let mut vars = BTreeMap::new();

            for item in &setting.item_vars {
                for (key, value) in item {
                    if let Some(resolved) = render(value, &identity, entry) {
                        vars.insert(key.clone(), resolved);
                    }
                }
            }

            for group_var in &setting.group_vars {
                for (key, value) in &group_var.vars {
                    let resolved = match rules::resolve_inventory(
                        group_var.index,
                        identity.position,
                        value,
                    ) {
                        Some(InventoryValue::Payload(value)) => render(value, &identity, entry),
                        Some(InventoryValue::Ordinal(ordinal)) => Some(Scalar::Text(ordinal)),
                        None => None,
                    };
                    if let Some(resolved) = resolved {
                        vars.insert(key.clone(), resolved);
                    }
                }
            }

            groups
                .entry(setting.ansible_group.clone())
                .or_default()
                .push(InventoryHost {
                    name: identity.inventory_name.clone(),
                    instance: identity.full_name.clone(),
                    vars,
                });
        }
    }

    groups
}

fn render(
    value: &VarValue,
    identity: &InstanceIdentity,
    entry: Option<&RosterEntry>,
) -> Option<Scalar> {
    match value {
        VarValue::Literal(scalar) => Some(scalar.clone()),
        VarValue::Substitute { substitute } => {
            substitute_value(*substitute, identity, entry).map(Scalar::Text)
        }
    }
}

/// The per-instance value a substitution stands for, if known.
pub fn substitute_value(
    substitution: Substitution,
    identity: &InstanceIdentity,
    entry: Option<&RosterEntry>,
) -> Option<String> {
    match substitution {
        Substitution::HostName => Some(identity.full_name.clone()),
        Substitution::InventoryName => Some(identity.inventory_name.clone()),
        Substitution::AnsibleHost => entry.map(|e| e.reachable_address().to_string()),
        Substitution::PrivateAddress => entry.map(|e| e.private_address.to_string()),
        Substitution::PublicAddress => entry
            .and_then(|e| e.public_address)
            .map(|a| a.to_string()),
    }
}
