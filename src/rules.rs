// ABOUTME: Index rules that bind per-host variables to instance positions.
// ABOUTME: Inventory and floating-IP contexts read the same selector differently.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Which instances of a host a rule refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexSelector {
    /// A single 0-based position.
    Index(usize),
    /// Every position.
    #[default]
    All,
    /// Every position; in the inventory context the value becomes the 1-based ordinal.
    Counter,
}

impl fmt::Display for IndexSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexSelector::Index(i) => write!(f, "{i}"),
            IndexSelector::All => write!(f, "all"),
            IndexSelector::Counter => write!(f, "counter"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelector {
    Index(usize),
    Word(String),
}

impl<'de> Deserialize<'de> for IndexSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawSelector::deserialize(deserializer)? {
            RawSelector::Index(i) => Ok(IndexSelector::Index(i)),
            RawSelector::Word(w) => match w.as_str() {
                "all" => Ok(IndexSelector::All),
                "counter" => Ok(IndexSelector::Counter),
                other => Err(serde::de::Error::custom(format!(
                    "invalid index '{other}': expected a number, 'all' or 'counter'"
                ))),
            },
        }
    }
}

impl Serialize for IndexSelector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IndexSelector::Index(i) => serializer.serialize_u64(*i as u64),
            IndexSelector::All => serializer.serialize_str("all"),
            IndexSelector::Counter => serializer.serialize_str("counter"),
        }
    }
}

/// Value produced by an inventory rule at one position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryValue<'a, T> {
    /// The rule's own payload applies unchanged.
    Payload(&'a T),
    /// The payload is replaced by the instance's 1-based ordinal.
    Ordinal(String),
}

/// Resolve an inventory/group-variable rule for the instance at `position`.
///
/// `Index(k)` applies only when `k == position`, `All` applies everywhere,
/// and `Counter` applies everywhere with the payload swapped for `position + 1`.
pub fn resolve_inventory<T>(
    selector: IndexSelector,
    position: usize,
    payload: &T,
) -> Option<InventoryValue<'_, T>> {
    match selector {
        IndexSelector::Index(k) if k == position => Some(InventoryValue::Payload(payload)),
        IndexSelector::Index(_) => None,
        IndexSelector::All => Some(InventoryValue::Payload(payload)),
        IndexSelector::Counter => Some(InventoryValue::Ordinal((position + 1).to_string())),
    }
}

/// Positions a floating-IP rule acts on for a host with `count` instances.
///
/// `All` and `Counter` both select every position; `Index(k)` selects only `k`.
/// An out-of-range `k` is returned as-is; callers skip positions they cannot find.
pub fn floating_ip_targets(selector: IndexSelector, count: usize) -> Vec<usize> {
    match selector {
        IndexSelector::All | IndexSelector::Counter => (0..count).collect(),
        IndexSelector::Index(k) => vec![k],
    }
}

/// Per-instance values an inventory variable can be substituted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Substitution {
    /// Address to reach the instance: public when attached, otherwise private.
    AnsibleHost,
    /// Full cloud name of the instance (`<project>-<host>[_n]`).
    HostName,
    /// Inventory alias without the project prefix (`<host>[_n]`).
    InventoryName,
    /// Fixed address on the project network.
    PrivateAddress,
    /// Floating address, if one is attached.
    PublicAddress,
}
