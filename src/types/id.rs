// ABOUTME: Phantom-typed identifiers for cloud resources.
// ABOUTME: Prevents accidental swapping of network, subnet, router, port and instance IDs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
/// Using empty enums prevents instantiation and requires no trait bounds.
pub enum SecurityGroupMarker {}
pub enum SecurityGroupRuleMarker {}
pub enum NetworkMarker {}
pub enum SubnetMarker {}
pub enum RouterMarker {}
pub enum PortMarker {}
pub enum InstanceMarker {}
pub enum FloatingIpMarker {}
pub enum ImageMarker {}
pub enum FlavorMarker {}

/// A cloud-assigned identifier tagged with the kind of resource it names.
///
/// The cloud hands back plain strings for every resource; the phantom marker
/// keeps a `SubnetId` from being passed where a `NetworkId` is expected.
#[must_use = "IDs reference resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

// Manual impls: deriving would put bounds on the marker type.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Id").field("value", &self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type SecurityGroupId = Id<SecurityGroupMarker>;
pub type SecurityGroupRuleId = Id<SecurityGroupRuleMarker>;
pub type NetworkId = Id<NetworkMarker>;
pub type SubnetId = Id<SubnetMarker>;
pub type RouterId = Id<RouterMarker>;
pub type PortId = Id<PortMarker>;
pub type InstanceId = Id<InstanceMarker>;
pub type FloatingIpId = Id<FloatingIpMarker>;
pub type ImageId = Id<ImageMarker>;
pub type FlavorId = Id<FlavorMarker>;
