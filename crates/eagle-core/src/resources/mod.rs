pub mod quantities;

pub use quantities::{parse_cpu, parse_memory, parse_milli_value, QuantityError};

use crate::{EagleError, Result};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Serialize;
use std::collections::BTreeMap;

/// Resource list as found in container requests, pod overhead and node allocatable
pub type ResourceList = BTreeMap<String, Quantity>;

/// CPU, in millicores
pub const RESOURCE_CPU: &str = "cpu";
/// Memory, in bytes
pub const RESOURCE_MEMORY: &str = "memory";
/// Local ephemeral storage, in bytes
pub const RESOURCE_EPHEMERAL_STORAGE: &str = "ephemeral-storage";
/// Number of pods a node accepts
pub const RESOURCE_PODS: &str = "pods";

/// Aggregated resource vector of a pod request or a node's capacity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resource {
    /// CPU in millicores (1000 = 1 core)
    pub milli_cpu: i64,
    /// Memory in bytes
    pub memory: i64,
    /// Ephemeral storage in bytes
    pub ephemeral_storage: i64,
    /// Pod slots; only meaningful for node allocatable
    pub allowed_pod_number: i64,
    /// Every other named resource (extended resources, hugepages, ...)
    pub scalar_resources: BTreeMap<String, i64>,
}

impl Resource {
    /// Build a resource vector from a resource list
    pub fn from_resource_list(list: &ResourceList) -> Result<Self> {
        let mut resource = Self::default();
        resource.add(list)?;
        Ok(resource)
    }

    /// Add every quantity of the list to this vector
    pub fn add(&mut self, list: &ResourceList) -> Result<()> {
        for (name, quantity) in list {
            let value = parse_named(name, quantity)?;
            checked_accumulate(self.slot_mut(name), value, name)?;
        }
        Ok(())
    }

    /// Raise every component to at least the value found in the list
    pub fn set_max_resource(&mut self, list: &ResourceList) -> Result<()> {
        for (name, quantity) in list {
            let value = parse_named(name, quantity)?;
            let slot = self.slot_mut(name);
            *slot = (*slot).max(value);
        }
        Ok(())
    }

    /// Component-wise sum with another vector
    pub fn add_resource(&mut self, other: &Resource) -> Result<()> {
        checked_accumulate(&mut self.milli_cpu, other.milli_cpu, RESOURCE_CPU)?;
        checked_accumulate(&mut self.memory, other.memory, RESOURCE_MEMORY)?;
        checked_accumulate(
            &mut self.ephemeral_storage,
            other.ephemeral_storage,
            RESOURCE_EPHEMERAL_STORAGE,
        )?;
        checked_accumulate(
            &mut self.allowed_pod_number,
            other.allowed_pod_number,
            RESOURCE_PODS,
        )?;
        for (name, value) in &other.scalar_resources {
            checked_accumulate(self.slot_mut(name), *value, name)?;
        }
        Ok(())
    }

    fn slot_mut(&mut self, name: &str) -> &mut i64 {
        match name {
            RESOURCE_CPU => &mut self.milli_cpu,
            RESOURCE_MEMORY => &mut self.memory,
            RESOURCE_EPHEMERAL_STORAGE => &mut self.ephemeral_storage,
            RESOURCE_PODS => &mut self.allowed_pod_number,
            _ => self.scalar_resources.entry(name.to_string()).or_insert(0),
        }
    }

    /// True when nothing besides pod slots is requested
    pub fn is_zero(&self) -> bool {
        self.milli_cpu == 0
            && self.memory == 0
            && self.ephemeral_storage == 0
            && self.scalar_resources.values().all(|v| *v == 0)
    }

    /// Value of a named scalar resource, zero when absent
    pub fn scalar(&self, name: &str) -> i64 {
        self.scalar_resources.get(name).copied().unwrap_or(0)
    }
}

fn checked_accumulate(slot: &mut i64, value: i64, name: &str) -> Result<()> {
    *slot = slot
        .checked_add(value)
        .ok_or_else(|| EagleError::resource_overflow(name))?;
    Ok(())
}

/// Parse a quantity of the named resource; negative amounts are rejected
fn parse_named(name: &str, quantity: &Quantity) -> Result<i64> {
    let parsed = if name == RESOURCE_CPU {
        parse_cpu(&quantity.0)
    } else {
        parse_memory(&quantity.0)
    };
    let value = parsed.map_err(|e| EagleError::invalid_quantity(name, &quantity.0, e))?;
    if value < 0 {
        return Err(EagleError::invalid_quantity(
            name,
            &quantity.0,
            QuantityError::Negative(quantity.0.clone()),
        ));
    }
    Ok(value)
}

/// Name of an object, or "unknown" when unset
pub fn object_name(metadata: &ObjectMeta) -> &str {
    metadata.name.as_deref().unwrap_or("unknown")
}
