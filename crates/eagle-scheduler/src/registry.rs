use crate::framework::{FrameworkHandle, Plugin};
use crate::plugins::eagle::{self, Eagle};
use crate::plugins::noderesources::{
    BalancedAllocation, LeastAllocated, BALANCED_ALLOCATION_NAME, LEAST_ALLOCATED_NAME,
};
use crate::{Result, SchedulerError};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds a plugin from its decoded configuration arguments
pub type PluginFactory =
    fn(Option<&serde_json::Value>, Arc<dyn FrameworkHandle>) -> Result<Box<dyn Plugin>>;

/// Plugin factories keyed by plugin name
#[derive(Clone, Default)]
pub struct Registry {
    factories: BTreeMap<String, PluginFactory>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every plugin shipped in this crate
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(eagle::NAME, Eagle::factory);
        registry.register(LEAST_ALLOCATED_NAME, LeastAllocated::factory);
        registry.register(BALANCED_ALLOCATION_NAME, BalancedAllocation::factory);
        registry
    }

    /// Register a factory, replacing any previous one with the same name
    pub fn register(&mut self, name: impl Into<String>, factory: PluginFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Instantiate a registered plugin
    pub fn build(
        &self,
        name: &str,
        args: Option<&serde_json::Value>,
        handle: Arc<dyn FrameworkHandle>,
    ) -> Result<Box<dyn Plugin>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| SchedulerError::plugin_not_found(name))?;
        factory(args, handle)
    }

    /// Registered plugin names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}
