use crate::{Result, SchedulerError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Largest accepted plugin weight
pub const MAX_PLUGIN_WEIGHT: i64 = 100;

/// Default scheduler name
pub const DEFAULT_SCHEDULER_NAME: &str = "eagle-scheduler";

/// Feature gates consulted by plugins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureGates {
    /// Account `spec.overhead` in pod requests
    pub pod_overhead: bool,
}

impl Default for FeatureGates {
    fn default() -> Self {
        Self { pod_overhead: true }
    }
}

/// One enabled plugin of the profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    /// Registered plugin name
    pub name: String,
    /// Multiplier applied to the plugin's normalized scores
    #[serde(default = "default_weight")]
    pub weight: i64,
    /// Plugin specific arguments, decoded by the plugin factory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
}

fn default_weight() -> i64 {
    1
}

impl PluginConfig {
    /// Enable a plugin with weight 1 and no arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight: default_weight(),
            args: None,
        }
    }

    pub fn with_weight(mut self, weight: i64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_args(mut self, args: serde_json::Value) -> Self {
        self.args = Some(args);
        self
    }
}

/// Configuration of the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    /// Name reported in logs
    pub scheduler_name: String,
    pub feature_gates: FeatureGates,
    /// Enabled plugins in execution order
    pub plugins: Vec<PluginConfig>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scheduler_name: DEFAULT_SCHEDULER_NAME.to_string(),
            feature_gates: FeatureGates::default(),
            plugins: vec![PluginConfig::new(crate::plugins::eagle::NAME)],
        }
    }
}

impl SchedulerConfig {
    /// Parse and validate a YAML configuration
    pub fn from_yaml(data: &str) -> Result<Self> {
        let config: Self = eagle_core::from_yaml(data)
            .map_err(|e| SchedulerError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| {
            SchedulerError::invalid_config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&data)
    }

    /// Check the profile is usable
    pub fn validate(&self) -> Result<()> {
        if self.plugins.is_empty() {
            return Err(SchedulerError::invalid_config("At least one plugin must be enabled"));
        }

        let mut seen = HashSet::new();
        for plugin in &self.plugins {
            if !seen.insert(plugin.name.as_str()) {
                return Err(SchedulerError::invalid_config(format!(
                    "Plugin {} is enabled more than once",
                    plugin.name
                )));
            }
            if !(0..=MAX_PLUGIN_WEIGHT).contains(&plugin.weight) {
                return Err(SchedulerError::invalid_config(format!(
                    "Plugin {} has weight {}, expected 0 to {}",
                    plugin.name, plugin.weight, MAX_PLUGIN_WEIGHT
                )));
            }
        }

        Ok(())
    }
}
