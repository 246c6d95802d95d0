// Allow unused assignments for diagnostic fields - they're used by the macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Scheduler error type
#[derive(Error, Debug, Diagnostic)]
pub enum SchedulerError {
    /// No suitable nodes found
    #[error("No suitable nodes found for pod {pod_name}: {reason}")]
    #[diagnostic(
        code(scheduler::no_suitable_nodes),
        help("Check node capacity, already requested resources and the pod's requests")
    )]
    NoSuitableNodes {
        pod_name: String,
        reason: String,
    },

    /// A plugin reported an internal error at an extension point
    #[error("Plugin {plugin} failed at {extension_point}: {message}")]
    #[diagnostic(
        code(scheduler::plugin_failed),
        help("The scheduling decision was aborted; retry with a fresh snapshot")
    )]
    PluginFailed {
        plugin: String,
        extension_point: String,
        message: String,
    },

    /// Plugin name not present in the registry
    #[error("Plugin {name} is not registered")]
    #[diagnostic(
        code(scheduler::plugin_not_found),
        help("Run `eagle plugins` to list the registered plugins")
    )]
    PluginNotFound {
        name: String,
    },

    /// Plugin arguments could not be decoded
    #[error("Invalid arguments for plugin {plugin}: {message}")]
    #[diagnostic(
        code(scheduler::invalid_plugin_args),
        help("Check the args block of the plugin in the scheduler configuration")
    )]
    InvalidPluginArgs {
        plugin: String,
        message: String,
    },

    /// Scheduler configuration is unusable
    #[error("Invalid scheduler configuration: {message}")]
    #[diagnostic(
        code(scheduler::invalid_config),
        help("Fix the scheduler configuration file")
    )]
    InvalidConfig {
        message: String,
    },

    /// Core error
    #[error("Core error: {0}")]
    #[diagnostic(
        code(scheduler::core_error),
        help("Check the resource quantities of the pods and nodes involved")
    )]
    CoreError(#[from] eagle_core::EagleError),

    /// Internal error
    #[error("Internal error: {message}")]
    #[diagnostic(
        code(scheduler::internal_error),
        help("This is likely a bug. Please report it")
    )]
    InternalError {
        message: String,
    },
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

impl SchedulerError {
    /// Create a NoSuitableNodes error
    pub fn no_suitable_nodes(pod_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NoSuitableNodes {
            pod_name: pod_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a PluginFailed error
    pub fn plugin_failed(
        plugin: impl Into<String>,
        extension_point: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::PluginFailed {
            plugin: plugin.into(),
            extension_point: extension_point.into(),
            message: message.into(),
        }
    }

    /// Create a PluginNotFound error
    pub fn plugin_not_found(name: impl Into<String>) -> Self {
        Self::PluginNotFound { name: name.into() }
    }

    /// Create an InvalidPluginArgs error
    pub fn invalid_plugin_args(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPluginArgs {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an InternalError
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
