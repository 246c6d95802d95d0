//! Eagle Scheduler - resource-balanced pod placement
//!
//! This crate provides:
//! - A scheduling framework host (PreFilter, Filter, Score, NormalizeScore)
//! - The EAGLE plugin: bin packing bounded by CPU/memory balance
//! - Classic least-allocated and balanced-allocation scorers
//! - YAML profiles selecting plugins and their weights

pub mod config;
pub mod error;
pub mod filter;
pub mod framework;
pub mod normalize;
pub mod plugins;
pub mod registry;
pub mod request;
pub mod scheduler;
pub mod score;
pub mod types;

// Re-export commonly used types
pub use config::{FeatureGates, PluginConfig, SchedulerConfig};
pub use error::{Result, SchedulerError};
pub use framework::{NodeInfo, Snapshot};
pub use registry::Registry;
pub use scheduler::Scheduler;
pub use types::{FilterResult, NodeScore, ScheduleResult};
