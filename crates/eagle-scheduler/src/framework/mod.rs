//! Extension point contracts between the scheduler and its plugins

pub mod cycle_state;
pub mod handle;
pub mod snapshot;
pub mod status;

pub use cycle_state::CycleState;
pub use handle::{FrameworkHandle, Handle};
pub use snapshot::{NodeInfo, Snapshot};
pub use status::{Code, Status};

use crate::types::NodeScore;
use eagle_core::Pod;

/// Lowest score a score plugin may report
pub const MIN_NODE_SCORE: i64 = 0;
/// Highest score a score plugin may report
pub const MAX_NODE_SCORE: i64 = 100;

/// Base trait of every plugin.
///
/// A plugin advertises the extension points it implements through the
/// `as_*` accessors; the scheduler only calls the ones returning `Some`.
pub trait Plugin: Send + Sync {
    /// Name the plugin is registered under
    fn name(&self) -> &str;

    fn as_pre_filter(&self) -> Option<&dyn PreFilterPlugin> {
        None
    }

    fn as_filter(&self) -> Option<&dyn FilterPlugin> {
        None
    }

    fn as_score(&self) -> Option<&dyn ScorePlugin> {
        None
    }
}

/// Runs once per pod before any node is filtered
pub trait PreFilterPlugin: Plugin {
    fn pre_filter(&self, state: &mut CycleState, pod: &Pod) -> Status;
}

/// Decides whether a node can host the pod
pub trait FilterPlugin: Plugin {
    fn filter(&self, state: &CycleState, pod: &Pod, node_info: &NodeInfo) -> Status;
}

/// Ranks a node that passed filtering
pub trait ScorePlugin: Plugin {
    /// Raw score of a node in `[MIN_NODE_SCORE, MAX_NODE_SCORE]`
    fn score(&self, state: &CycleState, pod: &Pod, node_name: &str) -> Result<i64, Status>;

    /// Post-processing over all scores of this plugin, if any
    fn score_extensions(&self) -> Option<&dyn ScoreExtensions> {
        None
    }
}

/// Runs once after every node has been scored by the owning plugin
pub trait ScoreExtensions: Send + Sync {
    fn normalize_score(&self, state: &CycleState, pod: &Pod, scores: &mut [NodeScore]) -> Status;
}
