//! Classic resource scorers, usable next to or instead of EAGLE scoring

use super::{pod_request, resolve_node};
use crate::framework::{CycleState, FrameworkHandle, Plugin, ScorePlugin, Status};
use crate::score::{balanced_allocation_score, least_allocated_score};
use crate::{Result, SchedulerError};
use eagle_core::Pod;
use std::sync::Arc;

pub const LEAST_ALLOCATED_NAME: &str = "NodeResourcesLeastAllocated";
pub const BALANCED_ALLOCATION_NAME: &str = "NodeResourcesBalancedAllocation";

fn reject_args(name: &str, args: Option<&serde_json::Value>) -> Result<()> {
    match args {
        None | Some(serde_json::Value::Null) => Ok(()),
        Some(_) => Err(SchedulerError::invalid_plugin_args(
            name,
            "this plugin takes no arguments",
        )),
    }
}

/// Prefers nodes with the most free CPU and memory
pub struct LeastAllocated {
    handle: Arc<dyn FrameworkHandle>,
}

impl LeastAllocated {
    pub fn factory(
        args: Option<&serde_json::Value>,
        handle: Arc<dyn FrameworkHandle>,
    ) -> Result<Box<dyn Plugin>> {
        reject_args(LEAST_ALLOCATED_NAME, args)?;
        Ok(Box::new(Self { handle }))
    }
}

impl Plugin for LeastAllocated {
    fn name(&self) -> &str {
        LEAST_ALLOCATED_NAME
    }

    fn as_score(&self) -> Option<&dyn ScorePlugin> {
        Some(self)
    }
}

impl ScorePlugin for LeastAllocated {
    fn score(
        &self,
        _state: &CycleState,
        pod: &Pod,
        node_name: &str,
    ) -> std::result::Result<i64, Status> {
        let snapshot = self.handle.snapshot();
        let node_info = resolve_node(&snapshot, node_name)?;
        let request = pod_request(self.handle.as_ref(), pod)?;
        Ok(least_allocated_score(&request, node_info))
    }
}

/// Prefers nodes whose CPU and memory usage stay close to each other
pub struct BalancedAllocation {
    handle: Arc<dyn FrameworkHandle>,
}

impl BalancedAllocation {
    pub fn factory(
        args: Option<&serde_json::Value>,
        handle: Arc<dyn FrameworkHandle>,
    ) -> Result<Box<dyn Plugin>> {
        reject_args(BALANCED_ALLOCATION_NAME, args)?;
        Ok(Box::new(Self { handle }))
    }
}

impl Plugin for BalancedAllocation {
    fn name(&self) -> &str {
        BALANCED_ALLOCATION_NAME
    }

    fn as_score(&self) -> Option<&dyn ScorePlugin> {
        Some(self)
    }
}

impl ScorePlugin for BalancedAllocation {
    fn score(
        &self,
        _state: &CycleState,
        pod: &Pod,
        node_name: &str,
    ) -> std::result::Result<i64, Status> {
        let snapshot = self.handle.snapshot();
        let node_info = resolve_node(&snapshot, node_name)?;
        let request = pod_request(self.handle.as_ref(), pod)?;
        Ok(balanced_allocation_score(&request, node_info))
    }
}
