//! EAGLE plugin: resource-balanced bin packing
//!
//! - PreFilter aggregates the pod's request into the cycle state
//! - Filter admits nodes with enough capacity inside the EAGLE bound
//! - Score ranks nodes by CPU/memory balance and headroom
//! - NormalizeScore stretches the scores onto the full score range

use super::{pod_request, resolve_node};
use crate::filter::fits_request;
use crate::framework::{
    CycleState, FilterPlugin, FrameworkHandle, NodeInfo, Plugin, PreFilterPlugin, ScoreExtensions,
    ScorePlugin, Status,
};
use crate::normalize::normalize_scores;
use crate::score::eagle_score;
use crate::types::NodeScore;
use crate::{Result, SchedulerError};
use eagle_core::resources::{RESOURCE_CPU, RESOURCE_MEMORY};
use eagle_core::{object_name, Pod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Name of the EAGLE plugin
pub const NAME: &str = "eagle";

/// Arguments of the EAGLE plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EagleArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubeconfig: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,
    /// Per-resource weights. Carried for future weighting; the score
    /// formula does not read them.
    pub resource_weights: BTreeMap<String, i64>,
}

impl Default for EagleArgs {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            master: None,
            resource_weights: default_resource_weights(),
        }
    }
}

fn default_resource_weights() -> BTreeMap<String, i64> {
    BTreeMap::from([
        (RESOURCE_CPU.to_string(), 1),
        (RESOURCE_MEMORY.to_string(), 1),
    ])
}

impl EagleArgs {
    /// Decode plugin arguments, filling in missing weights
    pub fn decode(args: Option<&serde_json::Value>) -> Result<Self> {
        let mut decoded: Self = match args {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| SchedulerError::invalid_plugin_args(NAME, e.to_string()))?,
            None => Self::default(),
        };

        for (resource, weight) in default_resource_weights() {
            decoded.resource_weights.entry(resource).or_insert(weight);
        }

        Ok(decoded)
    }
}

/// The EAGLE plugin
pub struct Eagle {
    args: EagleArgs,
    handle: Arc<dyn FrameworkHandle>,
}

impl Eagle {
    /// Create the plugin from its arguments
    pub fn new(args: EagleArgs, handle: Arc<dyn FrameworkHandle>) -> Self {
        debug!("EAGLE plugin args: {:?}", args);
        Self { args, handle }
    }

    /// Registry factory
    pub fn factory(
        args: Option<&serde_json::Value>,
        handle: Arc<dyn FrameworkHandle>,
    ) -> Result<Box<dyn Plugin>> {
        Ok(Box::new(Self::new(EagleArgs::decode(args)?, handle)))
    }

    pub fn args(&self) -> &EagleArgs {
        &self.args
    }
}

impl Plugin for Eagle {
    fn name(&self) -> &str {
        NAME
    }

    fn as_pre_filter(&self) -> Option<&dyn PreFilterPlugin> {
        Some(self)
    }

    fn as_filter(&self) -> Option<&dyn FilterPlugin> {
        Some(self)
    }

    fn as_score(&self) -> Option<&dyn ScorePlugin> {
        Some(self)
    }
}

impl PreFilterPlugin for Eagle {
    fn pre_filter(&self, state: &mut CycleState, pod: &Pod) -> Status {
        match pod_request(self.handle.as_ref(), pod) {
            Ok(request) => {
                debug!(
                    "Pod {} requests CPU: {} milli, Memory: {} bytes",
                    object_name(&pod.metadata),
                    request.milli_cpu,
                    request.memory
                );
                state.write_pod_request(request);
                Status::success()
            }
            Err(status) => status,
        }
    }
}

impl FilterPlugin for Eagle {
    fn filter(&self, state: &CycleState, _pod: &Pod, node_info: &NodeInfo) -> Status {
        let Some(pod_request) = state.pod_request() else {
            return Status::error(format!(
                "error reading pod request from cycle state: PreFilter of {} did not run",
                NAME
            ));
        };

        let insufficient = fits_request(pod_request, node_info);
        if insufficient.is_empty() {
            return Status::success();
        }

        // keep all failure reasons
        Status::unschedulable(insufficient.into_iter().map(|r| r.reason))
    }
}

impl ScorePlugin for Eagle {
    fn score(
        &self,
        _state: &CycleState,
        pod: &Pod,
        node_name: &str,
    ) -> std::result::Result<i64, Status> {
        let snapshot = self.handle.snapshot();
        let node_info = resolve_node(&snapshot, node_name)?;
        let request = pod_request(self.handle.as_ref(), pod)?;

        Ok(eagle_score(&request, node_info))
    }

    fn score_extensions(&self) -> Option<&dyn ScoreExtensions> {
        Some(self)
    }
}

impl ScoreExtensions for Eagle {
    fn normalize_score(&self, _state: &CycleState, _pod: &Pod, scores: &mut [NodeScore]) -> Status {
        normalize_scores(scores);
        Status::success()
    }
}
