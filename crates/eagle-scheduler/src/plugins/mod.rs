//! Plugins shipped with the scheduler

pub mod eagle;
pub mod noderesources;

use crate::framework::{FrameworkHandle, NodeInfo, Snapshot, Status};
use crate::request::compute_pod_resource_request;
use eagle_core::{Pod, Resource};

/// Resolve a node of the snapshot for scoring
fn resolve_node<'a>(snapshot: &'a Snapshot, node_name: &str) -> Result<&'a NodeInfo, Status> {
    match snapshot.get(node_name) {
        Some(info) if info.node().is_some() => Ok(info),
        Some(_) => Err(Status::error(format!(
            "getting node {:?} from Snapshot: node object is missing",
            node_name
        ))),
        None => Err(Status::error(format!(
            "getting node {:?} from Snapshot: not found",
            node_name
        ))),
    }
}

/// Aggregated request of the pod, honoring the overhead feature gate
fn pod_request(handle: &dyn FrameworkHandle, pod: &Pod) -> Result<Resource, Status> {
    compute_pod_resource_request(pod, handle.feature_gates().pod_overhead)
        .map_err(|e| Status::error(format!("computing pod resource request: {}", e)))
}
