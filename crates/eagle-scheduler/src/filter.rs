//! Node feasibility checks for the EAGLE plugin
//!
//! A node is admitted when it has a free pod slot, enough CPU and memory, and
//! the CPU/memory utilization after placement stays inside the EAGLE bound.

use crate::framework::NodeInfo;
use eagle_core::resources::{RESOURCE_CPU, RESOURCE_MEMORY, RESOURCE_PODS};
use eagle_core::Resource;
use serde::Serialize;
use tracing::debug;

/// Radius of the EAGLE acceptance circle and its low/high utilization cutoffs
pub const R0: f64 = 0.8;
/// Secondary bound constant. Not used by the admission geometry.
pub const R0_SECONDARY: f64 = 0.9;

pub const REASON_TOO_MANY_PODS: &str = "Too many pods";
pub const REASON_INSUFFICIENT_CPU: &str = "Insufficient cpu";
pub const REASON_INSUFFICIENT_MEMORY: &str = "Insufficient memory";
pub const REASON_OUT_OF_LIMIT: &str = "resource out of limit";
pub const REASON_OUT_OF_EAGLE_BOUND: &str = "Out of EAGLE bound";

/// One resource limit that prevents the pod from fitting on the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsufficientResource {
    pub resource_name: String,
    pub reason: String,
    pub requested: i64,
    pub used: i64,
    pub capacity: i64,
}

impl InsufficientResource {
    fn new(resource_name: &str, reason: &str, requested: i64, used: i64, capacity: i64) -> Self {
        Self {
            resource_name: resource_name.to_string(),
            reason: reason.to_string(),
            requested,
            used,
            capacity,
        }
    }
}

/// Verdict of the EAGLE bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EagleVerdict {
    Admitted,
    /// CPU or memory would exceed the node's capacity
    OutOfLimit,
    /// Utilization falls in the fragmentation-prone region
    OutOfBound,
}

impl EagleVerdict {
    pub fn reason(&self) -> &'static str {
        match self {
            EagleVerdict::Admitted => "ok",
            EagleVerdict::OutOfLimit => REASON_OUT_OF_LIMIT,
            EagleVerdict::OutOfBound => REASON_OUT_OF_EAGLE_BOUND,
        }
    }

    pub fn is_admitted(&self) -> bool {
        *self == EagleVerdict::Admitted
    }
}

/// Check every limit the pod would hit on the node.
///
/// All violated limits are reported; an empty list means the pod fits.
pub fn fits_request(pod_request: &Resource, node_info: &NodeInfo) -> Vec<InsufficientResource> {
    let mut insufficient = Vec::with_capacity(4);

    let allowed_pod_number = node_info.allocatable.allowed_pod_number;
    let pod_count = node_info.pods().len() as i64;
    if pod_count + 1 > allowed_pod_number {
        insufficient.push(InsufficientResource::new(
            RESOURCE_PODS,
            REASON_TOO_MANY_PODS,
            1,
            pod_count,
            allowed_pod_number,
        ));
    }

    if pod_request.is_zero() {
        return insufficient;
    }

    let allocatable = &node_info.allocatable;
    let requested = &node_info.requested;

    if i128::from(allocatable.milli_cpu) < demand(pod_request.milli_cpu, requested.milli_cpu) {
        insufficient.push(InsufficientResource::new(
            RESOURCE_CPU,
            REASON_INSUFFICIENT_CPU,
            pod_request.milli_cpu,
            requested.milli_cpu,
            allocatable.milli_cpu,
        ));
    }

    if i128::from(allocatable.memory) < demand(pod_request.memory, requested.memory) {
        insufficient.push(InsufficientResource::new(
            RESOURCE_MEMORY,
            REASON_INSUFFICIENT_MEMORY,
            pod_request.memory,
            requested.memory,
            allocatable.memory,
        ));
    }

    let verdict = fit_eagle(pod_request, node_info);
    if !verdict.is_admitted() {
        insufficient.push(InsufficientResource::new(
            RESOURCE_CPU,
            verdict.reason(),
            pod_request.milli_cpu,
            requested.milli_cpu,
            allocatable.milli_cpu,
        ));
    }

    // extended resource checks go here

    insufficient
}

/// EAGLE bound of the node's CPU/memory utilization after placing the pod
pub fn fit_eagle(pod_request: &Resource, node_info: &NodeInfo) -> EagleVerdict {
    let cpu_ratio = utilization_ratio(
        demand(pod_request.milli_cpu, node_info.requested.milli_cpu),
        node_info.allocatable.milli_cpu,
    );
    let mem_ratio = utilization_ratio(
        demand(pod_request.memory, node_info.requested.memory),
        node_info.allocatable.memory,
    );

    let verdict = eagle_bound(cpu_ratio, mem_ratio);
    debug!(
        "EAGLE bound: cpu ratio {:.3}, memory ratio {:.3} -> {:?}",
        cpu_ratio, mem_ratio, verdict
    );
    verdict
}

/// Pod request plus what the node already committed, without overflow
fn demand(pod_request: i64, requested: i64) -> i128 {
    i128::from(pod_request) + i128::from(requested)
}

/// Utilization as a float; demand on zero capacity is unbounded
pub fn utilization_ratio(demand: i128, capacity: i64) -> f64 {
    if capacity <= 0 {
        return if demand > 0 { f64::INFINITY } else { 0.0 };
    }
    demand as f64 / capacity as f64
}

/// Acceptance region in the (lower ratio, higher ratio) plane.
///
/// Admitted: both ratios equal, the higher one at most `1 - R0`, the lower
/// one at least `R0`, or the point inside the circle of radius `R0` centered
/// at `(R0, 1 - R0)`.
pub fn eagle_bound(cpu_ratio: f64, mem_ratio: f64) -> EagleVerdict {
    if cpu_ratio > 1.0 || mem_ratio > 1.0 {
        return EagleVerdict::OutOfLimit;
    }
    if cpu_ratio == mem_ratio {
        return EagleVerdict::Admitted;
    }

    let x = cpu_ratio.min(mem_ratio);
    let y = cpu_ratio.max(mem_ratio);

    if y <= 1.0 - R0 || x >= R0 || within_r0(x, y) {
        EagleVerdict::Admitted
    } else {
        EagleVerdict::OutOfBound
    }
}

fn within_r0(x: f64, y: f64) -> bool {
    let dx = x - R0;
    let dy = y - (1.0 - R0);
    dx * dx + dy * dy <= R0 * R0
}
