//! Node scoring functions
//!
//! Every function scores the node as it would look after the pod is placed:
//! the node's already requested resources plus the pod's request, relative to
//! the node's allocatable capacity.

use crate::framework::{NodeInfo, MAX_NODE_SCORE};
use eagle_core::Resource;
use tracing::debug;

/// Weight of the bias term against the potential term
const BIAS_WEIGHT: f64 = 10.0;

/// Share of capacity in use; zero capacity counts as unused
pub fn fraction_of_capacity(requested: i128, capacity: i64) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    requested as f64 / capacity as f64
}

/// CPU and memory fractions of the node after placing the pod
fn fractions_after_placement(pod_request: &Resource, node_info: &NodeInfo) -> (f64, f64) {
    let cpu_fraction = fraction_of_capacity(
        i128::from(node_info.requested.milli_cpu) + i128::from(pod_request.milli_cpu),
        node_info.allocatable.milli_cpu,
    );
    let memory_fraction = fraction_of_capacity(
        i128::from(node_info.requested.memory) + i128::from(pod_request.memory),
        node_info.allocatable.memory,
    );
    (cpu_fraction, memory_fraction)
}

/// How close CPU and memory consumption are to each other (1 = identical)
pub fn bias(cpu_fraction: f64, memory_fraction: f64) -> f64 {
    1.0 - (cpu_fraction - memory_fraction).abs()
}

/// Headroom left on the busier resource relative to the idler one.
///
/// `x` is the lower fraction, `y` the higher one.
pub fn potential(x: f64, y: f64) -> f64 {
    if x == 1.0 && y == 1.0 {
        return 1.0;
    }
    (1.0 - y) / (1.0 - x)
}

/// Combine bias and potential into `[0, 1]`
pub fn combine(bias_value: f64, potential_value: f64) -> f64 {
    let score = (bias_value * BIAS_WEIGHT + potential_value) / (BIAS_WEIGHT + 1.0);
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

/// EAGLE score from the CPU and memory fractions
pub fn eagle_fraction_score(cpu_fraction: f64, memory_fraction: f64) -> i64 {
    let x = cpu_fraction.min(memory_fraction);
    let y = cpu_fraction.max(memory_fraction);

    let final_score = combine(bias(cpu_fraction, memory_fraction), potential(x, y));
    (final_score * MAX_NODE_SCORE as f64) as i64
}

/// EAGLE score: balanced CPU/memory consumption first, similar headroom second
pub fn eagle_score(pod_request: &Resource, node_info: &NodeInfo) -> i64 {
    let (cpu_fraction, memory_fraction) = fractions_after_placement(pod_request, node_info);
    let score = eagle_fraction_score(cpu_fraction, memory_fraction);

    debug!(
        "EAGLE score: {} (CPU fraction: {:.3}, Memory fraction: {:.3})",
        score, cpu_fraction, memory_fraction
    );

    score
}

/// Score based on least allocated resources: prefer less loaded nodes
pub fn least_allocated_score(pod_request: &Resource, node_info: &NodeInfo) -> i64 {
    let allocatable = &node_info.allocatable;

    // If node has no resources, score 0
    if allocatable.milli_cpu == 0 || allocatable.memory == 0 {
        return 0;
    }

    let (cpu_fraction, memory_fraction) = fractions_after_placement(pod_request, node_info);
    let cpu_utilization = cpu_fraction * 100.0;
    let memory_utilization = memory_fraction * 100.0;

    // Score is inverse of average utilization
    let avg_utilization = (cpu_utilization + memory_utilization) / 2.0;
    let score = (MAX_NODE_SCORE as f64 - avg_utilization).clamp(0.0, MAX_NODE_SCORE as f64) as i64;

    debug!(
        "Least allocated score: {} (CPU util: {:.1}%, Memory util: {:.1}%)",
        score, cpu_utilization, memory_utilization
    );

    score
}

/// Score based on balanced resource allocation
pub fn balanced_allocation_score(pod_request: &Resource, node_info: &NodeInfo) -> i64 {
    let allocatable = &node_info.allocatable;

    if allocatable.milli_cpu == 0 || allocatable.memory == 0 {
        return 0;
    }

    let (cpu_fraction, memory_fraction) = fractions_after_placement(pod_request, node_info);

    // Prefer balanced resource usage (CPU and memory usage should be similar)
    let variance = (cpu_fraction - memory_fraction).abs();
    let score = ((1.0 - variance) * MAX_NODE_SCORE as f64).clamp(0.0, MAX_NODE_SCORE as f64) as i64;

    debug!(
        "Balanced allocation score: {} (variance: {:.3})",
        score, variance
    );

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::snapshot::tests::{bound_pod, create_test_node};
    use crate::framework::Snapshot;

    const GI: i64 = 1024 * 1024 * 1024;

    fn request(milli_cpu: i64, memory: i64) -> Resource {
        Resource {
            milli_cpu,
            memory,
            ..Default::default()
        }
    }

    fn node_info(cpu: &str, memory: &str, bound: &[(&str, &str)]) -> NodeInfo {
        let pods: Vec<_> = bound
            .iter()
            .enumerate()
            .map(|(i, (c, m))| bound_pod(&format!("p{}", i), "node1", c, m))
            .collect();
        let node = create_test_node("node1", cpu, memory, "110");
        let snapshot = Snapshot::new(vec![node], &pods, true).unwrap();
        snapshot.get("node1").unwrap().clone()
    }

    #[test]
    fn test_fully_packed_node_gets_max_score() {
        assert_eq!(eagle_fraction_score(1.0, 1.0), MAX_NODE_SCORE);

        let info = node_info("4", "8Gi", &[("3", "6Gi")]);
        assert_eq!(eagle_score(&request(1000, 2 * GI), &info), MAX_NODE_SCORE);
    }

    #[test]
    fn test_bias_and_potential() {
        assert_eq!(bias(0.25, 0.125), 0.875);
        assert_eq!(bias(0.4, 0.4), 1.0);

        assert_eq!(potential(1.0, 1.0), 1.0);
        assert_eq!(potential(0.5, 0.5), 1.0);
        assert_eq!(potential(0.25, 1.0), 0.0);
        assert_eq!(potential(0.5, 0.75), 0.5);
    }

    #[test]
    fn test_combine_weights_and_clamps() {
        assert_eq!(combine(1.0, 1.0), 1.0);
        assert_eq!(combine(0.0, 0.0), 0.0);
        assert_eq!(combine(0.5, f64::NEG_INFINITY), 0.0);
        assert_eq!(combine(1.0, 5.0), 1.0);
        assert_eq!(combine(f64::NAN, 1.0), 0.0);
    }

    #[test]
    fn test_eagle_score_values() {
        // cpu 0.25, memory 0.125: (10 * 0.875 + 0.75 / 0.875) / 11 = 0.8734
        let empty = node_info("4", "8Gi", &[]);
        assert_eq!(eagle_score(&request(1000, GI), &empty), 87);

        // cpu 1.0, memory 0.25: (10 * 0.25 + 0) / 11 = 0.2272
        let busy = node_info("4", "8Gi", &[("3", "1Gi")]);
        assert_eq!(eagle_score(&request(1000, GI), &busy), 22);

        // cpu 0.75, memory 0.25: (10 * 0.5 + 1/3) / 11 = 0.4848
        let half = node_info("4", "8Gi", &[("2", "1Gi")]);
        assert_eq!(eagle_score(&request(1000, GI), &half), 48);
    }

    #[test]
    fn test_eagle_score_over_capacity_stays_in_range() {
        let over = node_info("1", "8Gi", &[("1", "1Gi")]);
        let score = eagle_score(&request(1000, GI), &over);
        assert!((0..=MAX_NODE_SCORE).contains(&score));
    }

    #[test]
    fn test_zero_capacity_has_zero_fraction() {
        assert_eq!(fraction_of_capacity(500, 0), 0.0);

        // both fractions 0: balanced and fully free
        let info = node_info("0", "0", &[]);
        assert_eq!(eagle_score(&request(1000, GI), &info), MAX_NODE_SCORE);
    }

    #[test]
    fn test_least_allocated() {
        let node1 = node_info("4", "8Gi", &[]);
        let node2 = node_info("4", "8Gi", &[("2", "4Gi")]);
        let pod = request(1000, 2 * GI);

        let score1 = least_allocated_score(&pod, &node1);
        let score2 = least_allocated_score(&pod, &node2);

        assert_eq!(score1, 75);
        assert!(score1 > score2);
        assert_eq!(least_allocated_score(&pod, &node_info("0", "8Gi", &[])), 0);
    }

    #[test]
    fn test_balanced_allocation() {
        let node = node_info("4", "8Gi", &[]);

        assert_eq!(balanced_allocation_score(&request(1000, 2 * GI), &node), 100);
        assert_eq!(balanced_allocation_score(&request(2000, 0), &node), 50);
        assert_eq!(balanced_allocation_score(&request(1000, GI), &node_info("4", "0", &[])), 0);
    }
}
