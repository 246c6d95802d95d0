use crate::config::SchedulerConfig;
use crate::framework::{CycleState, Handle, Plugin, Snapshot, Status};
use crate::registry::Registry;
use crate::types::{FilterResult, NodeScore, ScheduleResult};
use crate::{Result, SchedulerError};
use eagle_core::{object_name, Pod};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A plugin enabled in the profile, with its score weight
struct EnabledPlugin {
    plugin: Box<dyn Plugin>,
    weight: i64,
}

/// Pod scheduler.
///
/// Runs one decision at a time: `schedule_pod` installs its snapshot on the
/// shared handle before any plugin runs.
pub struct Scheduler {
    config: SchedulerConfig,
    handle: Arc<Handle>,
    plugins: Vec<EnabledPlugin>,
}

impl Scheduler {
    /// Create a scheduler, instantiating every enabled plugin from the registry
    pub fn new(config: SchedulerConfig, registry: &Registry) -> Result<Self> {
        config.validate()?;

        let handle = Arc::new(Handle::new(config.feature_gates.clone()));

        let mut plugins = Vec::with_capacity(config.plugins.len());
        for plugin_config in &config.plugins {
            let plugin = registry.build(
                &plugin_config.name,
                plugin_config.args.as_ref(),
                handle.clone(),
            )?;
            debug!(
                "Enabled plugin {} with weight {}",
                plugin_config.name, plugin_config.weight
            );
            plugins.push(EnabledPlugin {
                plugin,
                weight: plugin_config.weight,
            });
        }

        info!(
            "Scheduler {} ready with {} plugins",
            config.scheduler_name,
            plugins.len()
        );

        Ok(Self {
            config,
            handle,
            plugins,
        })
    }

    /// Scheduler with the default configuration and registry
    pub fn with_defaults() -> Result<Self> {
        Self::new(SchedulerConfig::default(), &Registry::with_defaults())
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Names of the enabled plugins, in execution order
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.plugin.name()).collect()
    }

    /// Pick a node for the pod
    pub fn schedule_pod(&self, pod: &Pod, snapshot: Snapshot) -> Result<ScheduleResult> {
        let pod_name = object_name(&pod.metadata).to_string();
        let snapshot = Arc::new(snapshot);
        self.handle.update_snapshot(snapshot.clone());

        let mut state = CycleState::new();

        // Phase 1: PreFilter
        self.run_pre_filter(&mut state, pod)?;
        let state = state;

        // Phase 2: Filter nodes
        let filter_results = self.run_filter(&state, pod, &snapshot)?;
        let feasible: Vec<&str> = filter_results
            .iter()
            .filter(|r| r.passed)
            .map(|r| r.node_name.as_str())
            .collect();

        if feasible.is_empty() {
            return Err(SchedulerError::no_suitable_nodes(
                pod_name,
                summarize_failures(&filter_results),
            ));
        }

        info!("Pod {} has {} feasible nodes", pod_name, feasible.len());

        // Phase 3: Score nodes
        let mut scores = self.run_score(&state, pod, &feasible)?;

        // Phase 4: Select best node; ties go to the first node by name
        let mut best = &scores[0];
        for candidate in &scores[1..] {
            if candidate.score > best.score {
                best = candidate;
            }
        }
        let suggested_host = best.name.clone();

        scores.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));

        info!(
            "Selected node {} for pod {} with score {}",
            suggested_host, pod_name, scores[0].score
        );

        Ok(ScheduleResult {
            suggested_host,
            evaluated_nodes: filter_results.len(),
            feasible_nodes: feasible.len(),
            filter_results,
            scores,
        })
    }

    fn run_pre_filter(&self, state: &mut CycleState, pod: &Pod) -> Result<()> {
        for enabled in &self.plugins {
            let Some(pre_filter) = enabled.plugin.as_pre_filter() else {
                continue;
            };
            let status = pre_filter.pre_filter(state, pod);
            if !status.is_success() {
                return Err(plugin_failure(enabled.plugin.name(), "PreFilter", &status));
            }
        }
        Ok(())
    }

    fn run_filter(
        &self,
        state: &CycleState,
        pod: &Pod,
        snapshot: &Snapshot,
    ) -> Result<Vec<FilterResult>> {
        let mut results = Vec::with_capacity(snapshot.len());

        for (node_name, node_info) in snapshot.list() {
            let mut result = FilterResult::pass(node_name.to_string());

            for enabled in &self.plugins {
                let Some(filter) = enabled.plugin.as_filter() else {
                    continue;
                };

                let status = filter.filter(state, pod, node_info);
                if status.is_error() {
                    return Err(plugin_failure(enabled.plugin.name(), "Filter", &status));
                }
                if status.is_unschedulable() {
                    debug!(
                        "Node {} filtered out by {}: {}",
                        node_name,
                        enabled.plugin.name(),
                        status.message()
                    );
                    result = FilterResult::fail(
                        node_name.to_string(),
                        enabled.plugin.name().to_string(),
                        status.reasons().to_vec(),
                    );
                    break;
                }
            }

            results.push(result);
        }

        Ok(results)
    }

    fn run_score(
        &self,
        state: &CycleState,
        pod: &Pod,
        feasible: &[&str],
    ) -> Result<Vec<NodeScore>> {
        let mut totals: Vec<NodeScore> = feasible
            .iter()
            .map(|name| NodeScore::new(*name, 0))
            .collect();

        for enabled in &self.plugins {
            let Some(scorer) = enabled.plugin.as_score() else {
                continue;
            };

            let mut plugin_scores = Vec::with_capacity(feasible.len());
            for node_name in feasible {
                let score = scorer
                    .score(state, pod, node_name)
                    .map_err(|status| plugin_failure(enabled.plugin.name(), "Score", &status))?;
                plugin_scores.push(NodeScore::new(*node_name, score));
            }

            if let Some(extensions) = scorer.score_extensions() {
                let status = extensions.normalize_score(state, pod, &mut plugin_scores);
                if !status.is_success() {
                    return Err(plugin_failure(
                        enabled.plugin.name(),
                        "NormalizeScore",
                        &status,
                    ));
                }
            }

            for (total, plugin_score) in totals.iter_mut().zip(&plugin_scores) {
                debug!(
                    "Node {} scored {} by {} (weight {})",
                    plugin_score.name,
                    plugin_score.score,
                    enabled.plugin.name(),
                    enabled.weight
                );
                total.score = total
                    .score
                    .saturating_add(plugin_score.score.saturating_mul(enabled.weight));
            }
        }

        Ok(totals)
    }
}

fn plugin_failure(plugin: &str, extension_point: &str, status: &Status) -> SchedulerError {
    SchedulerError::plugin_failed(plugin, extension_point, status.message())
}

/// Summary of why nodes were rejected, e.g.
/// `0/3 nodes are available: 2 Out of EAGLE bound, 1 Too many pods.`
fn summarize_failures(results: &[FilterResult]) -> String {
    if results.is_empty() {
        return "0/0 nodes are available: no nodes in snapshot.".to_string();
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for result in results.iter().filter(|r| !r.passed) {
        for reason in &result.reasons {
            *counts.entry(reason.as_str()).or_insert(0) += 1;
        }
    }

    let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let reasons: Vec<String> = counts
        .iter()
        .map(|(reason, count)| format!("{} {}", count, reason))
        .collect();

    format!(
        "0/{} nodes are available: {}.",
        results.len(),
        reasons.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginConfig;
    use crate::filter::{REASON_OUT_OF_EAGLE_BOUND, REASON_TOO_MANY_PODS};
    use crate::framework::snapshot::tests::{bound_pod, create_test_node, create_test_pod};
    use crate::framework::{FrameworkHandle, ScorePlugin, MAX_NODE_SCORE, MIN_NODE_SCORE};
    use crate::plugins::noderesources::LEAST_ALLOCATED_NAME;
    use crate::request::tests::container;

    fn snapshot(nodes: Vec<eagle_core::Node>, pods: &[Pod]) -> Snapshot {
        Snapshot::new(nodes, pods, true).unwrap()
    }

    #[test]
    fn test_schedule_pod_success() {
        let scheduler = Scheduler::with_defaults().unwrap();

        let nodes = vec![
            create_test_node("node1", "4", "8Gi", "110"),
            create_test_node("node2", "2", "4Gi", "110"),
        ];
        let pod = create_test_pod("test-pod", "1", "1Gi");

        let result = scheduler.schedule_pod(&pod, snapshot(nodes, &[])).unwrap();
        assert_eq!(result.evaluated_nodes, 2);
        assert_eq!(result.feasible_nodes, 2);
        // node1: cpu 0.25, mem 0.125 -> 87; node2: cpu 0.5, mem 0.25 -> 74
        assert_eq!(result.suggested_host, "node1");
        assert_eq!(result.scores[0], NodeScore::new("node1", MAX_NODE_SCORE));
        assert_eq!(result.scores[1], NodeScore::new("node2", MIN_NODE_SCORE));
    }

    #[test]
    fn test_balanced_node_wins_over_loaded_node() {
        // node-b already runs 3 cores / 1Gi: placing the pod there would
        // exhaust CPU while leaving most of the memory stranded.
        let scheduler = Scheduler::with_defaults().unwrap();
        let nodes = vec![
            create_test_node("node-a", "4000m", "8Gi", "110"),
            create_test_node("node-b", "4000m", "8Gi", "110"),
        ];
        let pods = vec![bound_pod("existing", "node-b", "3000m", "1Gi")];
        let pod = create_test_pod("web", "1000m", "1Gi");

        let result = scheduler.schedule_pod(&pod, snapshot(nodes, &pods)).unwrap();

        assert_eq!(result.suggested_host, "node-a");
        assert_eq!(result.feasible_nodes, 1);
        assert_eq!(
            result.filter_results[1],
            FilterResult::fail(
                "node-b".to_string(),
                "eagle".to_string(),
                vec![REASON_OUT_OF_EAGLE_BOUND.to_string()]
            )
        );
    }

    #[test]
    fn test_both_feasible_balanced_node_ranked_first() {
        let scheduler = Scheduler::with_defaults().unwrap();
        let nodes = vec![
            create_test_node("node-a", "4000m", "8Gi", "110"),
            create_test_node("node-b", "4000m", "8Gi", "110"),
        ];
        let pods = vec![bound_pod("existing", "node-b", "2000m", "1Gi")];
        let pod = create_test_pod("web", "1000m", "1Gi");

        let result = scheduler.schedule_pod(&pod, snapshot(nodes, &pods)).unwrap();

        assert_eq!(result.feasible_nodes, 2);
        assert_eq!(result.suggested_host, "node-a");
        assert_eq!(
            result.scores,
            vec![
                NodeScore::new("node-a", MAX_NODE_SCORE),
                NodeScore::new("node-b", MIN_NODE_SCORE)
            ]
        );
    }

    #[test]
    fn test_equal_nodes_tie_to_first_name() {
        let scheduler = Scheduler::with_defaults().unwrap();
        let nodes = vec![
            create_test_node("node-c", "4", "8Gi", "110"),
            create_test_node("node-a", "4", "8Gi", "110"),
            create_test_node("node-b", "4", "8Gi", "110"),
        ];
        let pod = create_test_pod("web", "1", "1Gi");

        let result = scheduler.schedule_pod(&pod, snapshot(nodes, &[])).unwrap();
        assert_eq!(result.suggested_host, "node-a");
        assert!(result.scores.iter().all(|s| s.score == MIN_NODE_SCORE));
    }

    #[test]
    fn test_schedule_pod_no_suitable_nodes() {
        let scheduler = Scheduler::with_defaults().unwrap();

        let nodes = vec![
            create_test_node("node1", "4", "8Gi", "1"),
            create_test_node("node2", "4", "8Gi", "110"),
            create_test_node("node3", "4", "8Gi", "110"),
        ];
        let pods = vec![
            bound_pod("a", "node1", "100m", "100Mi"),
            bound_pod("b", "node2", "2500m", "0"),
            bound_pod("c", "node3", "2500m", "0"),
        ];
        let pod = create_test_pod("web", "1", "1Gi");

        let err = scheduler
            .schedule_pod(&pod, snapshot(nodes, &pods))
            .unwrap_err();

        match err {
            SchedulerError::NoSuitableNodes { pod_name, reason } => {
                assert_eq!(pod_name, "web");
                assert_eq!(
                    reason,
                    format!(
                        "0/3 nodes are available: 2 {}, 1 {}.",
                        REASON_OUT_OF_EAGLE_BOUND, REASON_TOO_MANY_PODS
                    )
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let scheduler = Scheduler::with_defaults().unwrap();
        let pod = create_test_pod("web", "1", "1Gi");

        let err = scheduler.schedule_pod(&pod, Snapshot::default()).unwrap_err();
        assert!(err.to_string().contains("0/0 nodes are available"));
    }

    #[test]
    fn test_pre_filter_failure_aborts() {
        let scheduler = Scheduler::with_defaults().unwrap();
        let nodes = vec![create_test_node("node1", "4", "8Gi", "110")];
        let pod = create_test_pod("web", "lots", "1Gi");

        let err = scheduler.schedule_pod(&pod, snapshot(nodes, &[])).unwrap_err();
        match err {
            SchedulerError::PluginFailed {
                plugin,
                extension_point,
                ..
            } => {
                assert_eq!(plugin, "eagle");
                assert_eq!(extension_point, "PreFilter");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_weighted_plugins() {
        let config = SchedulerConfig {
            plugins: vec![
                PluginConfig::new("eagle").with_weight(2),
                PluginConfig::new(LEAST_ALLOCATED_NAME),
            ],
            ..Default::default()
        };
        let scheduler = Scheduler::new(config, &Registry::with_defaults()).unwrap();
        assert_eq!(scheduler.plugin_names(), vec!["eagle", LEAST_ALLOCATED_NAME]);

        let nodes = vec![
            create_test_node("node1", "4", "8Gi", "110"),
            create_test_node("node2", "2", "4Gi", "110"),
        ];
        let pod = create_test_pod("web", "1", "1Gi");

        let result = scheduler.schedule_pod(&pod, snapshot(nodes, &[])).unwrap();

        // node1: eagle 100 * 2 + least allocated 81; node2: 0 * 2 + 62
        assert_eq!(
            result.scores,
            vec![NodeScore::new("node1", 281), NodeScore::new("node2", 62)]
        );
    }

    #[test]
    fn test_unknown_plugin_in_config() {
        let config = SchedulerConfig {
            plugins: vec![PluginConfig::new("NodeAffinity")],
            ..Default::default()
        };
        assert!(matches!(
            Scheduler::new(config, &Registry::with_defaults()),
            Err(SchedulerError::PluginNotFound { .. })
        ));
    }

    #[test]
    fn test_summarize_failures() {
        let results = vec![
            FilterResult::pass("a".to_string()),
            FilterResult::fail(
                "b".to_string(),
                "eagle".to_string(),
                vec!["Insufficient cpu".to_string(), "Insufficient memory".to_string()],
            ),
            FilterResult::fail(
                "c".to_string(),
                "eagle".to_string(),
                vec!["Insufficient cpu".to_string()],
            ),
        ];
        assert_eq!(
            summarize_failures(&results),
            "0/3 nodes are available: 2 Insufficient cpu, 1 Insufficient memory."
        );
    }

    fn two_container_pod(name: &str, memory: &str) -> Pod {
        let mut pod = create_test_pod(name, "100m", "0");
        if let Some(spec) = pod.spec.as_mut() {
            spec.containers = vec![
                container("a", &[("memory", memory)]),
                container("b", &[("memory", memory)]),
            ];
        }
        pod
    }

    #[test]
    fn test_request_overflow_fails_pre_filter() {
        let scheduler = Scheduler::with_defaults().unwrap();
        let nodes = vec![create_test_node("node1", "4", "7Ei", "110")];
        let pod = two_container_pod("huge", "5Ei");

        let err = scheduler.schedule_pod(&pod, snapshot(nodes, &[])).unwrap_err();
        assert!(matches!(err, SchedulerError::PluginFailed { .. }));
    }

    #[test]
    fn test_bound_pod_overflow_fails_snapshot() {
        let nodes = vec![create_test_node("node1", "4", "7Ei", "110")];
        let mut bound = two_container_pod("huge", "5Ei");
        if let Some(spec) = bound.spec.as_mut() {
            spec.node_name = Some("node1".to_string());
        }

        assert!(matches!(
            Snapshot::new(nodes, &[bound], true),
            Err(eagle_core::EagleError::ResourceOverflow { .. })
        ));
    }

    /// Scores every node with the largest representable value
    struct Greedy;

    impl Greedy {
        fn factory(
            _args: Option<&serde_json::Value>,
            _handle: Arc<dyn FrameworkHandle>,
        ) -> Result<Box<dyn Plugin>> {
            Ok(Box::new(Greedy))
        }
    }

    impl Plugin for Greedy {
        fn name(&self) -> &str {
            "greedy"
        }

        fn as_score(&self) -> Option<&dyn ScorePlugin> {
            Some(self)
        }
    }

    impl ScorePlugin for Greedy {
        fn score(
            &self,
            _state: &CycleState,
            _pod: &Pod,
            _node_name: &str,
        ) -> std::result::Result<i64, Status> {
            Ok(i64::MAX)
        }
    }

    #[test]
    fn test_weighted_sum_saturates() {
        let mut registry = Registry::with_defaults();
        registry.register("greedy", Greedy::factory);

        let config = SchedulerConfig {
            plugins: vec![
                PluginConfig::new("eagle").with_weight(100),
                PluginConfig::new("greedy").with_weight(100),
            ],
            ..Default::default()
        };
        let scheduler = Scheduler::new(config, &registry).unwrap();

        let nodes = vec![
            create_test_node("node1", "4", "8Gi", "110"),
            create_test_node("node2", "2", "4Gi", "110"),
        ];
        let pod = create_test_pod("web", "1", "1Gi");

        let result = scheduler.schedule_pod(&pod, snapshot(nodes, &[])).unwrap();
        assert_eq!(result.suggested_host, "node1");
        assert!(result.scores.iter().all(|s| s.score == i64::MAX));
    }
}
