use serde::Serialize;

/// Result of filtering a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterResult {
    /// Node name
    pub node_name: String,
    /// Whether the node passed every filter
    pub passed: bool,
    /// Plugin that rejected the node (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    /// Every reason reported by the rejecting plugin
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl FilterResult {
    /// Create a passing filter result
    pub fn pass(node_name: String) -> Self {
        Self {
            node_name,
            passed: true,
            plugin: None,
            reasons: Vec::new(),
        }
    }

    /// Create a failing filter result
    pub fn fail(node_name: String, plugin: String, reasons: Vec<String>) -> Self {
        Self {
            node_name,
            passed: false,
            plugin: Some(plugin),
            reasons,
        }
    }
}

/// Score of one node, as produced by a plugin or summed across plugins
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeScore {
    /// Node name
    pub name: String,
    /// Score (higher is better)
    pub score: i64,
}

impl NodeScore {
    /// Create a new node score
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Outcome of scheduling one pod
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResult {
    /// Node the pod should be bound to
    pub suggested_host: String,
    /// Number of nodes that went through filtering
    pub evaluated_nodes: usize,
    /// Number of nodes that passed filtering
    pub feasible_nodes: usize,
    /// Filter verdict per evaluated node
    pub filter_results: Vec<FilterResult>,
    /// Final weighted score per feasible node, best first
    pub scores: Vec<NodeScore>,
}
