use crate::request::compute_pod_resource_request;
use eagle_core::{object_name, Node, Pod, Resource, Result};
use std::collections::BTreeMap;
use tracing::warn;

/// Resource view of one node: capacity, what is already committed, and the
/// pods bound to it
#[derive(Debug, Clone, Default)]
pub struct NodeInfo {
    node: Option<Node>,
    /// Capacity available to pods
    pub allocatable: Resource,
    /// Sum of the requests of every pod bound to the node
    pub requested: Resource,
    pods: Vec<Pod>,
}

impl NodeInfo {
    /// Create a node info from a node object, reading `status.allocatable`
    pub fn new(node: Node) -> Result<Self> {
        let allocatable = match node.status.as_ref().and_then(|s| s.allocatable.as_ref()) {
            Some(list) => Resource::from_resource_list(list)?,
            None => Resource::default(),
        };

        Ok(Self {
            node: Some(node),
            allocatable,
            requested: Resource::default(),
            pods: Vec::new(),
        })
    }

    /// Underlying node object; `None` when only pods reference this name
    pub fn node(&self) -> Option<&Node> {
        self.node.as_ref()
    }

    /// Pods currently bound to the node
    pub fn pods(&self) -> &[Pod] {
        &self.pods
    }

    /// Account a pod against this node
    pub fn add_pod(&mut self, pod: Pod, pod_overhead: bool) -> Result<()> {
        let request = compute_pod_resource_request(&pod, pod_overhead)?;
        self.requested.add_resource(&request)?;
        self.pods.push(pod);
        Ok(())
    }
}

/// Immutable view of the cluster for one scheduling decision
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    node_infos: BTreeMap<String, NodeInfo>,
}

impl Snapshot {
    /// Build a snapshot from nodes and the pods bound to them.
    ///
    /// Pods without `spec.nodeName` are ignored. Pods bound to a node that is
    /// not in `nodes` still get an entry, without a node object.
    pub fn new(nodes: Vec<Node>, pods: &[Pod], pod_overhead: bool) -> Result<Self> {
        let mut node_infos = BTreeMap::new();

        for node in nodes {
            let name = object_name(&node.metadata).to_string();
            if node_infos.contains_key(&name) {
                warn!("Duplicate node {} in snapshot, keeping the first", name);
                continue;
            }
            node_infos.insert(name, NodeInfo::new(node)?);
        }

        for pod in pods {
            let Some(node_name) = pod.spec.as_ref().and_then(|s| s.node_name.clone()) else {
                continue;
            };
            node_infos
                .entry(node_name)
                .or_insert_with(NodeInfo::default)
                .add_pod(pod.clone(), pod_overhead)?;
        }

        Ok(Self { node_infos })
    }

    /// Look up a node by name
    pub fn get(&self, node_name: &str) -> Option<&NodeInfo> {
        self.node_infos.get(node_name)
    }

    /// Nodes that have a node object, ordered by name
    pub fn list(&self) -> impl Iterator<Item = (&str, &NodeInfo)> {
        self.node_infos
            .iter()
            .filter(|(_, info)| info.node().is_some())
            .map(|(name, info)| (name.as_str(), info))
    }

    /// Number of entries, including pod-only entries
    pub fn len(&self) -> usize {
        self.node_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_infos.is_empty()
    }
}
