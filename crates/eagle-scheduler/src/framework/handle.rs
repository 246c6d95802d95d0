use super::Snapshot;
use crate::config::FeatureGates;
use std::sync::{Arc, RwLock};

/// Services the framework offers to plugins
pub trait FrameworkHandle: Send + Sync {
    /// Snapshot of the cluster for the decision in progress
    fn snapshot(&self) -> Arc<Snapshot>;

    /// Feature gates the scheduler was started with
    fn feature_gates(&self) -> &FeatureGates;
}

/// Framework handle with a replaceable snapshot
#[derive(Debug, Default)]
pub struct Handle {
    snapshot: RwLock<Arc<Snapshot>>,
    feature_gates: FeatureGates,
}

impl Handle {
    /// Create a handle with an empty snapshot
    pub fn new(feature_gates: FeatureGates) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            feature_gates,
        }
    }

    /// Replace the snapshot seen by plugins
    pub fn update_snapshot(&self, snapshot: Arc<Snapshot>) {
        let mut guard = self.snapshot.write().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot;
    }
}

impl FrameworkHandle for Handle {
    fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn feature_gates(&self) -> &FeatureGates {
        &self.feature_gates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::snapshot::tests::create_test_node;

    #[test]
    fn test_update_snapshot() {
        let handle = Handle::new(FeatureGates::default());
        assert!(handle.snapshot().is_empty());

        let snapshot = Snapshot::new(vec![create_test_node("node1", "4", "8Gi", "110")], &[], true)
            .unwrap();
        handle.update_snapshot(Arc::new(snapshot));

        assert!(handle.snapshot().get("node1").is_some());
        assert!(handle.feature_gates().pod_overhead);
    }
}
