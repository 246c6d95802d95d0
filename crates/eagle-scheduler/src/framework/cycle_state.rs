use eagle_core::Resource;

/// Per-pod state of one scheduling decision.
///
/// PreFilter writes through `&mut CycleState`; Filter and Score only ever get
/// `&CycleState`, so every write lands before the first read and the state
/// can be shared across parallel filter calls.
#[derive(Debug, Default)]
pub struct CycleState {
    pod_request: Option<Resource>,
}

impl CycleState {
    /// Create an empty cycle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the aggregated request of the pod being scheduled
    pub fn write_pod_request(&mut self, request: Resource) {
        self.pod_request = Some(request);
    }

    /// Aggregated request computed at PreFilter, if PreFilter ran
    pub fn pod_request(&self) -> Option<&Resource> {
        self.pod_request.as_ref()
    }
}
