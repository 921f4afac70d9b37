//! Aggregate status snapshot rendered by `status`.

use serde::Serialize;

use crate::domain::cluster::{CLUSTER_NAME, ClusterState};
use crate::domain::forward::ForwardStatus;
use crate::domain::pods::{PodStatus, Readiness};

/// Everything `status` reports, derived fresh on each call.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub cluster: String,
    pub state: ClusterState,
    /// Pods across all namespaces; empty unless the cluster is running.
    pub pods: Vec<PodStatus>,
    pub forwards: Vec<ForwardStatus>,
}

impl StatusReport {
    #[must_use]
    pub fn new(state: ClusterState, pods: Vec<PodStatus>, forwards: Vec<ForwardStatus>) -> Self {
        Self {
            cluster: CLUSTER_NAME.to_string(),
            state,
            pods,
            forwards,
        }
    }

    #[must_use]
    pub fn readiness(&self) -> Readiness {
        Readiness::of(&self.pods)
    }
}
