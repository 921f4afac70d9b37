//! Cluster identity, lifecycle states, and parsers for the engine's output.

use serde::Serialize;

use crate::domain::error::ParseError;

/// The one cluster this tool manages.
pub const CLUSTER_NAME: &str = "cdp-local";

/// Container backing the cluster's control plane.
pub const CONTROL_PLANE_CONTAINER: &str = "cdp-local-control-plane";

/// Printed by `kind get clusters` when there are none.
const NO_CLUSTERS_SENTINEL: &str = "No kind clusters found.";

/// Observed lifecycle state of the cluster. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterState {
    Absent,
    PresentStopped,
    PresentRunning,
}

impl ClusterState {
    #[must_use]
    pub fn exists(self) -> bool {
        self != Self::Absent
    }

    /// Combine the two independent probes into one state.
    #[must_use]
    pub fn from_probes(exists: bool, running: bool) -> Self {
        match (exists, running) {
            (false, _) => Self::Absent,
            (true, false) => Self::PresentStopped,
            (true, true) => Self::PresentRunning,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::PresentStopped => "stopped",
            Self::PresentRunning => "running",
        }
    }
}

/// Parse `kind get clusters` output into cluster names.
#[must_use]
pub fn parse_cluster_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && *l != NO_CLUSTERS_SENTINEL)
        .map(str::to_owned)
        .collect()
}

/// Parse `docker inspect --format {{.State.Running}}` output.
///
/// # Errors
///
/// Returns [`ParseError::RunFlag`] for anything other than `true`/`false`.
pub fn parse_run_flag(stdout: &str) -> Result<bool, ParseError> {
    match stdout.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ParseError::RunFlag(other.to_string())),
    }
}
