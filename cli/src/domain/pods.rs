//! Pod status table: grammar, parsing, and readiness summary.
//!
//! The cluster API client is queried with
//! `-o custom-columns=NS:..,NAME:..,PHASE:..,READY:.. --no-headers`, so every
//! non-blank line must hold exactly four whitespace-separated columns.

use std::fmt;

use serde::Serialize;

use crate::domain::error::ParseError;

/// Column spec passed to `kubectl get pods -o`.
pub const POD_COLUMNS: &str = "custom-columns=NS:.metadata.namespace,NAME:.metadata.name,\
PHASE:.status.phase,READY:.status.containerStatuses[*].ready";

/// Pod lifecycle phase as reported by the API server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl PodPhase {
    fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            "Unknown" | "<none>" => Self::Unknown,
            _ => return None,
        })
    }
}

impl fmt::Display for PodPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// One row of the pod table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodStatus {
    pub namespace: String,
    pub name: String,
    pub phase: PodPhase,
    /// Per-container readiness; empty when no container statuses exist yet.
    pub containers_ready: Vec<bool>,
}

impl PodStatus {
    /// A completed job pod, or a running pod whose containers are all ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        match self.phase {
            PodPhase::Succeeded => true,
            PodPhase::Running => {
                !self.containers_ready.is_empty() && self.containers_ready.iter().all(|r| *r)
            }
            _ => false,
        }
    }
}

/// Parse the full pod table.
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; no partial result is returned.
pub fn parse_pod_table(stdout: &str) -> Result<Vec<PodStatus>, ParseError> {
    stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(parse_pod_line)
        .collect()
}

fn parse_pod_line(line: &str) -> Result<PodStatus, ParseError> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    let [namespace, name, phase, ready] = cols.as_slice() else {
        return Err(ParseError::PodColumns(line.to_string()));
    };
    let phase = PodPhase::parse(phase).ok_or_else(|| ParseError::PodPhase {
        phase: (*phase).to_string(),
        line: line.to_string(),
    })?;
    let containers_ready = if *ready == "<none>" {
        Vec::new()
    } else {
        ready
            .split(',')
            .map(|flag| match flag {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(ParseError::ReadyFlag {
                    flag: other.to_string(),
                    line: line.to_string(),
                }),
            })
            .collect::<Result<_, _>>()?
    };
    Ok(PodStatus {
        namespace: (*namespace).to_string(),
        name: (*name).to_string(),
        phase,
        containers_ready,
    })
}

/// Aggregate readiness over a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub ready: usize,
    pub total: usize,
}

impl Readiness {
    #[must_use]
    pub fn of(pods: &[PodStatus]) -> Self {
        Self {
            ready: pods.iter().filter(|p| p.is_ready()).count(),
            total: pods.len(),
        }
    }

    /// All pods ready. An empty namespace is never ready.
    #[must_use]
    pub fn all_ready(self) -> bool {
        self.total > 0 && self.ready == self.total
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} pods ready", self.ready, self.total)
    }
}
