//! Port-forward specifications and the persisted forward record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A cluster service exposed on a local port. Static configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForwardSpec {
    /// Logical name; also the key in the forward record.
    pub name: &'static str,
    pub namespace: &'static str,
    /// Target selector in `kubectl port-forward` syntax (`svc/<name>`).
    pub target: &'static str,
    pub local_port: u16,
    pub remote_port: u16,
    pub url: &'static str,
}

impl ForwardSpec {
    /// Arguments for `kubectl` that open this tunnel.
    #[must_use]
    pub fn kubectl_args(&self) -> Vec<String> {
        vec![
            "port-forward".to_string(),
            self.target.to_string(),
            format!("{}:{}", self.local_port, self.remote_port),
            "-n".to_string(),
            self.namespace.to_string(),
        ]
    }
}

/// Every service exposed locally.
pub const FORWARDS: &[ForwardSpec] = &[ForwardSpec {
    name: "Airflow UI",
    namespace: "airflow",
    target: "svc/airflow-webserver",
    local_port: 8080,
    remote_port: 8080,
    url: "http://localhost:8080",
}];

/// Forward name → process identifier, persisted across CLI invocations.
///
/// An entry only means something if the PID is still live; callers must
/// probe before trusting it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForwardRecord(BTreeMap<String, u32>);

impl ForwardRecord {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.0.get(name).copied()
    }

    pub fn insert(&mut self, name: &str, pid: u32) {
        self.0.insert(name.to_string(), pid);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Derived liveness of one configured forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardStatus {
    pub name: String,
    pub url: String,
    pub local_port: u16,
    pub pid: Option<u32>,
    pub active: bool,
}
