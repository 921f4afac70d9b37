//! User configuration schema.
//!
//! Pure types only, loading lives in `infra::config`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `~/.cdp-dev/config.yaml`.
///
/// Every field is optional in the file; missing fields take defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "snake_case")]
pub struct DevConfig {
    /// Override for the release values document.
    pub values_file: Option<PathBuf>,
    /// Ceiling for the pod readiness wait, in seconds.
    pub readiness_timeout_secs: u64,
    /// Timeout handed to `helm upgrade --install` (Go duration syntax).
    pub helm_timeout: String,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            values_file: None,
            readiness_timeout_secs: 15 * 60,
            helm_timeout: "10m".to_string(),
        }
    }
}

impl DevConfig {
    #[must_use]
    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness_timeout_secs)
    }
}
