//! User configuration loaded from a YAML file on disk.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::config::DevConfig;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "CDP_DEV_CONFIG";

/// Reads `~/.cdp-dev/config.yaml` (or `$CDP_DEV_CONFIG`).
pub struct YamlConfigStore;

impl YamlConfigStore {
    /// Load the config. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<DevConfig> {
        let path = self.path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(DevConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(DevConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn path(&self) -> Result<PathBuf> {
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".cdp-dev").join("config.yaml"))
    }
}
