//! Infrastructure implementation of the `ForwardRecordStore` port.
//!
//! `StateManager` provides async load/save using `tokio::task::spawn_blocking`
//! with atomic write (temp file + rename) to prevent state corruption.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::application::ports::ForwardRecordStore;
use crate::domain::ForwardRecord;

/// Forward record file manager, implements `ForwardRecordStore` for the infra layer.
pub struct StateManager {
    path: PathBuf,
}

impl StateManager {
    /// Create a state manager using the default path
    /// (`~/.cdp-dev/port-forwards.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(Self::with_path(
            home.join(".cdp-dev").join("port-forwards.json"),
        ))
    }

    /// Create a state manager with an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Synchronous load, used by `load_async` via `spawn_blocking`.
    ///
    /// Missing file → empty record. Unparsable file → empty record plus a
    /// warning; the next save overwrites it.
    fn load_sync(&self) -> Result<ForwardRecord> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ForwardRecord::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("reading state file {}", self.path.display()));
            }
        };
        match serde_json::from_str(&content) {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt forward record, treating as empty");
                Ok(ForwardRecord::default())
            }
        }
    }

    /// Synchronous save, used by `save_async` via `spawn_blocking`.
    fn save_sync(&self, record: &ForwardRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(record).context("serializing forward record")?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("finalizing state file {}", self.path.display()))?;

        Ok(())
    }
}

impl ForwardRecordStore for StateManager {
    async fn load_async(&self) -> Result<ForwardRecord> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || StateManager::with_path(path).load_sync())
            .await
            .context("state load task panicked")?
    }

    async fn save_async(&self, record: &ForwardRecord) -> Result<()> {
        let path = self.path.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || StateManager::with_path(path).save_sync(&record))
            .await
            .context("state save task panicked")?
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn manager(dir: &tempfile::TempDir) -> StateManager {
        StateManager::with_path(dir.path().join("nested").join("port-forwards.json"))
    }

    #[tokio::test]
    async fn missing_file_is_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        assert!(manager(&dir).load_async().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_keeps_pids_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(&dir);
        let mut record = ForwardRecord::default();
        record.insert("Airflow UI", 4321);
        mgr.save_async(&record).await.unwrap();

        assert_eq!(mgr.load_async().await.unwrap(), record);
        assert!(!mgr.path.with_extension("json.tmp").exists());
        let raw = std::fs::read_to_string(&mgr.path).unwrap();
        assert!(raw.contains("\"Airflow UI\": 4321"), "{raw}");
    }

    #[tokio::test]
    async fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(&dir);
        std::fs::create_dir_all(mgr.path.parent().unwrap()).unwrap();
        std::fs::write(&mgr.path, "{ not json").unwrap();
        assert!(mgr.load_async().await.unwrap().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn record_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let mgr = manager(&dir);
        mgr.save_async(&ForwardRecord::default()).await.unwrap();
        let mode = std::fs::metadata(&mgr.path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
