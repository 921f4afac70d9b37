//! Infrastructure implementation of the `ValuesStore` port.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::ValuesStore;
use crate::domain::error::ReleaseError;

/// Reads and writes YAML values documents, replacing files atomically.
pub struct YamlValuesStore;

impl ValuesStore for YamlValuesStore {
    fn load(&self, path: &Path) -> Result<serde_yaml::Value> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReleaseError::ValuesNotFound(path.display().to_string()).into());
            }
            Err(e) => return Err(e).with_context(|| format!("cannot read {}", path.display())),
        };
        if content.trim().is_empty() {
            return Ok(serde_yaml::Value::Null);
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }

    fn save(&self, path: &Path, doc: &serde_yaml::Value) -> Result<()> {
        let content = serde_yaml::to_string(doc).context("cannot serialize values")?;
        let temp_path = path.with_extension("yaml.tmp");
        std::fs::write(&temp_path, content)
            .with_context(|| format!("cannot write {}", temp_path.display()))?;
        std::fs::rename(&temp_path, path)
            .with_context(|| format!("cannot replace {}", path.display()))
    }
}
