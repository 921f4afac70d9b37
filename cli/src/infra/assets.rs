//! Locates the helm assets directory shipped with the tool.
//!
//! Two layouts are probed in order: the installed layout
//! (`<exe dir>/../share/cdp-dev/helm`) and the source checkout
//! (`<crate>/../helm`).

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::application::ports::AssetLocator;
use crate::domain::error::ClusterError;

pub struct HelmAssets {
    roots: Vec<PathBuf>,
}

impl HelmAssets {
    /// Candidate roots for the running binary.
    #[must_use]
    pub fn discover() -> Self {
        let mut roots = Vec::new();
        if let Some(bin_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            roots.push(bin_dir.join("..").join("share").join("cdp-dev").join("helm"));
        }
        roots.push(Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("helm"));
        Self { roots }
    }

    /// Explicit roots (used in tests).
    #[must_use]
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl AssetLocator for HelmAssets {
    fn helm_asset(&self, relative: &Path) -> Result<PathBuf> {
        if let Some(found) = self
            .roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.is_file())
        {
            tracing::debug!(path = %found.display(), "resolved helm asset");
            return Ok(found);
        }
        let searched = self
            .roots
            .iter()
            .map(|root| format!("  {}", root.join(relative).display()))
            .collect::<Vec<_>>()
            .join("\n");
        Err(ClusterError::ConfigNotFound {
            file: relative.display().to_string(),
            searched,
        }
        .into())
    }
}
