//! Process-scoped executable search path.
//!
//! Package managers update the OS-persisted `PATH`, which this already
//! running process never sees. Instead of mutating the process environment,
//! the refreshed value lives in a [`SearchPath`] shared by the command
//! runner (which hands it to every child) and the tool locator (which
//! resolves executables against it).

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::ToolLocator;
use crate::domain::tool::Platform;

/// Well-known Homebrew prefixes, prepended on Unix-like hosts.
const BREW_PREFIXES: &[&str] = &["/opt/homebrew/bin", "/usr/local/bin"];

const REFRESH_TIMEOUT: Duration = Duration::from_secs(15);

/// The search path children are spawned with. Empty until refreshed,
/// meaning "inherit this process's `PATH`".
#[derive(Debug, Default)]
pub struct SearchPath {
    refreshed: RwLock<Option<OsString>>,
}

impl SearchPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The refreshed value, if a refresh has happened.
    #[must_use]
    pub fn refreshed(&self) -> Option<OsString> {
        self.refreshed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The value to resolve against: refreshed, else inherited.
    #[must_use]
    pub fn current(&self) -> Option<OsString> {
        self.refreshed().or_else(|| std::env::var_os("PATH"))
    }

    pub fn set(&self, value: OsString) {
        *self
            .refreshed
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// Resolve `program` to a full path.
    #[must_use]
    pub fn resolve(&self, program: &str) -> Option<PathBuf> {
        let cwd = lookup_dir(std::env::current_dir().ok());
        which::which_in(program, self.current(), cwd).ok()
    }
}

/// Directory relative entries resolve against. A deleted working directory
/// falls back to home, then the filesystem root.
fn lookup_dir(cwd: Option<PathBuf>) -> PathBuf {
    cwd.or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from(std::path::MAIN_SEPARATOR_STR))
}

/// Put `fresh` entries first, keep any `current` entries it lacks, and
/// drop duplicates.
#[must_use]
pub fn merge_paths(fresh: &OsStr, current: &OsStr) -> Option<OsString> {
    let mut seen = Vec::<PathBuf>::new();
    for entry in std::env::split_paths(fresh).chain(std::env::split_paths(current)) {
        if entry.as_os_str().is_empty() || seen.contains(&entry) {
            continue;
        }
        seen.push(entry);
    }
    std::env::join_paths(seen).ok()
}

/// Production [`ToolLocator`] backed by `which` and the OS-persisted path.
pub struct SystemToolLocator {
    search: Arc<SearchPath>,
    platform: Platform,
}

impl SystemToolLocator {
    #[must_use]
    pub fn new(search: Arc<SearchPath>, platform: Platform) -> Self {
        Self { search, platform }
    }
}

impl ToolLocator for SystemToolLocator {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.search.resolve(name)
    }

    async fn refresh_search_path(&self) -> Result<()> {
        let persisted = persisted_path(self.platform).await?;
        let current = self.search.current().unwrap_or_default();
        let merged = merge_paths(&persisted, &current)
            .context("refreshed PATH contains an invalid entry")?;
        tracing::debug!(path = ?merged, "search path refreshed");
        self.search.set(merged);
        Ok(())
    }
}

/// Read the `PATH` a freshly opened terminal would get.
async fn persisted_path(platform: Platform) -> Result<OsString> {
    if platform == Platform::Windows {
        let script = "[Environment]::GetEnvironmentVariable('Path','Machine') + ';' + \
                      [Environment]::GetEnvironmentVariable('Path','User')";
        return capture("powershell", &["-NoProfile", "-Command", script]).await;
    }

    let shell = std::env::var_os("SHELL").unwrap_or_else(|| OsString::from("/bin/sh"));
    let login = capture(&shell.to_string_lossy(), &["-lc", "printf %s \"$PATH\""])
        .await
        .unwrap_or_default();
    let prefixes: Vec<PathBuf> = BREW_PREFIXES
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.is_dir())
        .collect();
    let prefixes = std::env::join_paths(prefixes).unwrap_or_default();
    merge_paths(&prefixes, &login).context("login shell PATH contains an invalid entry")
}

async fn capture(program: &str, args: &[&str]) -> Result<OsString> {
    let child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();
    let output = tokio::time::timeout(REFRESH_TIMEOUT, child)
        .await
        .with_context(|| format!("{program} timed out reading PATH"))?
        .with_context(|| format!("failed to run {program}"))?;
    anyhow::ensure!(output.status.success(), "{program} could not report PATH");
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(OsString::from(text))
}
