//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::ForwardRecord;
use crate::domain::tool::PackageIds;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
///
/// A non-zero exit is never an error here: callers inspect `Output::status`
/// and branch on expected failures themselves.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<std::process::ExitStatus>;
    /// Spawn a background process with all stdio discarded and return its PID.
    ///
    /// The child outlives this process; nothing waits on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<u32>;
}

// ── Tool discovery ────────────────────────────────────────────────────────────

/// Resolves executables against the process-scoped search path.
#[allow(async_fn_in_trait)]
pub trait ToolLocator {
    /// Full path of `name` if it resolves on the current search path.
    fn locate(&self, name: &str) -> Option<PathBuf>;
    /// Reload the search path from the OS-persisted value so freshly
    /// installed tools become visible to this process.
    async fn refresh_search_path(&self) -> Result<()>;
}

/// What bootstrapping a package manager did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    /// The package manager is now installed in this process's view.
    Installed,
    /// An elevated copy of this process was launched to finish the job;
    /// the current invocation must stop.
    RelaunchedElevated,
}

/// A platform package manager.
#[allow(async_fn_in_trait)]
pub trait PackageManager {
    /// Display name, e.g. `"Homebrew"`.
    fn name(&self) -> &'static str;
    /// The package identifier for a tool under this manager, if any.
    fn package_for(&self, ids: &PackageIds) -> Option<&'static str>;
    /// Whether the manager's executable is available.
    async fn is_available(&self) -> bool;
    /// Install the package manager itself.
    async fn bootstrap(&self) -> Result<Bootstrap>;
    /// Install `package`, or upgrade it when `upgrade` is set.
    async fn install(&self, package: &str, upgrade: bool) -> Result<()>;
}

/// The container runtime's daemon.
#[allow(async_fn_in_trait)]
pub trait ContainerDaemon {
    /// Whether the daemon answers an `info` query.
    async fn is_responding(&self) -> bool;
    /// Start the daemon in the background. Returns once launched, not ready.
    async fn launch(&self) -> Result<()>;
}

// ── Cluster Ports ─────────────────────────────────────────────────────────────

/// Cluster state inspection. Every call re-probes; nothing is cached.
#[allow(async_fn_in_trait)]
pub trait ClusterInspector {
    /// List known cluster names (`kind get clusters`).
    async fn list_clusters(&self) -> Result<Output>;
    /// Inspect the control-plane container's running flag.
    async fn inspect_control_plane(&self) -> Result<Output>;
}

/// Cluster lifecycle operations.
#[allow(async_fn_in_trait)]
pub trait ClusterLifecycle {
    /// Create the cluster from a config file.
    async fn create(&self, config: &Path) -> Result<Output>;
    /// Resume the control-plane container.
    async fn resume(&self) -> Result<Output>;
    /// Pause the control-plane container; data is retained.
    async fn pause(&self) -> Result<Output>;
    /// Irreversibly delete the cluster.
    async fn delete(&self) -> Result<Output>;
    /// Point the kubeconfig's current context at the cluster.
    async fn export_kubeconfig(&self) -> Result<Output>;
}

/// Composite trait: any type implementing both sub-traits is a `ClusterEngine`.
pub trait ClusterEngine: ClusterInspector + ClusterLifecycle {}

/// Blanket implementation: any type implementing both sub-traits is a `ClusterEngine`.
impl<T> ClusterEngine for T where T: ClusterInspector + ClusterLifecycle {}

/// Locates files shipped alongside the tool.
pub trait AssetLocator {
    /// Resolve `relative` (e.g. `kind/kind-config.yaml`) under the helm
    /// asset directory.
    ///
    /// # Errors
    ///
    /// Returns `ClusterError::ConfigNotFound` listing every searched location.
    fn helm_asset(&self, relative: &Path) -> Result<PathBuf>;
}

// ── Release Ports ─────────────────────────────────────────────────────────────

/// Cluster API queries and mutations (`kubectl`).
#[allow(async_fn_in_trait)]
pub trait ClusterApi {
    async fn get_namespace(&self, namespace: &str) -> Result<Output>;
    async fn create_namespace(&self, namespace: &str) -> Result<Output>;
    /// Pod table in `POD_COLUMNS` format; all namespaces when `None`.
    async fn get_pods(&self, namespace: Option<&str>) -> Result<Output>;
}

/// Parameters for an install-or-upgrade.
#[derive(Debug, Clone)]
pub struct ReleaseSpec<'a> {
    pub release: &'a str,
    pub chart: &'a str,
    pub namespace: &'a str,
    pub values: &'a Path,
    /// Passed to the deployer as `--timeout`.
    pub timeout: &'a str,
}

/// Package deployer (`helm`).
#[allow(async_fn_in_trait)]
pub trait ReleaseDeployer {
    async fn add_repo(&self, name: &str, url: &str) -> Result<Output>;
    async fn update_repos(&self) -> Result<Output>;
    async fn upgrade_install(&self, spec: &ReleaseSpec<'_>) -> Result<Output>;
}

/// Reads and writes the values document.
pub trait ValuesStore {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    fn load(&self, path: &Path) -> Result<serde_yaml::Value>;
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    fn save(&self, path: &Path, doc: &serde_yaml::Value) -> Result<()>;
}

// ── Supervisor Ports ──────────────────────────────────────────────────────────

/// OS process-table queries and signals.
pub trait ProcessTable {
    /// Zero-signal liveness probe. Any probe failure counts as not alive.
    fn is_alive(&self, pid: u32) -> bool;
    /// Send a graceful termination signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal cannot be delivered.
    fn terminate(&self, pid: u32) -> Result<()>;
}

/// Durable forward-record persistence. The only channel between invocations.
#[allow(async_fn_in_trait)]
pub trait ForwardRecordStore {
    /// Load the record. A missing or corrupt file yields an empty record.
    async fn load_async(&self) -> Result<ForwardRecord>;
    /// Persist the record atomically.
    async fn save_async(&self, record: &ForwardRecord) -> Result<()>;
}

// ── Time Port ─────────────────────────────────────────────────────────────────

/// Monotonic time source for polling loops.
#[allow(async_fn_in_trait)]
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
    async fn sleep(&self, duration: Duration);
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}
