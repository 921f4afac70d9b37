//! Cluster lifecycle: create, start, stop, delete, and kubeconfig export.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! State is re-probed on every call because the cluster can be changed
//! outside this tool (Docker Desktop, `kind delete`). Already-in-state
//! transitions return a no-op outcome instead of an error.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{
    AssetLocator, ClusterInspector, ClusterLifecycle, ProgressReporter,
};
use crate::domain::cluster::{self, CLUSTER_NAME, ClusterState};
use crate::domain::error::ClusterError;
use crate::domain::release::KIND_CONFIG_FILE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyStopped,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Absent,
}

/// Whether the cluster appears in the engine's cluster list.
///
/// # Errors
///
/// Returns an error if the list command cannot be run or fails.
pub async fn exists(engine: &impl ClusterInspector) -> Result<bool> {
    let output = engine.list_clusters().await.context("listing clusters")?;
    ensure_success(&output, "listing clusters")?;
    let names = cluster::parse_cluster_list(&String::from_utf8_lossy(&output.stdout));
    Ok(names.iter().any(|n| n == CLUSTER_NAME))
}

/// Whether the control-plane container is executing.
///
/// A failed inspect (no such container) counts as not running.
///
/// # Errors
///
/// Returns an error if the inspect command cannot be spawned or prints
/// something other than a boolean.
pub async fn is_running(engine: &impl ClusterInspector) -> Result<bool> {
    let output = engine
        .inspect_control_plane()
        .await
        .context("inspecting control-plane container")?;
    if !output.status.success() {
        return Ok(false);
    }
    Ok(cluster::parse_run_flag(&String::from_utf8_lossy(
        &output.stdout,
    ))?)
}

/// Current lifecycle state from both probes.
///
/// # Errors
///
/// Propagates probe failures.
pub async fn state(engine: &impl ClusterInspector) -> Result<ClusterState> {
    if !exists(engine).await? {
        return Ok(ClusterState::Absent);
    }
    let running = is_running(engine).await?;
    Ok(ClusterState::from_probes(true, running))
}

/// Create the cluster from the shipped config file unless it already exists.
///
/// # Errors
///
/// Returns `ClusterError::ConfigNotFound` when no config file is found,
/// or `ClusterError::CommandFailed` when creation fails.
pub async fn create(
    engine: &(impl ClusterInspector + ClusterLifecycle),
    assets: &impl AssetLocator,
    reporter: &impl ProgressReporter,
) -> Result<CreateOutcome> {
    if exists(engine).await? {
        tracing::info!(cluster = CLUSTER_NAME, "cluster exists, skipping create");
        reporter.success(&format!("cluster '{CLUSTER_NAME}' already exists"));
        return Ok(CreateOutcome::AlreadyExists);
    }

    let config = assets.helm_asset(&Path::new("kind").join(KIND_CONFIG_FILE))?;
    reporter.step(&format!("creating cluster '{CLUSTER_NAME}'..."));
    tracing::info!(cluster = CLUSTER_NAME, config = %config.display(), "creating cluster");
    let output = engine.create(&config).await.context("creating cluster")?;
    ensure_success(&output, "create")?;
    reporter.success(&format!("cluster '{CLUSTER_NAME}' created"));
    Ok(CreateOutcome::Created)
}

/// Resume a stopped cluster.
///
/// # Errors
///
/// Returns `ClusterError::NotFound` when the cluster is absent.
pub async fn start(
    engine: &(impl ClusterInspector + ClusterLifecycle),
    reporter: &impl ProgressReporter,
) -> Result<StartOutcome> {
    match state(engine).await? {
        ClusterState::Absent => Err(ClusterError::NotFound(CLUSTER_NAME.to_string()).into()),
        ClusterState::PresentRunning => {
            reporter.success(&format!("cluster '{CLUSTER_NAME}' is already running"));
            Ok(StartOutcome::AlreadyRunning)
        }
        ClusterState::PresentStopped => {
            reporter.step(&format!("starting cluster '{CLUSTER_NAME}'..."));
            tracing::info!(cluster = CLUSTER_NAME, "resuming control plane");
            let output = engine.resume().await.context("starting cluster")?;
            ensure_success(&output, "start")?;
            reporter.success(&format!("cluster '{CLUSTER_NAME}' started"));
            Ok(StartOutcome::Started)
        }
    }
}

/// Pause the cluster, keeping its data.
///
/// # Errors
///
/// Returns `ClusterError::CommandFailed` when the stop command fails.
pub async fn stop(
    engine: &(impl ClusterInspector + ClusterLifecycle),
    reporter: &impl ProgressReporter,
) -> Result<StopOutcome> {
    match state(engine).await? {
        ClusterState::Absent => {
            reporter.success(&format!("cluster '{CLUSTER_NAME}' does not exist"));
            Ok(StopOutcome::Absent)
        }
        ClusterState::PresentStopped => {
            reporter.success(&format!("cluster '{CLUSTER_NAME}' is already stopped"));
            Ok(StopOutcome::AlreadyStopped)
        }
        ClusterState::PresentRunning => {
            reporter.step(&format!("stopping cluster '{CLUSTER_NAME}'..."));
            tracing::info!(cluster = CLUSTER_NAME, "pausing control plane");
            let output = engine.pause().await.context("stopping cluster")?;
            ensure_success(&output, "stop")?;
            reporter.success(&format!("cluster '{CLUSTER_NAME}' stopped (data retained)"));
            Ok(StopOutcome::Stopped)
        }
    }
}

/// Irreversibly delete the cluster. Confirmation is the caller's job.
///
/// # Errors
///
/// Returns `ClusterError::CommandFailed` when the delete command fails.
pub async fn delete(
    engine: &(impl ClusterInspector + ClusterLifecycle),
    reporter: &impl ProgressReporter,
) -> Result<DeleteOutcome> {
    if !exists(engine).await? {
        reporter.success(&format!("cluster '{CLUSTER_NAME}' does not exist"));
        return Ok(DeleteOutcome::Absent);
    }
    reporter.step(&format!("deleting cluster '{CLUSTER_NAME}'..."));
    tracing::info!(cluster = CLUSTER_NAME, "deleting cluster");
    let output = engine.delete().await.context("deleting cluster")?;
    ensure_success(&output, "delete")?;
    reporter.success(&format!("cluster '{CLUSTER_NAME}' deleted"));
    Ok(DeleteOutcome::Deleted)
}

/// Point the current kubeconfig context at the cluster.
///
/// Must follow every create and start. Does not change cluster state.
///
/// # Errors
///
/// Returns `ClusterError::CommandFailed` when the export fails.
pub async fn export_kubeconfig(engine: &impl ClusterLifecycle) -> Result<()> {
    let output = engine
        .export_kubeconfig()
        .await
        .context("exporting kubeconfig")?;
    ensure_success(&output, "kubeconfig export")?;
    tracing::debug!(cluster = CLUSTER_NAME, "kubeconfig exported");
    Ok(())
}

fn ensure_success(output: &Output, action: &'static str) -> Result<(), ClusterError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let detail = if stderr.trim().is_empty() {
        stdout.trim().to_string()
    } else {
        stderr.trim().to_string()
    };
    Err(ClusterError::CommandFailed {
        action,
        cluster: CLUSTER_NAME.to_string(),
        detail,
    })
}
