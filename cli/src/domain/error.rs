//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::time::Duration;

use thiserror::Error;

// ── Environment errors ────────────────────────────────────────────────────────

/// The host is missing something this tool cannot fix on its own.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("Docker is not installed.\n\nInstall it from: {hint}\nThen run this command again.")]
    DaemonNotInstalled { hint: String },

    #[error(
        "Docker daemon did not become ready within {}s.\n\n\
         Start Docker Desktop (or `sudo systemctl start docker`) manually, \
         wait until it reports running, then try again.",
        .waited.as_secs()
    )]
    DaemonTimeout { waited: Duration },

    #[error(
        "'{tool}' is still not usable after installing it.\n\n\
         Close this terminal, open a new one, and run the command again \
         so the updated PATH is picked up."
    )]
    RestartTerminal { tool: String },

    #[error("'{tool}' cannot be installed automatically on this platform.\n\nInstall it manually: {hint}")]
    ManualInstallRequired { tool: String, hint: String },

    #[error("Administrator privileges are required to install {manager}, and elevation was refused.")]
    ElevationRefused { manager: String },

    #[error("Failed to install {manager}: {detail}")]
    PackageManagerBootstrap { manager: String, detail: String },
}

// ── Cluster errors ────────────────────────────────────────────────────────────

/// Errors raised by the cluster lifecycle manager.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("Cluster '{0}' does not exist. Run 'cdp-dev install' first.")]
    NotFound(String),

    #[error("Cannot locate {file}. Looked in:\n{searched}")]
    ConfigNotFound { file: String, searched: String },

    #[error("{action} failed for cluster '{cluster}':\n{detail}")]
    CommandFailed {
        action: &'static str,
        cluster: String,
        detail: String,
    },
}

// ── Release errors ────────────────────────────────────────────────────────────

/// Errors raised while deploying the application release.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("Values file not found: {0}")]
    ValuesNotFound(String),

    #[error("Could not create namespace '{namespace}':\n{detail}")]
    Namespace { namespace: String, detail: String },

    #[error("Installing release '{release}' failed.\n\n{detail}\n\nRe-run for detailed output:\n  {command}")]
    InstallFailed {
        release: String,
        detail: String,
        command: String,
    },

    #[error(
        "Pods in namespace '{namespace}' were not ready after {} minutes ({summary}).\n\n\
         Diagnose with:\n  kubectl get pods -n {namespace}\n  \
         kubectl describe pods -n {namespace}\n  cdp-dev logs",
        .waited.as_secs() / 60
    )]
    ReadinessTimeout {
        namespace: String,
        waited: Duration,
        summary: String,
    },
}

// ── Parse errors ──────────────────────────────────────────────────────────────

/// Output from an external tool did not match the expected grammar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected 4 columns (namespace, name, phase, ready) in pod line: {0:?}")]
    PodColumns(String),

    #[error("unknown pod phase {phase:?} in line: {line:?}")]
    PodPhase { phase: String, line: String },

    #[error("invalid readiness flag {flag:?} in line: {line:?}")]
    ReadyFlag { flag: String, line: String },

    #[error("expected 'true' or 'false' from container inspect, got {0:?}")]
    RunFlag(String),
}
