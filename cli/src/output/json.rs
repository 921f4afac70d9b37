//! JSON output helpers.
//!
//! Every `--json` code path prints one pretty-printed document to stdout.
//! Failures are reported as an error object instead.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{ClusterError, EnvironmentError, ParseError, ReleaseError};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable machine-readable code for the first typed error in the chain.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<EnvironmentError>() {
            return match e {
                EnvironmentError::DaemonNotInstalled { .. } => "daemon_not_installed",
                EnvironmentError::DaemonTimeout { .. } => "daemon_timeout",
                EnvironmentError::RestartTerminal { .. } => "restart_terminal",
                EnvironmentError::ManualInstallRequired { .. } => "manual_install_required",
                EnvironmentError::ElevationRefused { .. } => "elevation_refused",
                EnvironmentError::PackageManagerBootstrap { .. } => "package_manager_bootstrap",
            };
        }
        if let Some(e) = cause.downcast_ref::<ClusterError>() {
            return match e {
                ClusterError::NotFound(_) => "cluster_not_found",
                ClusterError::ConfigNotFound { .. } => "cluster_config_not_found",
                ClusterError::CommandFailed { .. } => "cluster_command_failed",
            };
        }
        if let Some(e) = cause.downcast_ref::<ReleaseError>() {
            return match e {
                ReleaseError::ValuesNotFound(_) => "values_not_found",
                ReleaseError::Namespace { .. } => "namespace_failed",
                ReleaseError::InstallFailed { .. } => "install_failed",
                ReleaseError::ReadinessTimeout { .. } => "readiness_timeout",
            };
        }
        if cause.downcast_ref::<ParseError>().is_some() {
            return "parse_error";
        }
    }
    "error"
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{out}");
    Ok(())
}
