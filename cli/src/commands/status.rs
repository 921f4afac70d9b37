//! `cdp-dev status`: cluster state, pods, and port-forwards.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::{cluster, forwards, release};
use crate::domain::{ClusterState, StatusReport};
use crate::infra::process::OsProcessTable;
use crate::output::json;

/// Run `cdp-dev status`.
///
/// A pod query failure on a running cluster is shown as a warning; the
/// rest of the report still prints.
///
/// # Errors
///
/// Returns an error if the cluster state or forward record cannot be read.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let state = cluster::state(&app.provisioner()).await?;

    let pods = if state == ClusterState::PresentRunning {
        match release::list_pods(&app.kubectl(), None).await {
            Ok(pods) => pods,
            Err(e) => {
                tracing::warn!(error = %e, "pod listing failed");
                app.output.warn(&format!("could not list pods: {e:#}"));
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let store = app.state_mgr()?;
    let forwards = forwards::status(&OsProcessTable, &store).await?;
    let report = StatusReport::new(state, pods, forwards);

    if app.is_json() {
        json::print(&report)?;
    } else {
        app.renderer().render_status(&report);
    }
    Ok(ExitCode::SUCCESS)
}
