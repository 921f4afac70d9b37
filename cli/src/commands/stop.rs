//! `cdp-dev stop`: close port-forwards and pause the cluster, keeping data.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::cluster::{self, StopOutcome};
use crate::application::services::forwards;
use crate::infra::process::OsProcessTable;

/// Run `cdp-dev stop`.
///
/// # Errors
///
/// Returns an error if the forward record cannot be cleared or the cluster
/// cannot be stopped.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let reporter = app.reporter();
    let store = app.state_mgr()?;
    forwards::stop_all(&OsProcessTable, &store, &reporter).await?;

    let outcome = cluster::stop(&app.provisioner(), &reporter).await?;
    drop(reporter);

    let ctx = &app.output;
    match outcome {
        StopOutcome::Absent => ctx.info("Create it: cdp-dev install"),
        StopOutcome::AlreadyStopped | StopOutcome::Stopped => ctx.info("Resume: cdp-dev start"),
    }
    Ok(ExitCode::SUCCESS)
}
