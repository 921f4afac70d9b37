//! `cdp-dev start`: resume a stopped cluster and reopen port-forwards.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::{cluster, forwards};
use crate::application::wait::TokioClock;
use crate::commands::{PreflightDeps, print_ready};
use crate::infra::process::OsProcessTable;

/// Run `cdp-dev start`.
///
/// # Errors
///
/// Returns an error if the daemon never becomes ready, the cluster does not
/// exist, or a forward cannot be started.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let clock = TokioClock::new();
    let reporter = app.reporter();

    PreflightDeps::new(app)
        .resolver(app, &clock)
        .ensure_daemon(&reporter)
        .await?;

    let kind = app.provisioner();
    cluster::start(&kind, &reporter).await?;
    cluster::export_kubeconfig(&kind).await?;

    let store = app.state_mgr()?;
    forwards::start_all(&app.runner(), &OsProcessTable, &store, &clock, &reporter).await?;
    drop(reporter);

    print_ready(app).await?;
    Ok(ExitCode::SUCCESS)
}
