//! `cdp-dev destroy`: remove the cluster and everything in it.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::cluster::{self, DeleteOutcome};
use crate::application::services::forwards;
use crate::domain::CLUSTER_NAME;
use crate::infra::process::OsProcessTable;

/// Run `cdp-dev destroy`.
///
/// Nothing is touched until the operator confirms.
///
/// # Errors
///
/// Returns an error if the prompt fails or the cluster cannot be deleted.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let ctx = &app.output;
    if !ctx.quiet {
        println!();
        println!("This will permanently remove:");
        println!("  • The '{CLUSTER_NAME}' cluster");
        println!("  • Airflow, its metadata database, and all DAG run history");
        println!();
    }

    if !app.confirm("Continue?")? {
        ctx.info("Cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let reporter = app.reporter();
    let store = app.state_mgr()?;
    forwards::stop_all(&OsProcessTable, &store, &reporter).await?;
    let outcome = cluster::delete(&app.provisioner(), &reporter).await?;
    drop(reporter);

    if outcome == DeleteOutcome::Deleted {
        ctx.info("Create a fresh environment: cdp-dev install");
    }
    Ok(ExitCode::SUCCESS)
}
