//! `cdp-dev doctor`: report-only environment check.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::wait::TokioClock;
use crate::commands::PreflightDeps;
use crate::output::json;

/// Run `cdp-dev doctor`.
///
/// Installs nothing and starts nothing. Exits non-zero when any tool is
/// missing or outdated, or the daemon is not answering.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let clock = TokioClock::new();
    let report = PreflightDeps::new(app)
        .resolver(app, &clock)
        .check_all()
        .await;

    if app.is_json() {
        json::print(&report)?;
    } else {
        app.renderer()
            .render_doctor(report.daemon_running, &report.checks);
        if report.all_ok() {
            app.output.success("Everything looks good. Run 'cdp-dev install'.");
        }
    }

    Ok(if report.all_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
