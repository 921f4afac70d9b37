//! `cdp-dev logs`: stream pod logs for one of the deployed services.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use clap::builder::PossibleValuesParser;

use crate::app::AppContext;
use crate::application::ports::CommandRunner;
use crate::domain::logs::{LOG_TARGETS, log_target};

/// Arguments for the logs command.
#[derive(Args)]
pub struct LogsArgs {
    /// Service to show logs for
    #[arg(
        default_value = "airflow",
        ignore_case = true,
        value_parser = PossibleValuesParser::new(LOG_TARGETS.iter().map(|t| t.service))
    )]
    pub service: String,

    /// Number of recent lines to show per container
    #[arg(short = 'n', long, default_value_t = 50)]
    pub lines: u32,

    /// Print recent lines and exit instead of streaming
    #[arg(long)]
    pub no_follow: bool,
}

/// Run `cdp-dev logs`.
///
/// Ctrl+C ends the stream and exits successfully.
///
/// # Errors
///
/// Returns an error if the service is unknown or `kubectl` cannot be run.
pub async fn run(args: &LogsArgs, app: &AppContext) -> Result<ExitCode> {
    let target = log_target(&args.service).with_context(|| {
        let known: Vec<&str> = LOG_TARGETS.iter().map(|t| t.service).collect();
        format!(
            "unknown service '{}'; expected one of: {}",
            args.service,
            known.join(", ")
        )
    })?;
    let kubectl_args = target.kubectl_args(args.lines, !args.no_follow);
    let kubectl_args: Vec<&str> = kubectl_args.iter().map(String::as_str).collect();
    tracing::info!(service = target.service, selector = target.selector, "streaming logs");

    let runner = app.runner();
    tokio::select! {
        status = runner.run_status("kubectl", &kubectl_args) => {
            let status = status.context("running kubectl logs")?;
            if status.success() {
                Ok(ExitCode::SUCCESS)
            } else {
                anyhow::bail!(
                    "kubectl logs exited with {status}; is the cluster running? Check with 'cdp-dev status'"
                )
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!("log stream interrupted");
            Ok(ExitCode::SUCCESS)
        }
    }
}
