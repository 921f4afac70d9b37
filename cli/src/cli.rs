//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Local data platform: a disposable Kind cluster running Apache Airflow
#[derive(Parser)]
#[command(
    name = "cdp-dev",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Output in JSON format (status, doctor)
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check tools, create the cluster, deploy Airflow, open port-forwards
    Install(commands::install::InstallArgs),

    /// Start the stopped cluster and reopen port-forwards
    Start,

    /// Close port-forwards and stop the cluster (data is kept)
    Stop,

    /// Show cluster, pod, and port-forward status
    Status,

    /// Stream logs from an Airflow component
    Logs(commands::logs::LogsArgs),

    /// Delete the cluster and all its data
    Destroy,

    /// Check required tools and the Docker daemon without changing anything
    Doctor,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            yes,
            verbose: _,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            no_color,
            quiet,
            json,
            yes,
        })?;

        match command {
            Command::Install(args) => commands::install::run(&args, &app).await,
            Command::Start => commands::start::run(&app).await,
            Command::Stop => commands::stop::run(&app).await,
            Command::Status => commands::status::run(&app).await,
            Command::Logs(args) => commands::logs::run(&args, &app).await,
            Command::Destroy => commands::destroy::run(&app).await,
            Command::Doctor => commands::doctor::run(&app).await,
        }
    }
}
