//! cdp-dev - disposable local data platform on Kind

use std::process::ExitCode;

use cdp_dev::cli::Cli;
use cdp_dev::output::json;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Overrides the `-v` derived log filter.
const LOG_ENV: &str = "CDP_DEV_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            if json_mode
                && let Ok(doc) = json::format_error(&format!("{e:#}"), json::error_code(&e))
            {
                println!("{doc}");
            }
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
