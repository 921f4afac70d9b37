//! `cdp-dev install`: provision the cluster, deploy Airflow, open forwards.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::{AssetLocator, ProgressReporter, ReleaseSpec};
use crate::application::services::preflight::PreflightOutcome;
use crate::application::services::{cluster, forwards, release};
use crate::application::wait::TokioClock;
use crate::commands::{PreflightDeps, print_ready};
use crate::domain::release::{CHART, RELEASE_NAME, RELEASE_NAMESPACE, VALUES_FILE};
use crate::infra::assets::HelmAssets;
use crate::infra::process::OsProcessTable;
use crate::infra::values::YamlValuesStore;

/// Arguments for the install command.
#[derive(Args, Default)]
pub struct InstallArgs {
    /// Skip tool and daemon checks (assume the host is ready)
    #[arg(long)]
    pub skip_preflight: bool,
}

/// Run `cdp-dev install`.
///
/// # Errors
///
/// Returns an error from the first step that fails: preflight, cluster
/// creation, release install, readiness wait, or forward startup.
pub async fn run(args: &InstallArgs, app: &AppContext) -> Result<ExitCode> {
    let clock = TokioClock::new();
    let reporter = app.reporter();

    if args.skip_preflight {
        app.output.warn("Skipping preflight checks.");
    } else {
        let deps = PreflightDeps::new(app);
        let outcome = deps
            .resolver(app, &clock)
            .ensure_ready(app.package_manager().as_ref(), &reporter)
            .await?;
        if let PreflightOutcome::Relaunched = outcome {
            app.output
                .info("Setup continues in the elevated window. Re-run 'cdp-dev install' there if it closes.");
            return Ok(ExitCode::SUCCESS);
        }
        reporter.success("all required tools are present");
    }

    let kind = app.provisioner();
    let assets = HelmAssets::discover();
    cluster::create(&kind, &assets, &reporter).await?;
    cluster::export_kubeconfig(&kind).await?;

    install_release(app, &assets, &clock, &reporter).await?;

    let store = app.state_mgr()?;
    forwards::start_all(&app.runner(), &OsProcessTable, &store, &clock, &reporter).await?;
    drop(reporter);

    print_ready(app).await?;
    Ok(ExitCode::SUCCESS)
}

async fn install_release(
    app: &AppContext,
    assets: &impl AssetLocator,
    clock: &TokioClock,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    let helm = app.helm();
    let kubectl = app.kubectl();
    let values = values_path(app.config.values_file.as_deref(), assets)?;

    release::add_repos(&helm, reporter).await?;
    release::repair_values_file(&YamlValuesStore, &values, reporter)?;
    if release::ensure_namespace(&kubectl, RELEASE_NAMESPACE).await? {
        reporter.success(&format!("namespace '{RELEASE_NAMESPACE}' created"));
    }
    release::upgrade_install(
        &helm,
        &ReleaseSpec {
            release: RELEASE_NAME,
            chart: CHART,
            namespace: RELEASE_NAMESPACE,
            values: &values,
            timeout: &app.config.helm_timeout,
        },
        reporter,
    )
    .await?;
    release::wait_ready(
        &kubectl,
        clock,
        RELEASE_NAMESPACE,
        release::readiness_policy(app.config.readiness_timeout()),
        reporter,
    )
    .await?;
    Ok(())
}

/// The configured values file, else the one shipped with the tool.
fn values_path(configured: Option<&Path>, assets: &impl AssetLocator) -> Result<PathBuf> {
    match configured {
        Some(path) => Ok(path.to_path_buf()),
        None => assets.helm_asset(&Path::new("values").join(VALUES_FILE)),
    }
}
