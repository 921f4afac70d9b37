//! Release installer: repair values, ensure the namespace, install or
//! upgrade the chart, then wait for pods to become ready.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;
use std::process::Output;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{
    Clock, ClusterApi, ProgressReporter, ReleaseDeployer, ReleaseSpec, ValuesStore,
};
use crate::application::wait::{Probe, WaitOutcome, WaitPolicy, wait_for};
use crate::domain::error::ReleaseError;
use crate::domain::pods::{self, PodStatus, Readiness};
use crate::domain::release::CHART_REPOS;
use crate::domain::values::{self, Repair};

/// Delay between pod queries.
pub const READINESS_INTERVAL: Duration = Duration::from_secs(10);

/// Cadence of the readiness status line.
pub const READINESS_REPORT_EVERY: Duration = Duration::from_secs(30);

/// Readiness polling policy with the given ceiling.
#[must_use]
pub fn readiness_policy(ceiling: Duration) -> WaitPolicy {
    WaitPolicy {
        interval: READINESS_INTERVAL,
        ceiling,
        report_every: Some(READINESS_REPORT_EVERY),
    }
}

/// Register every chart repository and refresh the index.
///
/// # Errors
///
/// Returns an error if any repository command fails.
pub async fn add_repos(
    deployer: &impl ReleaseDeployer,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step("adding chart repositories...");
    for (name, url) in CHART_REPOS {
        let output = deployer
            .add_repo(name, url)
            .await
            .with_context(|| format!("adding chart repository {name}"))?;
        anyhow::ensure!(
            output.status.success(),
            "failed to add chart repository {name} ({url}):\n{}",
            detail(&output)
        );
    }
    let output = deployer
        .update_repos()
        .await
        .context("updating chart repositories")?;
    anyhow::ensure!(
        output.status.success(),
        "failed to update chart repositories:\n{}",
        detail(&output)
    );
    reporter.success("chart repositories up to date");
    Ok(())
}

/// Apply the declarative repairs to the values document on disk.
///
/// The file is rewritten only when something changed.
///
/// # Errors
///
/// Returns an error if the document cannot be read or written.
pub fn repair_values_file(
    store: &impl ValuesStore,
    path: &Path,
    reporter: &impl ProgressReporter,
) -> Result<Vec<Repair>> {
    let mut doc = store.load(path)?;
    let repairs = values::repair_values(&mut doc, values::generate_fernet_key);
    if repairs.is_empty() {
        tracing::debug!(path = %path.display(), "values document needs no repair");
        return Ok(repairs);
    }
    for repair in &repairs {
        tracing::info!(path = %path.display(), repair = %repair.describe(), "repairing values");
        reporter.warn(&format!("repaired {}", repair.describe()));
    }
    store
        .save(path, &doc)
        .with_context(|| format!("writing repaired values to {}", path.display()))?;
    Ok(repairs)
}

/// Create `namespace` unless it exists. Returns whether it was created.
///
/// # Errors
///
/// Returns `ReleaseError::Namespace` if creation fails.
pub async fn ensure_namespace(api: &impl ClusterApi, namespace: &str) -> Result<bool> {
    let existing = api
        .get_namespace(namespace)
        .await
        .with_context(|| format!("querying namespace {namespace}"))?;
    if existing.status.success() {
        tracing::debug!(namespace, "namespace exists");
        return Ok(false);
    }
    let output = api
        .create_namespace(namespace)
        .await
        .with_context(|| format!("creating namespace {namespace}"))?;
    if !output.status.success() {
        let detail = detail(&output);
        // lost a race with another creator
        if detail.contains("AlreadyExists") {
            return Ok(false);
        }
        return Err(ReleaseError::Namespace {
            namespace: namespace.to_string(),
            detail,
        }
        .into());
    }
    tracing::info!(namespace, "namespace created");
    Ok(true)
}

/// Issue the install-or-upgrade.
///
/// # Errors
///
/// Returns `ReleaseError::InstallFailed` carrying the deployer's output.
pub async fn upgrade_install(
    deployer: &impl ReleaseDeployer,
    spec: &ReleaseSpec<'_>,
    reporter: &impl ProgressReporter,
) -> Result<()> {
    reporter.step(&format!(
        "installing {} into namespace '{}' (this can take several minutes)...",
        spec.chart, spec.namespace
    ));
    tracing::info!(release = spec.release, chart = spec.chart, namespace = spec.namespace, "helm upgrade --install");
    let output = deployer
        .upgrade_install(spec)
        .await
        .with_context(|| format!("installing release {}", spec.release))?;
    if !output.status.success() {
        return Err(ReleaseError::InstallFailed {
            release: spec.release.to_string(),
            detail: detail(&output),
            command: format!(
                "helm upgrade --install {} {} --namespace {} --values {} --debug",
                spec.release,
                spec.chart,
                spec.namespace,
                spec.values.display()
            ),
        }
        .into());
    }
    reporter.success(&format!("release '{}' installed", spec.release));
    Ok(())
}

/// Poll pod readiness in `namespace` until all pods are ready or the
/// policy's ceiling passes.
///
/// Query failures and unparsable tables count as "not ready yet".
///
/// # Errors
///
/// Returns `ReleaseError::ReadinessTimeout` on timeout.
pub async fn wait_ready(
    api: &impl ClusterApi,
    clock: &impl Clock,
    namespace: &str,
    policy: WaitPolicy,
    reporter: &impl ProgressReporter,
) -> Result<Readiness> {
    let outcome = wait_for(
        clock,
        policy,
        || async move {
            let readiness = query_readiness(api, namespace).await;
            Ok(match readiness {
                Some(r) if r.all_ready() => Probe::Ready(r),
                other => Probe::Pending(other),
            })
        },
        |last: &Option<Readiness>, elapsed| {
            let summary = last.map_or_else(|| "waiting for pods".to_string(), |r| r.to_string());
            reporter.step(&format!("{summary} ({}s elapsed)", elapsed.as_secs()));
        },
    )
    .await?;

    match outcome {
        WaitOutcome::Ready { value, elapsed } => {
            tracing::info!(namespace, waited_secs = elapsed.as_secs(), "all pods ready");
            reporter.success(&format!("{value}"));
            Ok(value)
        }
        WaitOutcome::TimedOut { last, elapsed } => Err(ReleaseError::ReadinessTimeout {
            namespace: namespace.to_string(),
            waited: elapsed,
            summary: last.map_or_else(|| "no pods reported".to_string(), |r| r.to_string()),
        }
        .into()),
    }
}

/// Pod table for `namespace`, or across all namespaces when `None`.
///
/// # Errors
///
/// Returns an error if the query fails or prints an unparsable table.
pub async fn list_pods(api: &impl ClusterApi, namespace: Option<&str>) -> Result<Vec<PodStatus>> {
    let output = api.get_pods(namespace).await.context("querying pods")?;
    anyhow::ensure!(
        output.status.success(),
        "kubectl get pods failed:\n{}",
        detail(&output)
    );
    Ok(pods::parse_pod_table(&String::from_utf8_lossy(
        &output.stdout,
    ))?)
}

async fn query_readiness(api: &impl ClusterApi, namespace: &str) -> Option<Readiness> {
    let output = match api.get_pods(Some(namespace)).await {
        Ok(o) if o.status.success() => o,
        Ok(o) => {
            tracing::debug!(namespace, detail = %detail(&o), "pod query failed");
            return None;
        }
        Err(e) => {
            tracing::debug!(namespace, error = %e, "pod query errored");
            return None;
        }
    };
    match pods::parse_pod_table(&String::from_utf8_lossy(&output.stdout)) {
        Ok(pods) => Some(Readiness::of(&pods)),
        Err(e) => {
            tracing::warn!(namespace, error = %e, "unparsable pod table");
            None
        }
    }
}

fn detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    match (stdout.trim(), stderr.trim()) {
        ("", err) => err.to_string(),
        (out, "") => out.to_string(),
        (out, err) => format!("{out}\n{err}"),
    }
}
