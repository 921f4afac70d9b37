//! Dependency resolver: detect, install, and repair the tools and daemon
//! everything else depends on.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! Per tool: `unknown → {absent, present-outdated, present-ok}`. In
//! self-healing mode, absent and outdated tools are installed through the
//! platform package manager (bootstrapped if missing), the search path is
//! refreshed, and the tool is probed again. A tool that is still
//! unsatisfied after that is fatal: only a new terminal sees the install.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::{
    Bootstrap, Clock, CommandRunner, ContainerDaemon, PackageManager, ProgressReporter,
    ToolLocator,
};
use crate::application::wait::{Probe, WaitOutcome, WaitPolicy, wait_for};
use crate::domain::error::EnvironmentError;
use crate::domain::tool::{
    self, CheckResult, DOCKER, Platform, ProbeOutput, REQUIRED_TOOLS, ToolRequirement, ToolStatus,
};

/// Timeout for a single version probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Daemon readiness polling.
pub const DAEMON_WAIT: WaitPolicy = WaitPolicy {
    interval: Duration::from_secs(5),
    ceiling: Duration::from_secs(120),
    report_every: Some(Duration::from_secs(15)),
};

/// Result of a report-only preflight run.
#[derive(Debug, Clone, Serialize)]
pub struct PreflightReport {
    pub daemon_running: bool,
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.daemon_running && self.checks.iter().all(|c| c.satisfied)
    }
}

/// How a self-healing run ended.
#[derive(Debug)]
pub enum PreflightOutcome {
    /// Every tool is present and new enough; the daemon is answering.
    Ready(Vec<CheckResult>),
    /// An elevated copy of this process took over; stop here.
    Relaunched,
}

enum Remedy {
    Installed,
    Relaunched,
}

/// The collaborators a preflight run needs.
pub struct Resolver<'a, L, R, D, C> {
    pub locator: &'a L,
    pub runner: &'a R,
    pub daemon: &'a D,
    pub clock: &'a C,
    pub platform: Platform,
}

impl<L, R, D, C> Resolver<'_, L, R, D, C>
where
    L: ToolLocator,
    R: CommandRunner,
    D: ContainerDaemon,
    C: Clock,
{
    /// Probe one tool without changing anything.
    pub async fn check_tool(&self, req: &ToolRequirement) -> CheckResult {
        let status = self.probe_status(req).await;
        CheckResult::new(req, status, self.platform)
    }

    /// Report-only run over the daemon and every required tool.
    pub async fn check_all(&self) -> PreflightReport {
        let daemon_running =
            self.locator.locate(DOCKER).is_some() && self.daemon.is_responding().await;
        let mut checks = Vec::with_capacity(REQUIRED_TOOLS.len());
        for req in REQUIRED_TOOLS {
            checks.push(self.check_tool(req).await);
        }
        PreflightReport {
            daemon_running,
            checks,
        }
    }

    /// Make sure the container daemon is installed and answering.
    ///
    /// # Errors
    ///
    /// - `EnvironmentError::DaemonNotInstalled` when the runtime is absent.
    /// - `EnvironmentError::DaemonTimeout` when it does not answer within
    ///   [`DAEMON_WAIT`]'s ceiling after being launched.
    pub async fn ensure_daemon(&self, reporter: &impl ProgressReporter) -> Result<()> {
        if self.locator.locate(DOCKER).is_none() {
            let hint = tool::requirement(DOCKER)
                .map(|r| r.hints.for_platform(self.platform))
                .unwrap_or_default();
            return Err(EnvironmentError::DaemonNotInstalled {
                hint: hint.to_string(),
            }
            .into());
        }
        if self.daemon.is_responding().await {
            tracing::debug!("docker daemon is responding");
            return Ok(());
        }

        reporter.step("Docker daemon is not running, starting it...");
        if let Err(e) = self.daemon.launch().await {
            tracing::warn!(error = %e, "launching docker daemon failed");
            reporter.warn(&format!("could not launch Docker automatically: {e:#}"));
        }

        let daemon = self.daemon;
        let outcome = wait_for(
            self.clock,
            DAEMON_WAIT,
            || async move {
                Ok(if daemon.is_responding().await {
                    Probe::Ready(())
                } else {
                    Probe::Pending(())
                })
            },
            |(), elapsed| {
                reporter.step(&format!(
                    "waiting for Docker daemon... ({}s)",
                    elapsed.as_secs()
                ));
            },
        )
        .await?;

        match outcome {
            WaitOutcome::Ready { elapsed, .. } => {
                tracing::info!(waited_secs = elapsed.as_secs(), "docker daemon ready");
                reporter.success("Docker daemon is running");
                Ok(())
            }
            WaitOutcome::TimedOut { elapsed, .. } => {
                Err(EnvironmentError::DaemonTimeout { waited: elapsed }.into())
            }
        }
    }

    /// Self-healing run: daemon first, then every tool in order.
    ///
    /// # Errors
    ///
    /// Returns an `EnvironmentError` for the first condition that cannot be
    /// repaired, or any failure from the package manager.
    pub async fn ensure_ready(
        &self,
        package_manager: Option<&impl PackageManager>,
        reporter: &impl ProgressReporter,
    ) -> Result<PreflightOutcome> {
        self.ensure_daemon(reporter).await?;

        let mut results = Vec::with_capacity(REQUIRED_TOOLS.len());
        for req in REQUIRED_TOOLS {
            let status = self.probe_status(req).await;
            if status.is_satisfied() {
                results.push(CheckResult::new(req, status, self.platform));
                continue;
            }

            match self.remediate(req, status, package_manager, reporter).await? {
                Remedy::Relaunched => return Ok(PreflightOutcome::Relaunched),
                Remedy::Installed => {}
            }

            let recheck = self.probe_status(req).await;
            if !recheck.is_satisfied() {
                return Err(EnvironmentError::RestartTerminal {
                    tool: req.name.to_string(),
                }
                .into());
            }
            reporter.success(&format!("{} is ready", req.name));
            results.push(CheckResult::new(req, recheck, self.platform));
        }
        Ok(PreflightOutcome::Ready(results))
    }

    async fn remediate(
        &self,
        req: &ToolRequirement,
        status: ToolStatus,
        package_manager: Option<&impl PackageManager>,
        reporter: &impl ProgressReporter,
    ) -> Result<Remedy> {
        let manual = || EnvironmentError::ManualInstallRequired {
            tool: req.name.to_string(),
            hint: req.hints.for_platform(self.platform).to_string(),
        };
        let Some(pm) = package_manager else {
            return Err(manual().into());
        };
        let Some(package) = pm.package_for(&req.packages) else {
            return Err(manual().into());
        };

        if !pm.is_available().await {
            reporter.step(&format!("installing {}...", pm.name()));
            match pm.bootstrap().await? {
                Bootstrap::RelaunchedElevated => return Ok(Remedy::Relaunched),
                Bootstrap::Installed => {
                    self.locator
                        .refresh_search_path()
                        .await
                        .context("refreshing PATH after package manager install")?;
                }
            }
            if !pm.is_available().await {
                return Err(EnvironmentError::RestartTerminal {
                    tool: pm.name().to_string(),
                }
                .into());
            }
        }

        let upgrade = matches!(status, ToolStatus::PresentOutdated { .. });
        let verb = if upgrade { "upgrading" } else { "installing" };
        reporter.step(&format!("{verb} {} via {}...", req.name, pm.name()));
        tracing::info!(tool = req.name, package, upgrade, "remediating tool");
        pm.install(package, upgrade)
            .await
            .with_context(|| format!("{verb} {}", req.name))?;
        self.locator
            .refresh_search_path()
            .await
            .context("refreshing PATH after install")?;
        Ok(Remedy::Installed)
    }

    async fn probe_status(&self, req: &ToolRequirement) -> ToolStatus {
        let exists = self.locator.locate(req.name).is_some();
        if !exists {
            tracing::debug!(tool = req.name, "not found on PATH");
            return ToolStatus::Absent;
        }
        let probe = match req.probe.split_first() {
            Some((program, args)) => {
                match self
                    .runner
                    .run_with_timeout(program, args, PROBE_TIMEOUT)
                    .await
                {
                    Ok(out) if out.status.success() => {
                        let mut text = String::from_utf8_lossy(&out.stdout).into_owned();
                        text.push_str(&String::from_utf8_lossy(&out.stderr));
                        ProbeOutput::Text(text)
                    }
                    Ok(out) => {
                        tracing::debug!(tool = req.name, status = %out.status, "version probe failed");
                        ProbeOutput::Failed
                    }
                    Err(e) => {
                        tracing::debug!(tool = req.name, error = %e, "version probe errored");
                        ProbeOutput::Failed
                    }
                }
            }
            None => ProbeOutput::Failed,
        };
        let status = tool::classify(true, &probe, req.min_version);
        tracing::debug!(tool = req.name, ?status, "classified");
        status
    }
}
