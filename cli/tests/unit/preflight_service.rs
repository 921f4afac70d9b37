//! Dependency resolver behaviour through the public `Resolver` API.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::Cell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;
use cdp_dev::application::services::preflight::{PreflightOutcome, Resolver};
use cdp_dev::application::{
    Bootstrap, Clock, CommandRunner, ContainerDaemon, PackageManager, ToolLocator,
};
use cdp_dev::domain::tool::PackageIds;
use cdp_dev::domain::{EnvironmentError, Platform};

use crate::helpers::{FakeClock, Messages, err_output, exit_status, ok_output};

/// Tools on the fake PATH, keyed by name, with their probe output.
struct Host {
    tools: HashMap<&'static str, &'static str>,
}

impl Host {
    fn with(tools: &[(&'static str, &'static str)]) -> Self {
        Self {
            tools: tools.iter().copied().collect(),
        }
    }

    fn all_current() -> Self {
        Self::with(&[
            ("docker", "24.0.7"),
            ("kubectl", "clientVersion:\n  gitVersion: v1.29.2\n"),
            ("helm", "v3.14.4+g81c902a"),
            ("kind", "kind v0.23.0 go1.21.10 linux/amd64"),
        ])
    }
}

impl ToolLocator for Host {
    fn locate(&self, name: &str) -> Option<PathBuf> {
        self.tools
            .contains_key(name)
            .then(|| PathBuf::from("/usr/local/bin").join(name))
    }
    async fn refresh_search_path(&self) -> Result<()> {
        Ok(())
    }
}

impl CommandRunner for Host {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.run_with_timeout(program, args, Duration::from_secs(1))
            .await
    }
    async fn run_with_timeout(&self, program: &str, _: &[&str], _: Duration) -> Result<Output> {
        Ok(match self.tools.get(program) {
            Some(text) => ok_output(text.as_bytes()),
            None => err_output(127, b"command not found"),
        })
    }
    async fn run_status(&self, _: &str, _: &[&str]) -> Result<ExitStatus> {
        Ok(exit_status(0))
    }
    fn spawn_detached(&self, _: &str, _: &[&str]) -> Result<u32> {
        Ok(1)
    }
}

struct Daemon {
    up: Cell<bool>,
    /// Probes answered "down" after a launch before coming up.
    boot_probes: Cell<u32>,
    launched: Cell<bool>,
}

impl Daemon {
    fn up() -> Self {
        Self {
            up: Cell::new(true),
            boot_probes: Cell::new(0),
            launched: Cell::new(false),
        }
    }

    fn down(boot_probes: u32) -> Self {
        Self {
            up: Cell::new(false),
            boot_probes: Cell::new(boot_probes),
            launched: Cell::new(false),
        }
    }
}

impl ContainerDaemon for Daemon {
    async fn is_responding(&self) -> bool {
        if self.up.get() {
            return true;
        }
        if self.launched.get() {
            let left = self.boot_probes.get();
            if left == 0 {
                self.up.set(true);
                return true;
            }
            self.boot_probes.set(left - 1);
        }
        false
    }
    async fn launch(&self) -> Result<()> {
        self.launched.set(true);
        Ok(())
    }
}

/// Never used; fixes the type of an absent package manager.
struct NoManager;

impl PackageManager for NoManager {
    fn name(&self) -> &'static str {
        "none"
    }
    fn package_for(&self, _: &PackageIds) -> Option<&'static str> {
        None
    }
    async fn is_available(&self) -> bool {
        false
    }
    async fn bootstrap(&self) -> Result<Bootstrap> {
        anyhow::bail!("unreachable")
    }
    async fn install(&self, _: &str, _: bool) -> Result<()> {
        anyhow::bail!("unreachable")
    }
}

fn resolver<'a>(
    host: &'a Host,
    daemon: &'a Daemon,
    clock: &'a FakeClock,
    platform: Platform,
) -> Resolver<'a, Host, Host, Daemon, FakeClock> {
    Resolver {
        locator: host,
        runner: host,
        daemon,
        clock,
        platform,
    }
}

#[tokio::test]
async fn current_tools_are_ready_without_a_package_manager() {
    let host = Host::all_current();
    let daemon = Daemon::up();
    let clock = FakeClock::default();
    let outcome = resolver(&host, &daemon, &clock, Platform::Linux)
        .ensure_ready(None::<&NoManager>, &Messages::default())
        .await
        .unwrap();
    let PreflightOutcome::Ready(checks) = outcome else {
        panic!("expected ready");
    };
    assert_eq!(checks.len(), 4);
    assert!(checks.iter().all(|c| c.satisfied));
}

#[tokio::test]
async fn unparsable_version_fails_open() {
    let mut host = Host::all_current();
    host.tools.insert("kind", "development build");
    let daemon = Daemon::up();
    let clock = FakeClock::default();
    let report = resolver(&host, &daemon, &clock, Platform::Linux)
        .check_all()
        .await;
    let kind = report.checks.iter().find(|c| c.tool == "kind").unwrap();
    assert!(kind.satisfied);
    assert_eq!(kind.version, "unknown");
    assert!(report.all_ok());
}

#[tokio::test]
async fn missing_tool_on_linux_asks_for_manual_install() {
    let host = Host::with(&[
        ("docker", "24.0.7"),
        ("kubectl", "v1.29.2"),
        ("helm", "v3.14.4"),
    ]);
    let daemon = Daemon::up();
    let clock = FakeClock::default();
    let err = resolver(&host, &daemon, &clock, Platform::Linux)
        .ensure_ready(None::<&NoManager>, &Messages::default())
        .await
        .expect_err("kind is missing");
    let env = err.downcast_ref::<EnvironmentError>().expect("environment error");
    assert!(matches!(env, EnvironmentError::ManualInstallRequired { tool, .. } if tool == "kind"));
    assert!(err.to_string().contains("kind.sigs.k8s.io"), "{err}");
}

#[tokio::test]
async fn stopped_daemon_is_launched_and_awaited() {
    let host = Host::all_current();
    let daemon = Daemon::down(2);
    let clock = FakeClock::default();
    let reporter = Messages::default();
    resolver(&host, &daemon, &clock, Platform::MacOs)
        .ensure_daemon(&reporter)
        .await
        .unwrap();
    assert!(daemon.launched.get());
    assert_eq!(clock.now(), Duration::from_secs(10));
    assert!(reporter.contains("Docker daemon is running"));
}

#[tokio::test]
async fn daemon_that_never_answers_times_out_at_two_minutes() {
    let host = Host::all_current();
    let daemon = Daemon::down(u32::MAX);
    let clock = FakeClock::default();
    let err = resolver(&host, &daemon, &clock, Platform::Linux)
        .ensure_daemon(&Messages::default())
        .await
        .expect_err("timeout");
    assert!(matches!(
        err.downcast_ref::<EnvironmentError>(),
        Some(EnvironmentError::DaemonTimeout { .. })
    ));
    assert_eq!(clock.now(), Duration::from_secs(120));
}

#[tokio::test]
async fn doctor_report_never_launches_the_daemon() {
    let host = Host::all_current();
    let daemon = Daemon::down(0);
    let clock = FakeClock::default();
    let report = resolver(&host, &daemon, &clock, Platform::Windows)
        .check_all()
        .await;
    assert!(!report.daemon_running);
    assert!(!report.all_ok());
    assert!(!daemon.launched.get());
}
