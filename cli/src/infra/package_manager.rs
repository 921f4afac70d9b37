//! Platform package managers: Homebrew on macOS, Chocolatey on Windows.
//!
//! Linux and other platforms get none; remediation there is a manual hint.

use std::io::Write as _;
use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{Bootstrap, CommandRunner, PackageManager};
use crate::domain::error::EnvironmentError;
use crate::domain::tool::{PackageIds, Platform};
use crate::infra::command_runner::LONG_CMD_TIMEOUT;

const HOMEBREW_INSTALL_SCRIPT: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

const CHOCOLATEY_INSTALL: &str = "Set-ExecutionPolicy Bypass -Scope Process -Force; \
    [System.Net.ServicePointManager]::SecurityProtocol = \
    [System.Net.ServicePointManager]::SecurityProtocol -bor 3072; \
    iex ((New-Object System.Net.WebClient).DownloadString('https://community.chocolatey.org/install.ps1'))";

const IS_ADMIN: &str = "([Security.Principal.WindowsPrincipal]\
    [Security.Principal.WindowsIdentity]::GetCurrent()).IsInRole(\
    [Security.Principal.WindowsBuiltInRole]::Administrator)";

/// The package manager for `platform`, if it has one.
pub fn for_platform<R: CommandRunner>(
    platform: Platform,
    runner: R,
) -> Option<SystemPackageManager<R>> {
    match platform {
        Platform::MacOs => Some(SystemPackageManager::Homebrew(Homebrew { runner })),
        Platform::Windows => Some(SystemPackageManager::Chocolatey(Chocolatey { runner })),
        Platform::Linux | Platform::Other => None,
    }
}

/// Whichever manager the host platform uses.
pub enum SystemPackageManager<R: CommandRunner> {
    Homebrew(Homebrew<R>),
    Chocolatey(Chocolatey<R>),
}

impl<R: CommandRunner> PackageManager for SystemPackageManager<R> {
    fn name(&self) -> &'static str {
        match self {
            Self::Homebrew(m) => m.name(),
            Self::Chocolatey(m) => m.name(),
        }
    }

    fn package_for(&self, ids: &PackageIds) -> Option<&'static str> {
        match self {
            Self::Homebrew(m) => m.package_for(ids),
            Self::Chocolatey(m) => m.package_for(ids),
        }
    }

    async fn is_available(&self) -> bool {
        match self {
            Self::Homebrew(m) => m.is_available().await,
            Self::Chocolatey(m) => m.is_available().await,
        }
    }

    async fn bootstrap(&self) -> Result<Bootstrap> {
        match self {
            Self::Homebrew(m) => m.bootstrap().await,
            Self::Chocolatey(m) => m.bootstrap().await,
        }
    }

    async fn install(&self, package: &str, upgrade: bool) -> Result<()> {
        match self {
            Self::Homebrew(m) => m.install(package, upgrade).await,
            Self::Chocolatey(m) => m.install(package, upgrade).await,
        }
    }
}

// ── Homebrew ─────────────────────────────────────────────────────────────────

pub struct Homebrew<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> PackageManager for Homebrew<R> {
    fn name(&self) -> &'static str {
        "Homebrew"
    }

    fn package_for(&self, ids: &PackageIds) -> Option<&'static str> {
        ids.homebrew
    }

    async fn is_available(&self) -> bool {
        succeeded(self.runner.run("brew", &["--version"]).await)
    }

    async fn bootstrap(&self) -> Result<Bootstrap> {
        let script = tokio::task::spawn_blocking(download_homebrew_script)
            .await
            .context("download task panicked")??;
        let path = script
            .path()
            .to_str()
            .context("temp path is not valid UTF-8")?
            .to_string();
        tracing::info!(script = %path, "running Homebrew installer");
        let status = self
            .runner
            .run_status("/usr/bin/env", &["NONINTERACTIVE=1", "/bin/bash", &path])
            .await
            .context("running Homebrew installer")?;
        if !status.success() {
            return Err(EnvironmentError::PackageManagerBootstrap {
                manager: self.name().to_string(),
                detail: format!("installer exited with {status}"),
            }
            .into());
        }
        Ok(Bootstrap::Installed)
    }

    async fn install(&self, package: &str, upgrade: bool) -> Result<()> {
        let verb = if upgrade { "upgrade" } else { "install" };
        let output = self
            .runner
            .run_with_timeout("brew", &[verb, package], LONG_CMD_TIMEOUT)
            .await?;
        check_install(&output, "brew", verb, package)
    }
}

fn download_homebrew_script() -> Result<tempfile::NamedTempFile> {
    let response = ureq::get(HOMEBREW_INSTALL_SCRIPT)
        .set("User-Agent", "cdp-dev")
        .call()
        .map_err(|e| EnvironmentError::PackageManagerBootstrap {
            manager: "Homebrew".to_string(),
            detail: format!("downloading install script: {e}"),
        })?;
    let body = response
        .into_string()
        .context("reading Homebrew install script")?;
    let mut file = tempfile::Builder::new()
        .prefix("homebrew-install")
        .suffix(".sh")
        .tempfile()
        .context("creating temp file for Homebrew installer")?;
    file.write_all(body.as_bytes())
        .context("writing Homebrew installer")?;
    Ok(file)
}

// ── Chocolatey ───────────────────────────────────────────────────────────────

pub struct Chocolatey<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> Chocolatey<R> {
    async fn is_elevated(&self) -> bool {
        self.runner
            .run("powershell", &["-NoProfile", "-Command", IS_ADMIN])
            .await
            .is_ok_and(|o| {
                o.status.success() && String::from_utf8_lossy(&o.stdout).trim() == "True"
            })
    }

    /// Re-run this invocation elevated and wait for it to finish.
    async fn relaunch_elevated(&self) -> Result<Bootstrap> {
        let exe = std::env::current_exe().context("locating current executable")?;
        let args: Vec<String> = std::env::args().skip(1).collect();
        let script = elevation_script(&exe.to_string_lossy(), &args);
        tracing::info!("relaunching elevated");
        let status = self
            .runner
            .run_status("powershell", &["-NoProfile", "-Command", &script])
            .await
            .context("requesting elevation")?;
        if !status.success() {
            return Err(EnvironmentError::ElevationRefused {
                manager: self.name().to_string(),
            }
            .into());
        }
        Ok(Bootstrap::RelaunchedElevated)
    }
}

impl<R: CommandRunner> PackageManager for Chocolatey<R> {
    fn name(&self) -> &'static str {
        "Chocolatey"
    }

    fn package_for(&self, ids: &PackageIds) -> Option<&'static str> {
        ids.chocolatey
    }

    async fn is_available(&self) -> bool {
        succeeded(self.runner.run("choco", &["--version"]).await)
    }

    async fn bootstrap(&self) -> Result<Bootstrap> {
        if !self.is_elevated().await {
            return self.relaunch_elevated().await;
        }
        let output = self
            .runner
            .run_with_timeout(
                "powershell",
                &["-NoProfile", "-Command", CHOCOLATEY_INSTALL],
                LONG_CMD_TIMEOUT,
            )
            .await
            .context("running Chocolatey installer")?;
        if !output.status.success() {
            return Err(EnvironmentError::PackageManagerBootstrap {
                manager: self.name().to_string(),
                detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(Bootstrap::Installed)
    }

    async fn install(&self, package: &str, upgrade: bool) -> Result<()> {
        let verb = if upgrade { "upgrade" } else { "install" };
        let output = self
            .runner
            .run_with_timeout("choco", &[verb, package, "-y"], LONG_CMD_TIMEOUT)
            .await?;
        check_install(&output, "choco", verb, package)
    }
}

/// `Start-Process` call that re-runs `exe args...` elevated and waits.
fn elevation_script(exe: &str, args: &[String]) -> String {
    let mut script = format!("Start-Process -FilePath {} -Verb RunAs -Wait", ps_quote(exe));
    if !args.is_empty() {
        let list: Vec<String> = args.iter().map(|a| ps_quote(a)).collect();
        script.push_str(" -ArgumentList ");
        script.push_str(&list.join(","));
    }
    script
}

/// Single-quote for PowerShell; embedded quotes are doubled.
fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn succeeded(result: Result<Output>) -> bool {
    result.is_ok_and(|o| o.status.success())
}

fn check_install(output: &Output, manager: &str, verb: &str, package: &str) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let detail = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    anyhow::bail!("{manager} {verb} {package} failed:\n{detail}")
}
