//! Infrastructure implementation of the `ContainerDaemon` port for Docker.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ContainerDaemon};
use crate::domain::tool::Platform;

/// `docker info` can hang while the daemon is starting.
const INFO_TIMEOUT: Duration = Duration::from_secs(15);

const DOCKER_DESKTOP_EXE: &str = r"C:\Program Files\Docker\Docker\Docker Desktop.exe";

pub struct DockerDaemon<R: CommandRunner> {
    runner: R,
    platform: Platform,
}

impl<R: CommandRunner> DockerDaemon<R> {
    pub fn new(runner: R, platform: Platform) -> Self {
        Self { runner, platform }
    }
}

impl<R: CommandRunner> ContainerDaemon for DockerDaemon<R> {
    async fn is_responding(&self) -> bool {
        self.runner
            .run_with_timeout("docker", &["info"], INFO_TIMEOUT)
            .await
            .is_ok_and(|o| o.status.success())
    }

    async fn launch(&self) -> Result<()> {
        tracing::info!(platform = ?self.platform, "launching docker daemon");
        let (program, args): (&str, &[&str]) = match self.platform {
            Platform::Windows => {
                self.runner
                    .spawn_detached(DOCKER_DESKTOP_EXE, &[])
                    .context("starting Docker Desktop")?;
                return Ok(());
            }
            Platform::MacOs => ("open", &["-a", "Docker"]),
            Platform::Linux | Platform::Other => ("systemctl", &["start", "docker"]),
        };
        let output = self
            .runner
            .run(program, args)
            .await
            .with_context(|| format!("running {program}"))?;
        anyhow::ensure!(
            output.status.success(),
            "{program} {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
        Ok(())
    }
}
