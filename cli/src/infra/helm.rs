//! Infrastructure implementation of the `ReleaseDeployer` port via `helm`.

use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ReleaseDeployer, ReleaseSpec};
use crate::infra::command_runner::LONG_CMD_TIMEOUT;

pub struct HelmCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> HelmCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> ReleaseDeployer for HelmCli<R> {
    async fn add_repo(&self, name: &str, url: &str) -> Result<Output> {
        self.runner
            .run("helm", &["repo", "add", name, url, "--force-update"])
            .await
    }

    async fn update_repos(&self) -> Result<Output> {
        self.runner.run("helm", &["repo", "update"]).await
    }

    async fn upgrade_install(&self, spec: &ReleaseSpec<'_>) -> Result<Output> {
        let values = spec
            .values
            .to_str()
            .context("values file path is not valid UTF-8")?;
        self.runner
            .run_with_timeout(
                "helm",
                &[
                    "upgrade",
                    "--install",
                    spec.release,
                    spec.chart,
                    "--namespace",
                    spec.namespace,
                    "--values",
                    values,
                    "--timeout",
                    spec.timeout,
                ],
                LONG_CMD_TIMEOUT,
            )
            .await
    }
}
