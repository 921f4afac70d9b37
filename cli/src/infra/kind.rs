//! Infrastructure implementation of the cluster engine ports.
//!
//! `KindProvisioner<R>` routes `kind` calls (list, create, delete,
//! kubeconfig) and `docker` container calls (inspect, start, stop) for the
//! control plane through a `CommandRunner`.

use std::path::Path;
use std::process::Output;

use anyhow::{Context, Result};

use crate::application::ports::{ClusterInspector, ClusterLifecycle, CommandRunner};
use crate::domain::{CLUSTER_NAME, CONTROL_PLANE_CONTAINER};
use crate::infra::command_runner::LONG_CMD_TIMEOUT;

/// Infrastructure adapter for the local cluster.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct KindProvisioner<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> KindProvisioner<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> ClusterInspector for KindProvisioner<R> {
    async fn list_clusters(&self) -> Result<Output> {
        self.runner.run("kind", &["get", "clusters"]).await
    }

    async fn inspect_control_plane(&self) -> Result<Output> {
        self.runner
            .run(
                "docker",
                &[
                    "inspect",
                    "--format",
                    "{{.State.Running}}",
                    CONTROL_PLANE_CONTAINER,
                ],
            )
            .await
    }
}

impl<R: CommandRunner> ClusterLifecycle for KindProvisioner<R> {
    async fn create(&self, config: &Path) -> Result<Output> {
        let config = config
            .to_str()
            .context("cluster config path is not valid UTF-8")?;
        self.runner
            .run_with_timeout(
                "kind",
                &[
                    "create",
                    "cluster",
                    "--name",
                    CLUSTER_NAME,
                    "--config",
                    config,
                ],
                LONG_CMD_TIMEOUT,
            )
            .await
    }

    async fn resume(&self) -> Result<Output> {
        self.runner
            .run("docker", &["start", CONTROL_PLANE_CONTAINER])
            .await
    }

    async fn pause(&self) -> Result<Output> {
        self.runner
            .run("docker", &["stop", CONTROL_PLANE_CONTAINER])
            .await
    }

    async fn delete(&self) -> Result<Output> {
        self.runner
            .run_with_timeout(
                "kind",
                &["delete", "cluster", "--name", CLUSTER_NAME],
                LONG_CMD_TIMEOUT,
            )
            .await
    }

    async fn export_kubeconfig(&self) -> Result<Output> {
        self.runner
            .run("kind", &["export", "kubeconfig", "--name", CLUSTER_NAME])
            .await
    }
}
