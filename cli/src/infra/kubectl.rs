//! Infrastructure implementation of the `ClusterApi` port via `kubectl`.

use std::process::Output;

use anyhow::Result;

use crate::application::ports::{ClusterApi, CommandRunner};
use crate::domain::pods::POD_COLUMNS;

pub struct KubectlCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> KubectlCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> ClusterApi for KubectlCli<R> {
    async fn get_namespace(&self, namespace: &str) -> Result<Output> {
        self.runner
            .run("kubectl", &["get", "namespace", namespace])
            .await
    }

    async fn create_namespace(&self, namespace: &str) -> Result<Output> {
        self.runner
            .run("kubectl", &["create", "namespace", namespace])
            .await
    }

    async fn get_pods(&self, namespace: Option<&str>) -> Result<Output> {
        let mut args = vec!["get", "pods"];
        match namespace {
            Some(ns) => args.extend(["--namespace", ns]),
            None => args.push("--all-namespaces"),
        }
        args.extend(["--output", POD_COLUMNS, "--no-headers"]);
        self.runner.run("kubectl", &args).await
    }
}
