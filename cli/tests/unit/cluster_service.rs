//! Cluster lifecycle idempotency through the public service API.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::process::Output;

use anyhow::Result;
use cdp_dev::application::services::cluster::{
    self, CreateOutcome, DeleteOutcome, StartOutcome, StopOutcome,
};
use cdp_dev::application::{AssetLocator, ClusterInspector, ClusterLifecycle};
use cdp_dev::domain::ClusterState;

use crate::helpers::{Messages, err_output, ok_output};

/// Engine whose container state follows the lifecycle calls made on it.
#[derive(Default)]
struct StatefulEngine {
    exists: Cell<bool>,
    running: Cell<bool>,
    calls: RefCell<Vec<&'static str>>,
}

impl StatefulEngine {
    fn running() -> Self {
        let engine = Self::default();
        engine.exists.set(true);
        engine.running.set(true);
        engine
    }

    fn record(&self, call: &'static str) -> Output {
        self.calls.borrow_mut().push(call);
        ok_output(b"")
    }

    fn count(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| **c == call).count()
    }
}

impl ClusterInspector for StatefulEngine {
    async fn list_clusters(&self) -> Result<Output> {
        Ok(if self.exists.get() {
            ok_output(b"kind\ncdp-local\n")
        } else {
            ok_output(b"No kind clusters found.\n")
        })
    }

    async fn inspect_control_plane(&self) -> Result<Output> {
        if !self.exists.get() {
            return Ok(err_output(1, b"Error: No such object: cdp-local-control-plane"));
        }
        let flag: &[u8] = if self.running.get() { b"true\n" } else { b"false\n" };
        Ok(ok_output(flag))
    }
}

impl ClusterLifecycle for StatefulEngine {
    async fn create(&self, _: &Path) -> Result<Output> {
        self.exists.set(true);
        self.running.set(true);
        Ok(self.record("create"))
    }
    async fn resume(&self) -> Result<Output> {
        self.running.set(true);
        Ok(self.record("resume"))
    }
    async fn pause(&self) -> Result<Output> {
        self.running.set(false);
        Ok(self.record("pause"))
    }
    async fn delete(&self) -> Result<Output> {
        self.exists.set(false);
        self.running.set(false);
        Ok(self.record("delete"))
    }
    async fn export_kubeconfig(&self) -> Result<Output> {
        Ok(self.record("export"))
    }
}

struct Shipped;

impl AssetLocator for Shipped {
    fn helm_asset(&self, relative: &Path) -> Result<PathBuf> {
        Ok(Path::new("/opt/cdp-dev/helm").join(relative))
    }
}

#[tokio::test]
async fn create_twice_invokes_engine_once() {
    let engine = StatefulEngine::default();
    let reporter = Messages::default();
    assert_eq!(
        cluster::create(&engine, &Shipped, &reporter).await.unwrap(),
        CreateOutcome::Created
    );
    assert_eq!(
        cluster::create(&engine, &Shipped, &reporter).await.unwrap(),
        CreateOutcome::AlreadyExists
    );
    assert_eq!(engine.count("create"), 1);
    assert!(reporter.contains("already exists"));
}

#[tokio::test]
async fn stop_then_stop_again_is_a_no_op() {
    let engine = StatefulEngine::running();
    let reporter = Messages::default();
    assert_eq!(
        cluster::stop(&engine, &reporter).await.unwrap(),
        StopOutcome::Stopped
    );
    assert_eq!(
        cluster::stop(&engine, &reporter).await.unwrap(),
        StopOutcome::AlreadyStopped
    );
    assert_eq!(engine.count("pause"), 1);
    assert_eq!(
        cluster::state(&engine).await.unwrap(),
        ClusterState::PresentStopped
    );
}

#[tokio::test]
async fn start_after_stop_resumes() {
    let engine = StatefulEngine::running();
    let reporter = Messages::default();
    cluster::stop(&engine, &reporter).await.unwrap();
    assert_eq!(
        cluster::start(&engine, &reporter).await.unwrap(),
        StartOutcome::Started
    );
    assert_eq!(
        cluster::start(&engine, &reporter).await.unwrap(),
        StartOutcome::AlreadyRunning
    );
    assert_eq!(engine.count("resume"), 1);
}

#[tokio::test]
async fn start_without_cluster_points_at_install() {
    let engine = StatefulEngine::default();
    let err = cluster::start(&engine, &Messages::default())
        .await
        .expect_err("absent cluster");
    assert!(err.to_string().contains("cdp-dev install"), "{err}");
    assert!(engine.calls.borrow().is_empty());
}

#[tokio::test]
async fn delete_without_cluster_never_calls_delete() {
    let engine = StatefulEngine::default();
    assert_eq!(
        cluster::delete(&engine, &Messages::default()).await.unwrap(),
        DeleteOutcome::Absent
    );
    assert_eq!(engine.count("delete"), 0);
}

#[tokio::test]
async fn delete_removes_existing_cluster() {
    let engine = StatefulEngine::running();
    assert_eq!(
        cluster::delete(&engine, &Messages::default()).await.unwrap(),
        DeleteOutcome::Deleted
    );
    assert_eq!(
        cluster::state(&engine).await.unwrap(),
        ClusterState::Absent
    );
}
