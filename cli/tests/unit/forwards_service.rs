//! Port-forward supervisor against a real on-disk record.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::Result;
use cdp_dev::application::services::forwards::{self, ForwardStart};
use cdp_dev::application::{CommandRunner, ForwardRecordStore, ProcessTable};
use cdp_dev::domain::FORWARDS;
use cdp_dev::infra::state::StateManager;

use crate::helpers::{FakeClock, Messages, exit_status, ok_output};

/// Hands out increasing PIDs and marks them alive in the shared table.
struct Spawner<'a> {
    table: &'a Table,
    next_pid: Cell<u32>,
    spawned: RefCell<Vec<String>>,
}

impl<'a> Spawner<'a> {
    fn new(table: &'a Table) -> Self {
        Self {
            table,
            next_pid: Cell::new(7000),
            spawned: RefCell::new(Vec::new()),
        }
    }
}

impl CommandRunner for Spawner<'_> {
    async fn run(&self, _: &str, _: &[&str]) -> Result<Output> {
        Ok(ok_output(b""))
    }
    async fn run_with_timeout(&self, _: &str, _: &[&str], _: Duration) -> Result<Output> {
        Ok(ok_output(b""))
    }
    async fn run_status(&self, _: &str, _: &[&str]) -> Result<ExitStatus> {
        Ok(exit_status(0))
    }
    fn spawn_detached(&self, program: &str, args: &[&str]) -> Result<u32> {
        let pid = self.next_pid.get();
        self.next_pid.set(pid + 1);
        self.spawned
            .borrow_mut()
            .push(format!("{program} {}", args.join(" ")));
        self.table.alive.borrow_mut().insert(pid);
        Ok(pid)
    }
}

#[derive(Default)]
struct Table {
    alive: RefCell<HashSet<u32>>,
    /// PIDs whose termination signal fails.
    stubborn: RefCell<HashSet<u32>>,
    terminated: RefCell<Vec<u32>>,
}

impl ProcessTable for Table {
    fn is_alive(&self, pid: u32) -> bool {
        self.alive.borrow().contains(&pid)
    }
    fn terminate(&self, pid: u32) -> Result<()> {
        if self.stubborn.borrow().contains(&pid) {
            anyhow::bail!("operation not permitted");
        }
        self.alive.borrow_mut().remove(&pid);
        self.terminated.borrow_mut().push(pid);
        Ok(())
    }
}

fn store(dir: &tempfile::TempDir) -> StateManager {
    StateManager::with_path(dir.path().join("port-forwards.json"))
}

#[tokio::test]
async fn second_start_reuses_live_forward() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let table = Table::default();
    let runner = Spawner::new(&table);
    let clock = FakeClock::default();
    let reporter = Messages::default();

    let first = forwards::start_all(&runner, &table, &store, &clock, &reporter)
        .await
        .unwrap();
    assert_eq!(first[0].1, ForwardStart::Started { pid: 7000 });

    let second = forwards::start_all(&runner, &table, &store, &clock, &reporter)
        .await
        .unwrap();
    assert_eq!(second[0].1, ForwardStart::AlreadyRunning { pid: 7000 });
    assert_eq!(runner.spawned.borrow().len(), FORWARDS.len());
    assert_eq!(
        runner.spawned.borrow()[0],
        "kubectl port-forward svc/airflow-webserver 8080:8080 -n airflow"
    );
}

#[tokio::test]
async fn stale_pid_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let table = Table::default();
    let runner = Spawner::new(&table);
    let clock = FakeClock::default();

    forwards::start_all(&runner, &table, &store, &clock, &Messages::default())
        .await
        .unwrap();
    // the forward died between invocations
    table.alive.borrow_mut().clear();

    let again = forwards::start_all(&runner, &table, &store, &clock, &Messages::default())
        .await
        .unwrap();
    assert_eq!(again[0].1, ForwardStart::Started { pid: 7001 });
    let record = store.load_async().await.unwrap();
    assert_eq!(record.get(FORWARDS[0].name), Some(7001));
}

#[tokio::test]
async fn stop_isolates_signal_failures_and_clears_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let table = Table::default();
    let runner = Spawner::new(&table);
    forwards::start_all(&runner, &table, &store, &FakeClock::default(), &Messages::default())
        .await
        .unwrap();
    table.stubborn.borrow_mut().insert(7000);

    let reporter = Messages::default();
    let stopped = forwards::stop_all(&table, &store, &reporter).await.unwrap();

    assert_eq!(stopped, 0);
    assert!(reporter.contains("could not stop"));
    assert!(store.load_async().await.unwrap().is_empty());
}

#[tokio::test]
async fn status_does_not_touch_the_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let table = Table::default();
    let runner = Spawner::new(&table);
    forwards::start_all(&runner, &table, &store, &FakeClock::default(), &Messages::default())
        .await
        .unwrap();
    table.alive.borrow_mut().clear();

    let statuses = forwards::status(&table, &store).await.unwrap();
    assert!(!statuses[0].active);
    assert_eq!(statuses[0].pid, Some(7000));
    assert_eq!(
        store.load_async().await.unwrap().get(FORWARDS[0].name),
        Some(7000)
    );
}

#[tokio::test]
async fn status_without_record_file_reports_everything_down() {
    let dir = tempfile::tempdir().unwrap();
    let statuses = forwards::status(&Table::default(), &store(&dir))
        .await
        .unwrap();
    assert_eq!(statuses.len(), FORWARDS.len());
    assert!(statuses.iter().all(|s| !s.active && s.pid.is_none()));
}
