//! Port-forward supervisor.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//!
//! Forward processes outlive the CLI. The persisted [`ForwardRecord`] is
//! the only link between invocations; liveness is always re-probed through
//! the process table before a recorded PID is trusted.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{
    Clock, CommandRunner, ForwardRecordStore, ProcessTable, ProgressReporter,
};
use crate::domain::forward::{FORWARDS, ForwardRecord, ForwardSpec, ForwardStatus};

/// Time allowed for a freshly spawned forward to bind its port.
pub const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// What `start_all` did for one forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardStart {
    Started { pid: u32 },
    AlreadyRunning { pid: u32 },
}

/// Start every configured forward that is not already live.
///
/// # Errors
///
/// Returns an error if the record cannot be read or written, or a forward
/// process cannot be spawned. PIDs spawned before the failure are still
/// persisted.
pub async fn start_all(
    runner: &impl CommandRunner,
    table: &impl ProcessTable,
    store: &impl ForwardRecordStore,
    clock: &impl Clock,
    reporter: &impl ProgressReporter,
) -> Result<Vec<(ForwardSpec, ForwardStart)>> {
    let mut record = store.load_async().await?;
    let mut results = Vec::with_capacity(FORWARDS.len());
    let mut spawned = Vec::new();

    for spec in FORWARDS {
        if let Some(pid) = record.get(spec.name)
            && table.is_alive(pid)
        {
            tracing::debug!(forward = spec.name, pid, "forward already running");
            reporter.success(&format!("{} already forwarded at {}", spec.name, spec.url));
            results.push((*spec, ForwardStart::AlreadyRunning { pid }));
            continue;
        }

        let args = spec.kubectl_args();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let pid = match runner.spawn_detached("kubectl", &args) {
            Ok(pid) => pid,
            Err(e) => {
                store.save_async(&record).await?;
                return Err(e).with_context(|| format!("starting port-forward for {}", spec.name));
            }
        };
        tracing::info!(forward = spec.name, pid, local_port = spec.local_port, "port-forward spawned");
        record.insert(spec.name, pid);
        spawned.push((*spec, pid));
        results.push((*spec, ForwardStart::Started { pid }));
    }

    if !spawned.is_empty() {
        clock.sleep(SETTLE_DELAY).await;
        for (spec, pid) in &spawned {
            if table.is_alive(*pid) {
                reporter.success(&format!("{} → {}", spec.name, spec.url));
            } else {
                tracing::warn!(forward = spec.name, pid, "port-forward exited during settle");
                reporter.warn(&format!(
                    "port-forward for {} exited immediately; is port {} already in use?",
                    spec.name, spec.local_port
                ));
            }
        }
    }

    store.save_async(&record).await?;
    Ok(results)
}

/// Terminate every recorded forward that is still live, then clear the record.
///
/// A failure to signal one process does not stop the others or the clear.
/// Returns how many processes were signalled.
///
/// # Errors
///
/// Returns an error if the record cannot be read or cleared.
pub async fn stop_all(
    table: &impl ProcessTable,
    store: &impl ForwardRecordStore,
    reporter: &impl ProgressReporter,
) -> Result<usize> {
    let record = store.load_async().await?;
    let mut stopped = 0;
    for (name, pid) in record.iter() {
        if !table.is_alive(pid) {
            tracing::debug!(forward = name, pid, "recorded forward already gone");
            continue;
        }
        match table.terminate(pid) {
            Ok(()) => {
                tracing::info!(forward = name, pid, "port-forward terminated");
                stopped += 1;
            }
            Err(e) => {
                tracing::warn!(forward = name, pid, error = %e, "could not terminate port-forward");
                reporter.warn(&format!("could not stop {name} (pid {pid}): {e:#}"));
            }
        }
    }
    store
        .save_async(&ForwardRecord::default())
        .await
        .context("clearing forward record")?;
    if stopped > 0 {
        reporter.success(&format!("stopped {stopped} port-forward(s)"));
    }
    Ok(stopped)
}

/// Liveness of every configured forward.
///
/// Read-only: the record is never modified here.
///
/// # Errors
///
/// Returns an error if the record cannot be read.
pub async fn status(
    table: &impl ProcessTable,
    store: &impl ForwardRecordStore,
) -> Result<Vec<ForwardStatus>> {
    let record = store.load_async().await?;
    Ok(FORWARDS
        .iter()
        .map(|spec| {
            let pid = record.get(spec.name);
            ForwardStatus {
                name: spec.name.to_string(),
                url: spec.url.to_string(),
                local_port: spec.local_port,
                pid,
                active: pid.is_some_and(|p| table.is_alive(p)),
            }
        })
        .collect())
}
