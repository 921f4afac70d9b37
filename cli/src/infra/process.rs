//! OS process table: liveness probes and graceful termination.
//!
//! Unix reaps exited children of this process first, then uses a zero
//! signal for liveness and `SIGTERM` to stop. Windows has no signals, so it
//! asks `tasklist`/`taskkill`.

use anyhow::Result;

use crate::application::ports::ProcessTable;

/// Production [`ProcessTable`].
#[derive(Debug, Default)]
pub struct OsProcessTable;

#[cfg(unix)]
impl ProcessTable for OsProcessTable {
    fn is_alive(&self, pid: u32) -> bool {
        use nix::sys::signal::kill;
        use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
        use nix::unistd::Pid;

        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        if raw <= 0 {
            return false;
        }
        let pid = Pid::from_raw(raw);
        // A spawned forward that already exited stays a zombie until reaped,
        // and a zombie still answers the zero signal.
        // ECHILD (not our child) falls through to the signal probe.
        if let Ok(WaitStatus::Exited(..) | WaitStatus::Signaled(..)) =
            waitpid(pid, Some(WaitPidFlag::WNOHANG))
        {
            return false;
        }
        signal_probe_alive(kill(pid, None))
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        use anyhow::Context;
        use nix::sys::signal::{Signal, kill};
        use nix::unistd::Pid;

        let raw = i32::try_from(pid).context("pid out of range")?;
        anyhow::ensure!(raw > 0, "refusing to signal pid {pid}");
        kill(Pid::from_raw(raw), Signal::SIGTERM)
            .with_context(|| format!("sending SIGTERM to {pid}"))
    }
}

/// Only a delivered zero signal means alive. `EPERM` means the PID was
/// reused by another user's process, which is not our forward.
#[cfg(unix)]
fn signal_probe_alive(result: nix::Result<()>) -> bool {
    result.is_ok()
}

#[cfg(windows)]
impl ProcessTable for OsProcessTable {
    fn is_alive(&self, pid: u32) -> bool {
        std::process::Command::new("tasklist")
            .args(["/FI", &format!("PID eq {pid}"), "/NH", "/FO", "CSV"])
            .output()
            .map(|o| {
                o.status.success()
                    && String::from_utf8_lossy(&o.stdout).contains(&format!("\"{pid}\""))
            })
            .unwrap_or(false)
    }

    fn terminate(&self, pid: u32) -> Result<()> {
        use anyhow::Context;

        let output = std::process::Command::new("taskkill")
            .args(["/PID", &pid.to_string()])
            .output()
            .context("running taskkill")?;
        anyhow::ensure!(
            output.status.success(),
            "taskkill /PID {pid} failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
        Ok(())
    }
}
