//! Shared test helpers: output constructors, a fake clock, and reporters.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::process::{ExitStatus, Output};
use std::time::Duration;

use cdp_dev::application::{Clock, ProgressReporter};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Time and progress ────────────────────────────────────────────────────────

/// Clock that only advances when slept on.
#[derive(Default)]
pub struct FakeClock {
    now: Cell<Duration>,
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
    async fn sleep(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

/// Reporter that keeps every message, prefixed by its kind.
#[derive(Default)]
pub struct Messages(pub RefCell<Vec<String>>);

impl Messages {
    pub fn contains(&self, needle: &str) -> bool {
        self.0.borrow().iter().any(|m| m.contains(needle))
    }
}

impl ProgressReporter for Messages {
    fn step(&self, message: &str) {
        self.0.borrow_mut().push(format!("step: {message}"));
    }
    fn success(&self, message: &str) {
        self.0.borrow_mut().push(format!("ok: {message}"));
    }
    fn warn(&self, message: &str) {
        self.0.borrow_mut().push(format!("warn: {message}"));
    }
}
