//! Poll-with-ceiling wait primitive shared by every readiness loop.
//!
//! The loop never sleeps past the ceiling, so with a fake [`Clock`] a wait
//! that never becomes ready ends with `elapsed == ceiling` exactly.
//! Dropping the returned future cancels the wait.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;

use crate::application::ports::Clock;

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T, P> {
    Ready(T),
    Pending(P),
}

/// Interval, ceiling, and optional status-report cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Delay between probes.
    pub interval: Duration,
    /// Hard limit on total wait time.
    pub ceiling: Duration,
    /// Report pending status on the first pending probe and then at this cadence.
    pub report_every: Option<Duration>,
}

/// How a wait ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T, P> {
    Ready { value: T, elapsed: Duration },
    /// `last` is the pending status from the probe at the ceiling.
    TimedOut { last: P, elapsed: Duration },
}

/// Probe until ready or until `policy.ceiling` has elapsed.
///
/// `on_report` receives the latest pending status and the elapsed time
/// whenever a report is due.
///
/// # Errors
///
/// Propagates the first error returned by `probe`. Probes that want to
/// tolerate transient failures should map them to `Probe::Pending`.
pub async fn wait_for<T, P, F, Fut>(
    clock: &impl Clock,
    policy: WaitPolicy,
    mut probe: F,
    mut on_report: impl FnMut(&P, Duration),
) -> Result<WaitOutcome<T, P>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Probe<T, P>>>,
{
    let start = clock.now();
    let mut last_report: Option<Duration> = None;

    loop {
        let elapsed = clock.now().saturating_sub(start);
        match probe().await? {
            Probe::Ready(value) => return Ok(WaitOutcome::Ready { value, elapsed }),
            Probe::Pending(status) => {
                if let Some(every) = policy.report_every {
                    let due = last_report.is_none_or(|at| elapsed.saturating_sub(at) >= every);
                    if due {
                        on_report(&status, elapsed);
                        last_report = Some(elapsed);
                    }
                }
                if elapsed >= policy.ceiling {
                    return Ok(WaitOutcome::TimedOut {
                        last: status,
                        elapsed,
                    });
                }
            }
        }

        let remaining = policy.ceiling - elapsed;
        clock.sleep(policy.interval.min(remaining)).await;
    }
}

/// Production clock backed by `tokio::time`.
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    /// Clock that advances only when slept on.
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

    fn policy(interval: u64, ceiling: u64, report: Option<u64>) -> WaitPolicy {
        WaitPolicy {
            interval: Duration::from_secs(interval),
            ceiling: Duration::from_secs(ceiling),
            report_every: report.map(Duration::from_secs),
        }
    }

    #[tokio::test]
    async fn ready_on_third_probe_does_not_time_out() {
        let clock = FakeClock::default();
        let calls = Cell::new(0u32);
        let outcome = wait_for(
            &clock,
            policy(10, 900, Some(30)),
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    Ok(if n >= 3 {
                        Probe::Ready(n)
                    } else {
                        Probe::Pending(n)
                    })
                }
            },
            |_, _| {},
        )
        .await
        .expect("wait");
        assert_eq!(
            outcome,
            WaitOutcome::Ready {
                value: 3,
                elapsed: Duration::from_secs(20)
            }
        );
    }

    #[tokio::test]
    async fn never_ready_stops_exactly_at_ceiling() {
        let clock = FakeClock::default();
        let outcome: WaitOutcome<(), &str> = wait_for(
            &clock,
            policy(10, 95, None),
            || async { Ok(Probe::Pending("waiting")) },
            |_, _| {},
        )
        .await
        .expect("wait");
        assert_eq!(
            outcome,
            WaitOutcome::TimedOut {
                last: "waiting",
                elapsed: Duration::from_secs(95)
            }
        );
        assert_eq!(clock.now(), Duration::from_secs(95));
    }

    #[tokio::test]
    async fn zero_ceiling_probes_once_and_keeps_its_status() {
        let clock = FakeClock::default();
        let calls = Cell::new(0u32);
        let outcome: WaitOutcome<(), u32> = wait_for(
            &clock,
            policy(10, 0, None),
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move { Ok(Probe::Pending(n)) }
            },
            |_, _| {},
        )
        .await
        .expect("wait");
        assert_eq!(
            outcome,
            WaitOutcome::TimedOut {
                last: 1,
                elapsed: Duration::ZERO
            }
        );
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn reports_first_pending_then_at_cadence() {
        let clock = FakeClock::default();
        let reports = RefCell::new(Vec::new());
        let _: WaitOutcome<(), ()> = wait_for(
            &clock,
            policy(10, 100, Some(30)),
            || async { Ok(Probe::Pending(())) },
            |(), at| reports.borrow_mut().push(at.as_secs()),
        )
        .await
        .expect("wait");
        assert_eq!(*reports.borrow(), vec![0, 30, 60, 90]);
    }

    #[tokio::test]
    async fn probe_error_propagates() {
        let clock = FakeClock::default();
        let result: Result<WaitOutcome<(), ()>> = wait_for(
            &clock,
            policy(5, 120, None),
            || async { Err::<Probe<(), ()>, _>(anyhow::anyhow!("probe exploded")) },
            |(), _| {},
        )
        .await;
        assert!(result.is_err());
    }
}
