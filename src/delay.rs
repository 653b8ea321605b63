//! Delayed completion of pending results.
//!
//! # Data Flow
//! ```text
//! delay_backoff(attempt) ──▶ backoff_interval ──▶ delay_for(ms)
//!                                                     │
//!                                                     ▼
//!                              scheduler ──(fire)──▶ executor ──▶ result.complete(())
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::backoff::backoff_interval;
use crate::error::Error;
use crate::executor::Executor;
use crate::pending::PendingResult;
use crate::scheduler::TimerScheduler;

impl TimerScheduler {
    /// A result that completes no earlier than `milliseconds` from now,
    /// dispatched through `executor`.
    ///
    /// If the scheduler is shut down, at call time or while the timer is
    /// armed, the result fails with [`Error::SchedulerUnavailable`] rather
    /// than hanging: the completion task fails the result from `Drop` when
    /// it is destroyed without running.
    pub fn delay_for(&self, milliseconds: u64, executor: Arc<dyn Executor>) -> PendingResult<()> {
        tracing::trace!(
            seconds = milliseconds as f64 / 1000.0,
            "Waiting before trying again"
        );

        let result = PendingResult::new();
        let completion = Completion {
            result: Some(result.clone()),
        };
        if let Err(err) = self.schedule(
            Duration::from_millis(milliseconds),
            move || completion.fire(),
            executor,
        ) {
            result.fail(err);
        }
        result
    }

    /// A result that completes after the jittered exponential backoff
    /// interval for `attempt`.
    pub fn delay_backoff(&self, attempt: u32, executor: Arc<dyn Executor>) -> PendingResult<()> {
        let interval = backoff_interval(attempt);
        self.delay_for(interval.as_millis() as u64, executor)
    }
}

/// Completes the delay result when fired; fails it when dropped unfired
/// (scheduler shutdown, or an executor that discarded the task).
struct Completion {
    result: Option<PendingResult<()>>,
}

impl Completion {
    fn fire(mut self) {
        if let Some(result) = self.result.take() {
            result.complete(());
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(result) = self.result.take() {
            result.fail(Error::SchedulerUnavailable);
        }
    }
}

/// [`delay_for`](TimerScheduler::delay_for) on the process-wide scheduler.
pub fn delay_for(milliseconds: u64, executor: Arc<dyn Executor>) -> PendingResult<()> {
    TimerScheduler::global().delay_for(milliseconds, executor)
}

/// [`delay_backoff`](TimerScheduler::delay_backoff) on the process-wide
/// scheduler.
pub fn delay_backoff(attempt: u32, executor: Arc<dyn Executor>) -> PendingResult<()> {
    TimerScheduler::global().delay_backoff(attempt, executor)
}
