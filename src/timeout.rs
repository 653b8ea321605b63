//! Deadline guards over pending results.
//!
//! Races an operation against a timer: whichever transitions the shared
//! result first wins, and the loser is discarded: the timer is cancelled,
//! or the late transition attempt observes `false` and has no effect.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::executor::Executor;
use crate::pending::PendingResult;
use crate::scheduler::TimerScheduler;

impl TimerScheduler {
    /// Bound `result` by a deadline.
    ///
    /// Returns a clone of the same handle, so callers already holding the
    /// result observe the timeout transparently. If the deadline elapses
    /// while the result is still pending, it fails with [`Error::Timeout`],
    /// dispatched through `executor`. A transition of either kind before the
    /// deadline cancels the timer, so no armed timer outlives a finished
    /// operation. Domain errors pass through unchanged.
    ///
    /// An already-resolved `result` arms the timer and immediately cancels
    /// it again; a wasted timer slot, not a correctness issue.
    pub fn with_timeout<T>(
        &self,
        result: &PendingResult<T>,
        timeout: Duration,
        executor: Arc<dyn Executor>,
    ) -> PendingResult<T>
    where
        T: Clone + Send + 'static,
    {
        let expired = result.clone();
        let armed = self.schedule(
            timeout,
            move || {
                if expired.fail(Error::Timeout(timeout)) {
                    tracing::debug!(
                        timeout_ms = timeout.as_millis() as u64,
                        "Operation timed out"
                    );
                }
            },
            executor,
        );

        match armed {
            Ok(handle) => {
                result.on_complete(move |_| handle.cancel());
            }
            Err(err) => {
                // Without an armed timer no deadline can be enforced.
                result.fail(err);
            }
        }

        result.clone()
    }
}

/// [`with_timeout`](TimerScheduler::with_timeout) on the process-wide
/// scheduler.
pub fn with_timeout<T>(
    result: &PendingResult<T>,
    timeout: Duration,
    executor: Arc<dyn Executor>,
) -> PendingResult<T>
where
    T: Clone + Send + 'static,
{
    TimerScheduler::global().with_timeout(result, timeout, executor)
}
