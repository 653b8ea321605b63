//! Background timer scheduling.
//!
//! # Responsibilities
//! - Keep armed timers ordered by deadline
//! - Fire due timers from a single background worker thread
//! - Dispatch every fired action onto the executor captured at schedule time
//!
//! # Design Decisions
//! - One worker thread per scheduler; the process-wide instance is created
//!   lazily on first use and lives for the rest of the process
//! - The worker never runs an action itself, so a blocking action cannot
//!   delay other timers
//! - Cancellation is best-effort: an action already handed to its executor
//!   cannot be recalled

use std::collections::BTreeMap;
use std::sync::{Arc, Condvar, Mutex, OnceLock, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use metrics::{counter, gauge};

use crate::clock::{Clock, SystemClock};
use crate::error::Error;
use crate::executor::{Executor, Task};

/// Tuning for a [`TimerScheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            thread_name: "delayer-timer".into(),
        }
    }
}

/// Sort key for armed timers: deadline first, then arm order.
type TimerKey = (Instant, u64);

struct TimerEntry {
    action: Task,
    executor: Arc<dyn Executor>,
}

struct TimerQueue {
    timers: BTreeMap<TimerKey, TimerEntry>,
    next_seq: u64,
    shutdown: bool,
}

struct Shared {
    queue: Mutex<TimerQueue>,
    wakeup: Condvar,
    clock: Arc<dyn Clock>,
}

/// One-shot timer facility backed by a single worker thread.
///
/// Construct one per subsystem or test, or share the process-wide instance
/// from [`TimerScheduler::global`]. The worker thread is detached and never
/// blocks process exit; [`shutdown`](TimerScheduler::shutdown) performs an
/// orderly teardown that drains the queue and joins the worker.
pub struct TimerScheduler {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TimerScheduler {
    /// Scheduler on the system clock with default tuning.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default(), Arc::new(SystemClock))
    }

    /// Scheduler with explicit tuning and time source.
    pub fn with_config(config: SchedulerConfig, clock: Arc<dyn Clock>) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(TimerQueue {
                timers: BTreeMap::new(),
                next_seq: 0,
                shutdown: false,
            }),
            wakeup: Condvar::new(),
            clock,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(config.thread_name)
            .spawn(move || worker_loop(worker_shared))
            .expect("failed to spawn timer worker thread");

        Self {
            shared,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// The process-wide scheduler, created on first use.
    ///
    /// Initialization happens exactly once and the instance is never
    /// dropped. Prefer an owned scheduler where a test needs isolation or a
    /// manual clock.
    pub fn global() -> &'static TimerScheduler {
        static GLOBAL: OnceLock<TimerScheduler> = OnceLock::new();
        GLOBAL.get_or_init(TimerScheduler::new)
    }

    /// Arm a one-shot timer.
    ///
    /// After `delay` the worker hands `action` to `executor`; the action
    /// never runs on the worker thread itself. Timers fire in non-decreasing
    /// deadline order. Fails with [`Error::SchedulerUnavailable`] once the
    /// scheduler has shut down.
    pub fn schedule<F>(
        &self,
        delay: Duration,
        action: F,
        executor: Arc<dyn Executor>,
    ) -> Result<TimerHandle, Error>
    where
        F: FnOnce() + Send + 'static,
    {
        let now = self.shared.clock.now();
        // Delays beyond the Instant range clamp to a year out.
        let deadline = now
            .checked_add(delay)
            .unwrap_or_else(|| now + Duration::from_secs(60 * 60 * 24 * 365));

        let (key, pending) = {
            let mut queue = self.shared.queue.lock().expect("timer queue mutex poisoned");
            if queue.shutdown {
                return Err(Error::SchedulerUnavailable);
            }
            let key = (deadline, queue.next_seq);
            queue.next_seq += 1;
            let became_earliest = queue
                .timers
                .first_key_value()
                .map_or(true, |(head, _)| key < *head);
            queue.timers.insert(
                key,
                TimerEntry {
                    action: Box::new(action),
                    executor,
                },
            );
            let pending = queue.timers.len();
            drop(queue);

            if became_earliest {
                self.shared.wakeup.notify_one();
            }
            (key, pending)
        };

        counter!("delayer_timers_scheduled_total").increment(1);
        gauge!("delayer_timers_pending").set(pending as f64);
        tracing::trace!(delay_ms = delay.as_millis() as u64, pending, "Timer armed");

        Ok(TimerHandle {
            key,
            shared: Arc::downgrade(&self.shared),
        })
    }

    /// Number of timers currently armed.
    pub fn pending(&self) -> usize {
        self.shared
            .queue
            .lock()
            .expect("timer queue mutex poisoned")
            .timers
            .len()
    }

    /// Stop the worker and drop every armed timer.
    ///
    /// Dropped completion actions fail their pending results, so callers
    /// blocked on a delay observe [`Error::SchedulerUnavailable`] instead of
    /// hanging. Idempotent; later `schedule` calls fail.
    pub fn shutdown(&self) {
        {
            let mut queue = self.shared.queue.lock().expect("timer queue mutex poisoned");
            queue.shutdown = true;
        }
        self.shared.wakeup.notify_all();

        let worker = self
            .worker
            .lock()
            .expect("timer worker mutex poisoned")
            .take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                tracing::error!("Timer worker thread panicked");
            }
        }
        tracing::debug!("Timer scheduler shut down");
    }
}

impl Default for TimerScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerScheduler {
    fn drop(&mut self) {
        // Signal shutdown without joining; drop may run on a thread the
        // worker is about to dispatch onto.
        if let Ok(mut queue) = self.shared.queue.lock() {
            queue.shutdown = true;
        }
        self.shared.wakeup.notify_all();
    }
}

/// Handle to a single armed timer.
///
/// Holds only a weak reference to its scheduler, so an outstanding handle
/// never keeps the timer thread alive.
pub struct TimerHandle {
    key: TimerKey,
    shared: Weak<Shared>,
}

impl TimerHandle {
    /// Disarm the timer if it has not fired yet.
    ///
    /// Best-effort: a timer already handed to its executor runs anyway.
    /// Cancelling a fired or already-cancelled timer is a harmless no-op.
    pub fn cancel(&self) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let (removed, pending) = {
            let mut queue = shared.queue.lock().expect("timer queue mutex poisoned");
            let removed = queue.timers.remove(&self.key);
            (removed, queue.timers.len())
        };
        // The entry (action included) drops here, outside the lock.
        if removed.is_some() {
            counter!("delayer_timers_cancelled_total").increment(1);
            gauge!("delayer_timers_pending").set(pending as f64);
            tracing::trace!("Timer cancelled");
        }
    }
}

fn worker_loop(shared: Arc<Shared>) {
    let mut queue = shared.queue.lock().expect("timer queue mutex poisoned");
    loop {
        if queue.shutdown {
            let drained = std::mem::take(&mut queue.timers);
            drop(queue);
            let dropped = drained.len();
            // Dropping the entries runs any completion drop-guards.
            drop(drained);
            if dropped > 0 {
                tracing::debug!(dropped, "Timer queue drained at shutdown");
            }
            gauge!("delayer_timers_pending").set(0.0);
            return;
        }

        let now = shared.clock.now();
        let mut due = Vec::new();
        while queue
            .timers
            .first_key_value()
            .map_or(false, |(key, _)| key.0 <= now)
        {
            if let Some((_, entry)) = queue.timers.pop_first() {
                due.push(entry);
            }
        }

        if !due.is_empty() {
            let pending = queue.timers.len();
            drop(queue);
            gauge!("delayer_timers_pending").set(pending as f64);
            for entry in due {
                counter!("delayer_timers_fired_total").increment(1);
                if let Err(err) = entry.executor.execute(entry.action) {
                    tracing::error!(error = %err, "Executor rejected fired timer action");
                }
            }
            queue = shared.queue.lock().expect("timer queue mutex poisoned");
            continue;
        }

        let next_deadline = queue.timers.first_key_value().map(|(key, _)| key.0);
        queue = match next_deadline {
            None => shared
                .wakeup
                .wait(queue)
                .expect("timer queue mutex poisoned"),
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(now);
                shared
                    .wakeup
                    .wait_timeout(queue, wait)
                    .expect("timer queue mutex poisoned")
                    .0
            }
        };
    }
}
