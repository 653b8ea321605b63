//! Time sources for the scheduler.
//!
//! # Design Decisions
//! - Deadlines are computed against a `Clock` trait so tests can substitute
//!   a deterministic source instead of the wall clock
//! - Monotonic instants only; wall-clock jumps must never fire timers early

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A monotonic time source.
pub trait Clock: Send + Sync + 'static {
    /// Current instant on this clock.
    fn now(&self) -> Instant;
}

/// The process monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Useful for deterministic tests of deadline arithmetic and queue state.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Advance the clock by `step`.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.lock().expect("manual clock mutex poisoned");
        *now += step;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().expect("manual clock mutex poisoned")
    }
}
