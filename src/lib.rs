//! Timer scheduling, jittered backoff, and deadline guards for
//! asynchronous operations.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────┐
//!                  │                TimerScheduler                 │
//!   schedule ─────▶│  worker thread ── BTreeMap<deadline, timer>  │
//!   cancel   ─────▶│        │ fire (never runs the action)        │
//!                  └────────┼──────────────────────────────────────┘
//!                           ▼
//!                  caller-supplied Executor ──▶ action
//!                           │
//!          ┌────────────────┼────────────────┐
//!          ▼                ▼                ▼
//!      delay_for      delay_backoff     with_timeout
//!      (fixed wait)   (jittered wait)   (race vs deadline)
//! ```
//!
//! A single background worker owns every armed timer; fired actions are
//! dispatched onto caller-supplied [`Executor`]s, so the worker itself never
//! runs user code. On top of the scheduler sit three primitives, each
//! producing or augmenting a [`PendingResult`], a shared handle that
//! resolves exactly once:
//!
//! - [`delay_for`] / [`delay_backoff`] complete after a fixed or
//!   jittered-exponential interval
//! - [`with_timeout`] races an existing pending result against a deadline;
//!   the first transition wins and the loser is cleaned up
//!
//! Retry policy (attempt limits, which errors are worth retrying) is the
//! caller's business. This crate only supplies the waiting and racing
//! mechanics a retry loop is built from.
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use delayer::{InlineExecutor, PendingResult, TimerScheduler};
//!
//! let scheduler = TimerScheduler::new();
//! let executor = Arc::new(InlineExecutor);
//!
//! // Bound a pending operation by a deadline.
//! let result: PendingResult<u32> = PendingResult::new();
//! scheduler.with_timeout(&result, Duration::from_millis(50), executor);
//! result.complete(7);
//!
//! assert!(matches!(result.outcome(), Some(Ok(7))));
//! assert_eq!(scheduler.pending(), 0);
//! scheduler.shutdown();
//! ```

pub mod backoff;
pub mod clock;
pub mod delay;
pub mod error;
pub mod executor;
pub mod pending;
pub mod scheduler;
pub mod timeout;

pub use backoff::{backoff_interval, MIN_DELAY};
pub use clock::{Clock, ManualClock, SystemClock};
pub use delay::{delay_backoff, delay_for};
pub use error::{DelayResult, Error};
pub use executor::{Executor, InlineExecutor, Task, TokioExecutor};
pub use pending::PendingResult;
pub use scheduler::{SchedulerConfig, TimerHandle, TimerScheduler};
pub use timeout::with_timeout;
