//! Executors that fired timer actions are dispatched onto.
//!
//! # Responsibilities
//! - Decouple the timer thread from the work a timer triggers
//! - Let callers route completions onto their own runtime
//!
//! # Design Decisions
//! - The scheduler thread never runs an action itself; a blocking action
//!   must not stall unrelated timers
//! - Rejection drops the task; completion tasks carry drop behavior that
//!   fails their pending result, so a discarded task is still observable

use crate::error::Error;

/// A boxed timer action.
///
/// Dropping a task without running it is meaningful: delay-completion tasks
/// fail their pending result from `Drop`, so an executor that discards a
/// task produces a visible error rather than a hang.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Destination for fired timer actions.
pub trait Executor: Send + Sync + 'static {
    /// Submit `task` for execution.
    ///
    /// On rejection the implementation drops the task and returns
    /// [`Error::Rejected`]; the scheduler logs the error and the task's drop
    /// behavior, if any, takes over.
    fn execute(&self, task: Task) -> Result<(), Error>;
}

/// Dispatches actions as tasks on a tokio runtime.
pub struct TokioExecutor {
    handle: tokio::runtime::Handle,
}

impl TokioExecutor {
    /// Executor for the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime; use [`TokioExecutor::new`] with an
    /// explicit handle there.
    pub fn current() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }

    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, task: Task) -> Result<(), Error> {
        // A runtime mid-shutdown drops the spawned task, which triggers the
        // task's drop behavior.
        self.handle.spawn(async move { task() });
        Ok(())
    }
}

/// Runs actions directly on the calling thread.
///
/// With the scheduler this means actions run on the timer thread and a slow
/// action delays every other timer; reserve it for cheap actions and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: Task) -> Result<(), Error> {
        task();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_inline_executor_runs_on_calling_thread() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        InlineExecutor
            .execute(Box::new(move || flag.store(true, Ordering::SeqCst)))
            .unwrap();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_tokio_executor_dispatches() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let executor = TokioExecutor::current();
        executor
            .execute(Box::new(move || {
                let _ = tx.send(42u32);
            }))
            .unwrap();
        assert_eq!(rx.await.unwrap(), 42);
    }
}
