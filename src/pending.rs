//! Shared pending results.
//!
//! # Responsibilities
//! - Hold the eventual outcome of an asynchronous operation
//! - Transition exactly once from pending to resolved
//! - Notify every awaiter and observer at the single transition
//!
//! # Design Decisions
//! - Single-writer-multiple-reader: the first `complete`/`fail` wins, every
//!   later attempt observes `false` from its return value
//! - Observers run outside the internal lock; an observer may re-enter the
//!   scheduler (the timeout guard cancels its timer from one)
//! - `T: Clone` because every reader receives its own copy of the outcome

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use crate::error::{DelayResult, Error};

type Observer<T> = Box<dyn FnOnce(&DelayResult<T>) + Send + 'static>;

enum State<T> {
    Pending {
        wakers: Vec<Waker>,
        observers: Vec<Observer<T>>,
    },
    Resolved(DelayResult<T>),
}

/// A shared handle to a result that resolves exactly once.
///
/// Clones are cheap and all refer to the same slot, so a producer and any
/// number of consumers can hold the same pending result. Awaiting a handle
/// yields a clone of the final outcome; observers registered with
/// [`on_complete`](PendingResult::on_complete) all run at the transition.
pub struct PendingResult<T> {
    inner: Arc<Mutex<State<T>>>,
}

impl<T> Clone for PendingResult<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> PendingResult<T> {
    /// A result that has not resolved yet.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State::Pending {
                wakers: Vec::new(),
                observers: Vec::new(),
            })),
        }
    }

    /// A result that is already successful.
    pub fn ready(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(State::Resolved(Ok(value)))),
        }
    }

    /// A result that has already failed.
    pub fn failed(error: Error) -> Self {
        Self {
            inner: Arc::new(Mutex::new(State::Resolved(Err(error)))),
        }
    }

    /// Resolve successfully. Returns whether this call won the transition.
    pub fn complete(&self, value: T) -> bool {
        self.resolve(Ok(value))
    }

    /// Resolve with an error. Returns whether this call won the transition.
    pub fn fail(&self, error: Error) -> bool {
        self.resolve(Err(error))
    }

    fn resolve(&self, outcome: DelayResult<T>) -> bool {
        let (wakers, observers) = {
            let mut state = self.inner.lock().expect("pending result mutex poisoned");
            match &mut *state {
                State::Resolved(_) => return false,
                State::Pending { wakers, observers } => {
                    let wakers = std::mem::take(wakers);
                    let observers = std::mem::take(observers);
                    *state = State::Resolved(outcome.clone());
                    (wakers, observers)
                }
            }
        };

        // Observers before wakers: a canceller observer disarms its timer
        // before any awaiter resumes and inspects scheduler state.
        for observer in observers {
            observer(&outcome);
        }
        for waker in wakers {
            waker.wake();
        }
        true
    }

    /// Whether the result has resolved.
    pub fn is_done(&self) -> bool {
        matches!(
            *self.inner.lock().expect("pending result mutex poisoned"),
            State::Resolved(_)
        )
    }

    /// The outcome, if resolved.
    pub fn outcome(&self) -> Option<DelayResult<T>> {
        match &*self.inner.lock().expect("pending result mutex poisoned") {
            State::Resolved(outcome) => Some(outcome.clone()),
            State::Pending { .. } => None,
        }
    }

    /// Run `observer` at the transition, or immediately if already resolved.
    ///
    /// An observer registered before the transition runs on the resolving
    /// thread; one registered after runs on the calling thread.
    pub fn on_complete<F>(&self, observer: F)
    where
        F: FnOnce(&DelayResult<T>) + Send + 'static,
    {
        let outcome = {
            let mut state = self.inner.lock().expect("pending result mutex poisoned");
            match &mut *state {
                State::Pending { observers, .. } => {
                    observers.push(Box::new(observer));
                    return;
                }
                State::Resolved(outcome) => outcome.clone(),
            }
        };
        observer(&outcome);
    }
}

impl<T: Clone + Send + 'static> Default for PendingResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Future for PendingResult<T> {
    type Output = DelayResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.inner.lock().expect("pending result mutex poisoned");
        match &mut *state {
            State::Resolved(outcome) => Poll::Ready(outcome.clone()),
            State::Pending { wakers, .. } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

impl<T> fmt::Debug for PendingResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let done = matches!(
            *self.inner.lock().expect("pending result mutex poisoned"),
            State::Resolved(_)
        );
        f.debug_struct("PendingResult").field("done", &done).finish()
    }
}
