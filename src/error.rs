//! Error definitions for timers and guarded operations.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Errors surfaced through a [`PendingResult`](crate::PendingResult).
///
/// Cloneable because every observer of a shared result receives the outcome;
/// propagated operation failures are therefore held behind an `Arc`.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The guarded operation did not complete before its deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The timer scheduler was shut down before the timer could fire.
    #[error("timer scheduler unavailable")]
    SchedulerUnavailable,

    /// The executor refused the dispatched action.
    #[error("executor rejected timer action: {0}")]
    Rejected(String),

    /// Failure propagated unchanged from the awaited operation.
    #[error("{0}")]
    Operation(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Wrap a domain failure for propagation through a pending result.
    pub fn operation<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Operation(Arc::new(source))
    }

    /// Whether this is the deadline-elapsed signal from a timeout guard.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

/// Result type for delay and timeout operations.
pub type DelayResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Timeout(Duration::from_millis(50));
        assert!(err.to_string().contains("timed out"));

        let err = Error::Rejected("queue full".into());
        assert_eq!(err.to_string(), "executor rejected timer action: queue full");
    }

    #[test]
    fn test_operation_passthrough() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = Error::operation(io);
        assert!(!err.is_timeout());
        assert!(err.to_string().contains("reset by peer"));
    }

    #[test]
    fn test_timeout_detection() {
        assert!(Error::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(!Error::SchedulerUnavailable.is_timeout());
    }
}
