//! Shared utilities for behavior tests.

use std::sync::Arc;

use delayer::{Executor, TokioExecutor};

/// Route fired timer actions onto the test runtime.
pub fn executor() -> Arc<dyn Executor> {
    Arc::new(TokioExecutor::current())
}

/// Install a subscriber once so `RUST_LOG` surfaces crate logs in tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "delayer=debug".into()),
        )
        .try_init();
}
