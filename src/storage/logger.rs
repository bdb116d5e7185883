//! Logger collaborator injected into the store.

use crate::error::StorageError;

/// Receives every failure the store absorbs.
pub trait StorageLogger: Send + Sync {
    fn error(&self, message: &str, err: &StorageError);
}

/// Default logger, forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl StorageLogger for TracingLogger {
    fn error(&self, message: &str, err: &StorageError) {
        tracing::error!(error = %err, "{}", message);
    }
}
