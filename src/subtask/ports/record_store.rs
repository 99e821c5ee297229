//! Durable key-value port holding final records.

use crate::subtask::domain::RecordKey;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for record store operations.
pub type RecordStoreResult<T> = Result<T, RecordStoreError>;

/// Namespaced key-value persistence for serialized final records.
///
/// Writes are atomic per key. There is no cross-key transaction: callers
/// that touch two keys must tolerate stopping between the writes.
#[async_trait]
pub trait LocalRecordStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError`] when the backing store cannot be read.
    async fn get(&self, key: &RecordKey) -> RecordStoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError`] when the value could not be written.
    async fn put(&self, key: &RecordKey, value: String) -> RecordStoreResult<()>;
}

/// Errors returned by record store implementations.
#[derive(Debug, Clone, Error)]
pub enum RecordStoreError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RecordStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
