//! In-memory implementation of the record store port.

use crate::subtask::{
    domain::RecordKey,
    ports::{LocalRecordStore, RecordStoreError, RecordStoreResult},
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory key-value store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    state: Arc<RwLock<InMemoryRecordState>>,
}

#[derive(Debug, Default)]
struct InMemoryRecordState {
    values: HashMap<RecordKey, String>,
    writes: Vec<RecordKey>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every key written so far, in write order.
    ///
    /// # Errors
    ///
    /// Returns [`RecordStoreError`] when the lock is poisoned.
    pub fn write_log(&self) -> RecordStoreResult<Vec<RecordKey>> {
        let state = self.state.read().map_err(|err| {
            RecordStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.writes.clone())
    }
}

#[async_trait]
impl LocalRecordStore for InMemoryRecordStore {
    async fn get(&self, key: &RecordKey) -> RecordStoreResult<Option<String>> {
        let state = self.state.read().map_err(|err| {
            RecordStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.values.get(key).cloned())
    }

    async fn put(&self, key: &RecordKey, value: String) -> RecordStoreResult<()> {
        let mut state = self.state.write().map_err(|err| {
            RecordStoreError::persistence(std::io::Error::other(err.to_string()))
        })?;
        state.values.insert(key.clone(), value);
        state.writes.push(key.clone());
        Ok(())
    }
}
