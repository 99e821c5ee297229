//! Port contracts for the sub-task wizard engine.
//!
//! Ports define infrastructure-agnostic interfaces used by wizard services.

pub mod completion;
pub mod record_store;

pub use completion::CompletionClient;
pub use record_store::{LocalRecordStore, RecordStoreError, RecordStoreResult};
