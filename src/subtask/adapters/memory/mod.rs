//! In-memory adapter implementations for testing.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! exercising wizard services without a filesystem or network.

mod completion;
mod record_store;

pub use completion::{CompletionCall, ScriptedCompletionClient};
pub use record_store::InMemoryRecordStore;
