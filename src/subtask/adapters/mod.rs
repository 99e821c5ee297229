//! Adapter implementations for sub-task ports.
//!
//! - [`memory`]: in-memory store and scripted completion client for tests
//! - [`fs`]: capability-scoped filesystem record store
//! - [`http`]: HTTP completion client

pub mod fs;
pub mod http;
pub mod memory;
