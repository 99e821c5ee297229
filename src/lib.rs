//! Staircase: gated sub-task wizards for a staged self-help program.
//!
//! The crate provides the engine behind every Staircase exercise: a gated
//! multi-step state machine whose answers are durably stored only after a
//! server-confirmed, idempotent finalize, after which the task is
//! permanently read-only.
//!
//! # Architecture
//!
//! Staircase follows hexagonal architecture principles:
//!
//! - **Domain**: Pure state machines and value types with no I/O
//! - **Ports**: Abstract trait interfaces for storage and the completion
//!   service
//! - **Adapters**: Concrete implementations of ports (filesystem, HTTP,
//!   in-memory)
//!
//! # Modules
//!
//! - [`subtask`]: Task definitions, wizard orchestration and completion
//! - [`session`]: Session identity and its expiring store

pub mod session;
pub mod subtask;

#[cfg(test)]
pub(crate) mod test_support;
