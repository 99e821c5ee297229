//! Gated sub-task wizards with local-first, idempotent completion.
//!
//! Every Staircase exercise is a multi-step wizard whose answers stay in
//! memory until a single finalize succeeds. Finalize claims completion with
//! the remote service and, only after an `Ok` or `AlreadyDone` answer,
//! writes an immutable final record that locks the task into review.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Concrete task definitions in [`catalog`]

pub mod adapters;
pub mod catalog;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
