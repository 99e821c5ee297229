//! Step definitions for wizard finalize scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
