//! Step definitions for letter release scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
