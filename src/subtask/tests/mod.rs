//! Unit tests for the sub-task wizard engine.

mod gate_tests;
mod payload_tests;
