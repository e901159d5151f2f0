//! Deterministic, pure logic for plan handling.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and return deterministic outputs suitable for tests.

pub mod error;
pub mod extract;
pub mod shell;
pub mod types;
pub mod validate;
