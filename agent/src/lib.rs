//! Interactive plan-and-execute agent loop.
//!
//! This crate turns an operator's task into a model-generated step plan,
//! executes approved plans on the host, and refines rejected outcomes with
//! operator feedback. The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (plan types, extraction,
//!   validation, command adaptation). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (model HTTP calls, the operator
//!   console, subprocess execution). Isolated behind traits to enable
//!   scripted doubles in tests.
//!
//! Orchestration modules ([`planner`], [`looping`]) coordinate core logic
//! with I/O to implement the interactive session.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod planner;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
