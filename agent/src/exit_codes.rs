//! Stable exit codes for the agent CLI.

/// The operator judged the task successful.
pub const OK: i32 = 0;
/// Configuration, planning, or I/O failure.
pub const INVALID: i32 = 1;
/// The operator rejected the generated plan.
pub const REJECTED: i32 = 2;
