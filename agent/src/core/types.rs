//! Shared deterministic types for the planning loop.
//!
//! These types define the wire contract between the plan generator, the
//! validator, and the step executor. They must not depend on external state
//! or I/O and must remain deterministic across runs.

use serde::{Deserialize, Serialize};

/// How a step's payload is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// Run the payload through the platform shell.
    Command,
    /// Materialize the payload to a file and run it with the code interpreter.
    Code,
}

/// One executable action in a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    /// Human-readable label shown at the approval gate and during execution.
    pub description: String,
    /// The literal command line or source snippet to run.
    pub payload: String,
}

/// An ordered sequence of steps.
///
/// Steps execute strictly in array order; an early failure aborts the
/// remainder. A plan is never persisted across rounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    pub steps: Vec<Step>,
}

/// Captured outcome of a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Operator decision at the approval gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Approved,
    Rejected,
}

/// Operator judgment after a plan has run.
///
/// Exit codes are not authoritative; this is the signal that decides whether
/// the loop terminates or refines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Success,
    /// The task is not done; `reason` feeds the next planning round.
    Failure { reason: String },
}
