//! The interactive generate/approve/execute/judge loop.

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use crate::core::types::{Approval, ExecutionResult, Plan, Verdict};
use crate::io::console::Console;
use crate::io::model::Completer;
use crate::io::steps::StepExecutor;
use crate::planner::Planner;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStop {
    /// The operator judged the executed plan successful.
    Succeeded,
    /// The operator declined to execute the generated plan.
    Rejected,
}

/// Final loop summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOutcome {
    /// Number of generate/execute rounds, counted from 1.
    pub attempts: u32,
    pub stop: LoopStop,
}

/// Progress notifications emitted while the loop runs.
///
/// The caller decides how to present these; the loop itself never writes
/// to stdout.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    AttemptStarted {
        attempt: u32,
    },
    StepStarted {
        index: usize,
        total: usize,
        description: String,
    },
    StepFinished {
        index: usize,
        result: ExecutionResult,
    },
    Refining,
}

/// Drive the full loop for one task until success or rejection.
///
/// Each round generates a plan, asks the operator to approve it, executes
/// the approved steps, and asks the operator to judge the result. A failure
/// verdict feeds the operator's reason into the next round's generation.
/// There is no attempt cap; only the operator ends the loop.
#[instrument(skip_all, fields(task = %task))]
pub fn run_loop<C, E, K, F>(
    planner: &Planner<C>,
    executor: &E,
    console: &K,
    task: &str,
    mut on_event: F,
) -> Result<LoopOutcome>
where
    C: Completer,
    E: StepExecutor,
    K: Console,
    F: FnMut(&LoopEvent),
{
    let mut attempt: u32 = 1;
    let mut failure: Option<String> = None;
    loop {
        on_event(&LoopEvent::AttemptStarted { attempt });
        let plan = planner
            .generate(task, failure.as_deref())
            .with_context(|| format!("generate plan (attempt {attempt})"))?;
        debug!(attempt, steps = plan.steps.len(), "plan generated");

        if console.review_plan(&plan)? == Approval::Rejected {
            info!(attempt, "plan rejected by operator");
            return Ok(LoopOutcome {
                attempts: attempt,
                stop: LoopStop::Rejected,
            });
        }

        execute_plan(executor, &plan, &mut on_event)?;

        match console.judge_outcome()? {
            Verdict::Success => {
                info!(attempt, "task judged successful");
                return Ok(LoopOutcome {
                    attempts: attempt,
                    stop: LoopStop::Succeeded,
                });
            }
            Verdict::Failure { reason } => {
                warn!(attempt, reason = %reason, "task judged failed, refining");
                on_event(&LoopEvent::Refining);
                failure = Some(reason);
                attempt += 1;
            }
        }
    }
}

/// Run the plan's steps in order, halting after the first failed step.
///
/// The halt is not an error: the partial outcome still goes to the
/// operator for judgment.
fn execute_plan<E, F>(executor: &E, plan: &Plan, on_event: &mut F) -> Result<()>
where
    E: StepExecutor,
    F: FnMut(&LoopEvent),
{
    let total = plan.steps.len();
    for (index, step) in plan.steps.iter().enumerate() {
        on_event(&LoopEvent::StepStarted {
            index,
            total,
            description: step.description.clone(),
        });
        let result = executor
            .execute(step)
            .with_context(|| format!("execute step {}", index + 1))?;
        let halt = !result.success();
        if halt {
            warn!(
                step = index + 1,
                exit_code = result.exit_code,
                "step failed, halting plan"
            );
        }
        on_event(&LoopEvent::StepFinished { index, result });
        if halt {
            break;
        }
    }
    Ok(())
}
