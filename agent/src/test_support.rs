//! Test-only scripted doubles and plan builders.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::core::types::{Approval, ExecutionResult, Plan, Step, StepKind, Verdict};
use crate::io::console::Console;
use crate::io::model::{Completer, CompletionRequest};
use crate::io::steps::StepExecutor;

/// Completer that replays scripted replies and records every request.
pub struct ScriptedCompleter {
    replies: RefCell<VecDeque<Result<String, String>>>,
    requests: RefCell<Vec<CompletionRequest>>,
}

impl ScriptedCompleter {
    pub fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.borrow().clone()
    }
}

impl Completer for ScriptedCompleter {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.borrow_mut().push(request.clone());
        match self.replies.borrow_mut().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted completer ran out of replies")),
        }
    }
}

/// Executor that replays scripted results and records every step.
pub struct ScriptedExecutor {
    results: RefCell<VecDeque<Result<ExecutionResult, String>>>,
    executed: RefCell<Vec<Step>>,
}

impl ScriptedExecutor {
    pub fn new(results: Vec<Result<ExecutionResult, String>>) -> Self {
        Self {
            results: RefCell::new(results.into()),
            executed: RefCell::new(Vec::new()),
        }
    }

    pub fn executed(&self) -> Vec<Step> {
        self.executed.borrow().clone()
    }
}

impl StepExecutor for ScriptedExecutor {
    fn execute(&self, step: &Step) -> Result<ExecutionResult> {
        self.executed.borrow_mut().push(step.clone());
        match self.results.borrow_mut().pop_front() {
            Some(Ok(result)) => Ok(result),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("scripted executor ran out of results")),
        }
    }
}

/// Console that replays scripted operator decisions.
pub struct ScriptedConsole {
    pub task: String,
    approvals: RefCell<VecDeque<Approval>>,
    verdicts: RefCell<VecDeque<Verdict>>,
    reviewed: RefCell<Vec<Plan>>,
    judgments: Cell<u32>,
}

impl ScriptedConsole {
    pub fn new(approvals: Vec<Approval>, verdicts: Vec<Verdict>) -> Self {
        Self {
            task: "scripted task".to_string(),
            approvals: RefCell::new(approvals.into()),
            verdicts: RefCell::new(verdicts.into()),
            reviewed: RefCell::new(Vec::new()),
            judgments: Cell::new(0),
        }
    }

    pub fn reviewed_plans(&self) -> Vec<Plan> {
        self.reviewed.borrow().clone()
    }

    pub fn judgment_count(&self) -> u32 {
        self.judgments.get()
    }
}

impl Console for ScriptedConsole {
    fn read_task(&self) -> Result<String> {
        Ok(self.task.clone())
    }

    fn review_plan(&self, plan: &Plan) -> Result<Approval> {
        self.reviewed.borrow_mut().push(plan.clone());
        self.approvals
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted console ran out of approvals"))
    }

    fn judge_outcome(&self) -> Result<Verdict> {
        self.judgments.set(self.judgments.get() + 1);
        self.verdicts
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| anyhow!("scripted console ran out of verdicts"))
    }
}

/// Create a command step with a derived description.
pub fn command_step(payload: &str) -> Step {
    Step {
        kind: StepKind::Command,
        description: format!("run {payload}"),
        payload: payload.to_string(),
    }
}

/// Create a code step with a derived description.
pub fn code_step(payload: &str) -> Step {
    Step {
        kind: StepKind::Code,
        description: format!("execute {payload}"),
        payload: payload.to_string(),
    }
}

pub fn plan(steps: Vec<Step>) -> Plan {
    Plan { steps }
}

pub fn ok_result(stdout: &str) -> ExecutionResult {
    ExecutionResult {
        stdout: stdout.to_string(),
        stderr: String::new(),
        exit_code: 0,
    }
}

pub fn failed_result(exit_code: i32, stderr: &str) -> ExecutionResult {
    ExecutionResult {
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code,
    }
}

/// Serialize a plan the way a well-behaved model would reply.
pub fn plan_json(plan: &Plan) -> String {
    serde_json::to_string(plan).expect("plan should serialize")
}
