//! Loop behavior tests with scripted model, executor, and console.

use agent::core::types::{Approval, Verdict};
use agent::io::config::ModelConfig;
use agent::looping::{LoopEvent, LoopStop, run_loop};
use agent::planner::Planner;
use agent::test_support::{
    ScriptedCompleter, ScriptedConsole, ScriptedExecutor, code_step, command_step, ok_result,
    plan, plan_json,
};

/// Verifies a failure verdict reaches the next generation request while
/// the first request stays bare.
#[test]
fn refinement_feeds_reason_into_next_prompt() {
    let first = plan(vec![command_step("touch out.txt")]);
    let second = plan(vec![code_step("open('out.txt', 'w').close()")]);
    let completer = ScriptedCompleter::new(vec![Ok(plan_json(&first)), Ok(plan_json(&second))]);
    let planner = Planner::new(&completer, &ModelConfig::default());
    let executor = ScriptedExecutor::new(vec![Ok(ok_result("")), Ok(ok_result(""))]);
    let console = ScriptedConsole::new(
        vec![Approval::Approved, Approval::Approved],
        vec![
            Verdict::Failure {
                reason: "file not found".to_string(),
            },
            Verdict::Success,
        ],
    );

    let outcome = run_loop(&planner, &executor, &console, "create a file", |_| {}).expect("loop");

    assert_eq!(outcome.attempts, 2);
    assert_eq!(outcome.stop, LoopStop::Succeeded);
    let requests = completer.requests();
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].user.contains("Failure reason"));
    assert!(requests[1].user.contains("Task: create a file"));
    assert!(requests[1].user.contains("Failure reason: file not found"));
    assert_eq!(executor.executed().len(), 2);
}

#[test]
fn rejection_executes_nothing() {
    let scripted = plan(vec![command_step("rm -rf scratch")]);
    let completer = ScriptedCompleter::new(vec![Ok(plan_json(&scripted))]);
    let planner = Planner::new(&completer, &ModelConfig::default());
    let executor = ScriptedExecutor::new(vec![]);
    let console = ScriptedConsole::new(vec![Approval::Rejected], vec![]);

    let outcome = run_loop(&planner, &executor, &console, "clean scratch", |_| {}).expect("loop");

    assert_eq!(outcome.stop, LoopStop::Rejected);
    assert_eq!(outcome.attempts, 1);
    assert!(executor.executed().is_empty());
    assert_eq!(console.judgment_count(), 0);
}

#[test]
fn events_track_progress() {
    let scripted = plan(vec![command_step("mkdir demo"), command_step("ls demo")]);
    let completer = ScriptedCompleter::new(vec![Ok(plan_json(&scripted))]);
    let planner = Planner::new(&completer, &ModelConfig::default());
    let executor = ScriptedExecutor::new(vec![Ok(ok_result("")), Ok(ok_result("demo"))]);
    let console = ScriptedConsole::new(vec![Approval::Approved], vec![Verdict::Success]);

    let mut events = Vec::new();
    run_loop(&planner, &executor, &console, "make a demo dir", |event| {
        events.push(event.clone());
    })
    .expect("loop");

    assert_eq!(events.len(), 5);
    assert_eq!(events[0], LoopEvent::AttemptStarted { attempt: 1 });
    assert_eq!(
        events[1],
        LoopEvent::StepStarted {
            index: 0,
            total: 2,
            description: "run mkdir demo".to_string(),
        }
    );
    assert!(matches!(events[2], LoopEvent::StepFinished { index: 0, .. }));
    assert!(matches!(events[3], LoopEvent::StepStarted { index: 1, .. }));
    assert!(matches!(events[4], LoopEvent::StepFinished { index: 1, .. }));
}

/// Verifies a generation failure ends the loop with a contextful error
/// instead of silently substituting a plan.
#[test]
fn generation_failure_surfaces_error() {
    let completer = ScriptedCompleter::new(vec![
        Ok("not a plan".to_string()),
        Ok("also not a plan".to_string()),
    ]);
    let planner = Planner::new(&completer, &ModelConfig::default());
    let executor = ScriptedExecutor::new(vec![]);
    let console = ScriptedConsole::new(vec![], vec![]);

    let err = run_loop(&planner, &executor, &console, "impossible", |_| {}).expect_err("loop");

    assert!(format!("{err:#}").contains("generate plan (attempt 1)"));
    assert!(executor.executed().is_empty());
}
