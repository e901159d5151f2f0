//! Interactive plan-and-execute agent CLI.
//!
//! Reads a task from the command line or the operator prompt, asks the
//! configured model for a step plan, and walks the operator through
//! approval, execution, and judgment until the task succeeds or the
//! operator rejects a plan.

use std::path::PathBuf;
use std::process;

use anyhow::{Result, bail};
use clap::Parser;

use agent::exit_codes;
use agent::io::config::load_config;
use agent::io::console::{Console, StdConsole};
use agent::io::model::HttpCompleter;
use agent::io::steps::{ExecOptions, HostExecutor};
use agent::looping::{LoopEvent, LoopStop, run_loop};
use agent::planner::Planner;

#[derive(Parser)]
#[command(
    name = "agent",
    version,
    about = "Interactive plan-and-execute agent loop"
)]
struct Cli {
    /// Task to accomplish; prompts interactively when omitted.
    #[arg(trailing_var_arg = true)]
    task: Vec<String>,

    /// Path to the agent configuration file.
    #[arg(long, default_value = "agent.toml")]
    config: PathBuf,
}

fn main() {
    agent::logging::init();
    match run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    config.require_credentials()?;

    let console = StdConsole;
    let task = if cli.task.is_empty() {
        console.read_task()?
    } else {
        cli.task.join(" ")
    };
    let task = task.trim().to_string();
    if task.is_empty() {
        bail!("task must not be empty");
    }
    println!("\nTask: {task}");

    let completer = HttpCompleter::new(&config.model)?;
    let planner = Planner::new(completer, &config.model);
    let executor = HostExecutor::new(ExecOptions::from_config(&config.exec));

    let outcome = run_loop(&planner, &executor, &console, &task, print_event)?;
    Ok(match outcome.stop {
        LoopStop::Succeeded => {
            println!("\nTask completed successfully!");
            exit_codes::OK
        }
        LoopStop::Rejected => {
            println!("Plan rejected. Exiting.");
            exit_codes::REJECTED
        }
    })
}

/// Render loop progress for the operator.
fn print_event(event: &LoopEvent) {
    match event {
        LoopEvent::AttemptStarted { attempt } => println!("\nAttempt {attempt}:"),
        LoopEvent::StepStarted {
            index,
            total,
            description,
        } => {
            println!("\n[{}/{}] Executing: {}", index + 1, total, description);
        }
        LoopEvent::StepFinished { result, .. } => {
            if !result.stdout.trim().is_empty() {
                println!("Output: {}", result.stdout.trim_end());
            }
            if !result.success() {
                println!("Error: {}", result.stderr.trim_end());
            }
        }
        LoopEvent::Refining => println!("\nRefining the plan..."),
    }
}
