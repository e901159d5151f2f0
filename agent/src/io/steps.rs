//! Step execution against the host system.
//!
//! The [`StepExecutor`] trait decouples the loop from real subprocesses.
//! [`HostExecutor`] runs command steps through the platform shell and code
//! steps via a transient source file handed to the configured interpreter.

use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::core::shell::{CommandAction, adapt_command};
use crate::core::types::{ExecutionResult, Step, StepKind};
use crate::io::config::ExecConfig;
use crate::io::process::{CommandOutput, run_command};

/// Abstraction over step execution backends.
pub trait StepExecutor {
    /// Run one step and capture its outcome.
    ///
    /// A step that cannot be launched is reported inside
    /// [`ExecutionResult`] (exit code 1, message in stderr) rather than as
    /// `Err`; the operator judges the outcome either way.
    fn execute(&self, step: &Step) -> Result<ExecutionResult>;
}

/// Runtime knobs for [`HostExecutor`], derived from [`ExecConfig`].
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Line piped to command steps; empty disables the pipe.
    pub command_input: String,
    /// Interpreter argv for code steps.
    pub code_command: Vec<String>,
    pub timeout: Option<Duration>,
    pub output_limit_bytes: usize,
    /// Directory for transient code files. `None` uses the system temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl ExecOptions {
    pub fn from_config(config: &ExecConfig) -> Self {
        Self {
            command_input: config.command_input.clone(),
            code_command: config.code_command.clone(),
            timeout: config.command_timeout_secs.map(Duration::from_secs),
            output_limit_bytes: config.output_limit_bytes,
            scratch_dir: None,
        }
    }
}

/// Executor that runs steps on the host, with the operator's privileges.
pub struct HostExecutor {
    options: ExecOptions,
}

impl HostExecutor {
    pub fn new(options: ExecOptions) -> Self {
        Self { options }
    }

    fn run_command_step(&self, payload: &str) -> Result<ExecutionResult> {
        let command_line = match adapt_command(payload) {
            CommandAction::Run(line) => line,
            CommandAction::Skip(note) => {
                debug!(note, "skipping command on this platform");
                return Ok(ExecutionResult {
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_code: 0,
                });
            }
        };

        let cmd = shell_command(&command_line);
        let stdin = (!self.options.command_input.is_empty())
            .then_some(self.options.command_input.as_bytes());
        let output = run_command(cmd, stdin, self.options.timeout, self.options.output_limit_bytes)?;
        Ok(into_result(output))
    }

    fn run_code_step(&self, payload: &str) -> Result<ExecutionResult> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("step-").suffix(".py");
        let mut file = match &self.options.scratch_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .context("create code file")?;
        file.write_all(payload.as_bytes()).context("write code file")?;
        file.flush().context("flush code file")?;

        let (interpreter, extra_args) = self
            .options
            .code_command
            .split_first()
            .context("exec.code_command must not be empty")?;
        let mut cmd = Command::new(interpreter);
        cmd.args(extra_args).arg(file.path());

        // `file` lives until after the child exits, then its drop removes
        // the artifact on success and failure paths alike.
        let output = run_command(cmd, None, self.options.timeout, self.options.output_limit_bytes)?;
        Ok(into_result(output))
    }
}

impl StepExecutor for HostExecutor {
    #[instrument(skip_all, fields(kind = ?step.kind))]
    fn execute(&self, step: &Step) -> Result<ExecutionResult> {
        let attempt = match step.kind {
            StepKind::Command => self.run_command_step(&step.payload),
            StepKind::Code => self.run_code_step(&step.payload),
        };
        Ok(match attempt {
            Ok(result) => result,
            Err(err) => {
                warn!(err = %err, "step could not be launched");
                ExecutionResult {
                    stdout: String::new(),
                    stderr: format!("{err:#}"),
                    exit_code: 1,
                }
            }
        })
    }
}

fn shell_command(command_line: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command_line);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command_line);
        cmd
    }
}

fn into_result(output: CommandOutput) -> ExecutionResult {
    let mut stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    stdout.push_str(&output.stdout_truncated_notice());
    let mut stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    stderr.push_str(&output.stderr_truncated_notice());
    let exit_code = if output.timed_out {
        stderr.push_str("\n[command timed out]\n");
        -1
    } else {
        output.status.code().unwrap_or(-1)
    };
    ExecutionResult {
        stdout,
        stderr,
        exit_code,
    }
}
