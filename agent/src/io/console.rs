//! Blocking operator prompts on stdin/stdout.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};

use crate::core::types::{Approval, Plan, Verdict};

/// Operator-facing gates of the loop.
///
/// Every method blocks until the operator answers; there is no timeout.
/// Tests use a scripted console instead of the real terminal.
pub trait Console {
    /// Obtain the task when none was given on the command line.
    fn read_task(&self) -> Result<String>;

    /// Present the plan and block for an explicit accept/reject.
    fn review_plan(&self, plan: &Plan) -> Result<Approval>;

    /// Ask whether the task genuinely succeeded. On "no", also collects the
    /// free-text reason required for the next refinement round.
    fn judge_outcome(&self) -> Result<Verdict>;
}

/// Console over the process's stdin/stdout.
pub struct StdConsole;

impl StdConsole {
    fn prompt_line(&self, prompt: &str) -> Result<String> {
        print!("{prompt}");
        io::stdout().flush().context("flush stdout")?;
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .context("read operator input")?;
        if read == 0 {
            bail!("stdin closed while waiting for operator input");
        }
        Ok(line.trim().to_string())
    }

    fn prompt_yes_no(&self, prompt: &str) -> Result<bool> {
        loop {
            let answer = self.prompt_line(prompt)?;
            match parse_yes_no(&answer) {
                Some(value) => return Ok(value),
                None => println!("Please enter 'yes' or 'no'"),
            }
        }
    }
}

impl Console for StdConsole {
    fn read_task(&self) -> Result<String> {
        self.prompt_line("Enter your task: ")
    }

    fn review_plan(&self, plan: &Plan) -> Result<Approval> {
        let rendered = serde_json::to_string_pretty(plan).context("render plan")?;
        println!("\nGenerated plan:");
        println!("{rendered}");
        if self.prompt_yes_no("\nDo you want to execute this plan? (yes/no): ")? {
            Ok(Approval::Approved)
        } else {
            Ok(Approval::Rejected)
        }
    }

    fn judge_outcome(&self) -> Result<Verdict> {
        if self.prompt_yes_no("\nWas the task successful? (yes/no): ")? {
            return Ok(Verdict::Success);
        }
        let reason = self.prompt_line("What was the issue? ")?;
        Ok(Verdict::Failure { reason })
    }
}

/// Interpret an operator answer. Accepts `yes`/`y`/`no`/`n`, any case.
/// `None` means the caller should re-prompt.
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "yes" | "y" => Some(true),
        "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_answers_parse_true() {
        for answer in ["yes", "y", "YES", "Y", " yes "] {
            assert_eq!(parse_yes_no(answer), Some(true), "answer: {answer:?}");
        }
    }

    #[test]
    fn negative_answers_parse_false() {
        for answer in ["no", "n", "NO", "N", "\tno"] {
            assert_eq!(parse_yes_no(answer), Some(false), "answer: {answer:?}");
        }
    }

    #[test]
    fn anything_else_requests_a_reprompt() {
        for answer in ["", "maybe", "yess", "ok", "nope"] {
            assert_eq!(parse_yes_no(answer), None, "answer: {answer:?}");
        }
    }
}
