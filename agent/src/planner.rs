//! Plan generation with a single stricter retry.

use tracing::{debug, instrument, warn};

use crate::core::error::PlanError;
use crate::core::types::Plan;
use crate::core::validate::parse_plan;
use crate::io::config::ModelConfig;
use crate::io::model::{Completer, CompletionRequest};
use crate::io::prompt::{PlannerPrompt, PromptEngine};

/// Turns a task, plus optional failure context, into a validated [`Plan`].
pub struct Planner<C: Completer> {
    completer: C,
    prompts: PromptEngine,
    max_tokens: u32,
    temperature: f64,
}

impl<C: Completer> Planner<C> {
    pub fn new(completer: C, config: &ModelConfig) -> Self {
        Self {
            completer,
            prompts: PromptEngine::new(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Generate a validated plan for `task`.
    ///
    /// An unusable attempt, whether the request failed or the reply did not
    /// survive validation, is retried once with a stricter prompt. A second
    /// unusable attempt is fatal and returned to the caller.
    #[instrument(skip_all, fields(has_failure = failure.is_some()))]
    pub fn generate(&self, task: &str, failure: Option<&str>) -> Result<Plan, PlanError> {
        let prompt = self
            .prompts
            .initial(task, failure)
            .expect("planning templates should render");
        match self.attempt(&prompt) {
            Ok(plan) => Ok(plan),
            Err(err) => {
                warn!(err = %err, "plan generation failed, retrying with strict prompt");
                let strict = self
                    .prompts
                    .strict(task, failure)
                    .expect("planning templates should render");
                self.attempt(&strict)
            }
        }
    }

    fn attempt(&self, prompt: &PlannerPrompt) -> Result<Plan, PlanError> {
        let request = CompletionRequest {
            system: prompt.system.clone(),
            user: prompt.user.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };
        let reply = self
            .completer
            .complete(&request)
            .map_err(|err| PlanError::Transport(format!("{err:#}")))?;
        debug!(bytes = reply.len(), "model replied");
        parse_plan(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedCompleter, command_step, plan, plan_json};

    fn config() -> ModelConfig {
        ModelConfig::default()
    }

    #[test]
    fn valid_reply_yields_a_plan_on_the_first_call() {
        let expected = plan(vec![command_step("ls")]);
        let completer = ScriptedCompleter::new(vec![Ok(plan_json(&expected))]);
        let planner = Planner::new(&completer, &config());

        let generated = planner.generate("list files", None).expect("generate");

        assert_eq!(generated, expected);
        let requests = completer.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].user, "list files");
        assert_eq!(requests[0].max_tokens, 512);
    }

    /// Verifies an unparseable reply gets exactly one stricter follow-up.
    #[test]
    fn garbage_reply_triggers_one_strict_retry() {
        let expected = plan(vec![command_step("ls")]);
        let completer = ScriptedCompleter::new(vec![
            Ok("Sure! Here is what I would do first.".to_string()),
            Ok(plan_json(&expected)),
        ]);
        let planner = Planner::new(&completer, &config());

        let generated = planner.generate("list files", None).expect("generate");

        assert_eq!(generated, expected);
        let requests = completer.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].user.starts_with("Create a plan for: list files"));
    }

    #[test]
    fn two_garbage_replies_are_fatal() {
        let completer = ScriptedCompleter::new(vec![
            Ok("no json here".to_string()),
            Ok("still no json".to_string()),
        ]);
        let planner = Planner::new(&completer, &config());

        let err = planner.generate("list files", None).expect_err("generate");

        assert!(matches!(err, PlanError::Parse(_)), "unexpected error: {err}");
        assert_eq!(completer.requests().len(), 2);
    }

    #[test]
    fn transport_failure_then_valid_reply_recovers() {
        let expected = plan(vec![command_step("ls")]);
        let completer = ScriptedCompleter::new(vec![
            Err("connection refused".to_string()),
            Ok(plan_json(&expected)),
        ]);
        let planner = Planner::new(&completer, &config());

        let generated = planner.generate("list files", None).expect("generate");

        assert_eq!(generated, expected);
        assert_eq!(completer.requests().len(), 2);
    }

    #[test]
    fn schema_violation_is_retried_then_fatal() {
        let completer = ScriptedCompleter::new(vec![
            Ok(r#"[{"kind": "command", "description": "no payload"}]"#.to_string()),
            Ok(r#"[{"kind": "sorcery", "description": "d", "payload": "p"}]"#.to_string()),
        ]);
        let planner = Planner::new(&completer, &config());

        let err = planner.generate("list files", None).expect_err("generate");

        assert!(matches!(err, PlanError::Schema(_)), "unexpected error: {err}");
    }

    /// Verifies refinement context travels with both attempts.
    #[test]
    fn failure_reason_reaches_both_requests() {
        let completer = ScriptedCompleter::new(vec![
            Ok("garbage".to_string()),
            Ok("[]".to_string()),
        ]);
        let planner = Planner::new(&completer, &config());

        planner
            .generate("create a file", Some("disk full"))
            .expect("generate");

        let requests = completer.requests();
        assert!(requests[0].user.contains("Failure reason: disk full"));
        assert!(requests[1].user.contains("Failure reason: disk full"));
    }
}
