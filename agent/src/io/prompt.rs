//! Prompt pair builder for plan generation.

use anyhow::Result;
use minijinja::{Environment, context};

const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");
const USER_TEMPLATE: &str = include_str!("prompts/user.md");
const SYSTEM_STRICT_TEMPLATE: &str = include_str!("prompts/system_strict.md");
const USER_STRICT_TEMPLATE: &str = include_str!("prompts/user_strict.md");

/// A rendered system/user pair for one completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerPrompt {
    pub system: String,
    pub user: String,
}

/// Template engine wrapper around minijinja.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("system", SYSTEM_TEMPLATE)
            .expect("system template should be valid");
        env.add_template("user", USER_TEMPLATE)
            .expect("user template should be valid");
        env.add_template("system_strict", SYSTEM_STRICT_TEMPLATE)
            .expect("system_strict template should be valid");
        env.add_template("user_strict", USER_STRICT_TEMPLATE)
            .expect("user_strict template should be valid");
        Self { env }
    }

    /// Render the pair for a first or refined generation attempt.
    ///
    /// `failure` carries the operator's reason from the previous attempt;
    /// blank reasons render the same as `None`.
    pub fn initial(&self, task: &str, failure: Option<&str>) -> Result<PlannerPrompt> {
        Ok(PlannerPrompt {
            system: self.render("system", task, failure)?,
            user: self.render("user", task, failure)?,
        })
    }

    /// Render the stricter pair used after an unusable model reply.
    pub fn strict(&self, task: &str, failure: Option<&str>) -> Result<PlannerPrompt> {
        Ok(PlannerPrompt {
            system: self.render("system_strict", task, failure)?,
            user: self.render("user_strict", task, failure)?,
        })
    }

    fn render(&self, name: &str, task: &str, failure: Option<&str>) -> Result<String> {
        let template = self.env.get_template(name)?;
        let rendered = template.render(context! {
            task => task.trim(),
            failure => failure.map(str::trim).filter(|s| !s.is_empty()),
        })?;
        Ok(rendered)
    }
}

impl Default for PromptEngine {
    fn default() -> Self {
        Self::new()
    }
}
