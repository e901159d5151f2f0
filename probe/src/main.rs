//! Endpoint smoke test for the agent's model configuration.
//!
//! Sends one planning request and prints the raw reply so an operator can
//! check connectivity and reply shape before starting an interactive
//! session.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use agent::core::validate::parse_plan;
use agent::io::config::load_config;
use agent::io::model::{Completer, CompletionRequest, HttpCompleter};
use agent::io::prompt::PromptEngine;

const DEFAULT_TASK: &str = "Create a simple Python script that prints 'Hello, World!'";

#[derive(Parser)]
#[command(name = "probe", version, about = "Endpoint smoke test for the agent")]
struct Cli {
    /// Task to request a plan for.
    #[arg(default_value = DEFAULT_TASK)]
    task: String,

    /// Path to the agent configuration file.
    #[arg(long, default_value = "agent.toml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    agent::logging::init();
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    config.require_credentials()?;

    println!("Testing endpoint: {}", config.model.base_url);
    println!("\nTask: {}", cli.task);

    let completer = HttpCompleter::new(&config.model)?;
    let prompt = PromptEngine::new().initial(&cli.task, None)?;
    let reply = completer.complete(&CompletionRequest {
        system: prompt.system,
        user: prompt.user,
        max_tokens: config.model.max_tokens,
        temperature: config.model.temperature,
    })?;

    println!("\nRaw model reply:\n{reply}");
    match parse_plan(&reply) {
        Ok(plan) => println!("\nReply parsed as a plan with {} step(s).", plan.steps.len()),
        Err(err) => println!("\nReply did not parse as a plan: {err}"),
    }
    println!("\nEndpoint test completed successfully!");
    Ok(())
}
