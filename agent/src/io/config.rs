//! Agent configuration from `agent.toml` plus environment overrides.

use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Agent configuration (TOML).
///
/// Missing fields default to the values below. `AGENT_API_KEY`,
/// `AGENT_BASE_URL`, and `AGENT_MODEL` override the `[model]` table so
/// credentials can stay out of the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentConfig {
    pub model: ModelConfig,
    pub exec: ExecConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Bearer credential for the completion endpoint. Usually supplied via
    /// `AGENT_API_KEY` rather than the file.
    pub api_key: String,

    /// OpenAI-compatible endpoint base, without the `/chat/completions`
    /// suffix.
    pub base_url: String,

    /// Model identifier sent with every completion request.
    pub name: String,

    pub max_tokens: u32,

    pub temperature: f64,

    /// Give up on a completion call after this many seconds. `None` waits
    /// indefinitely.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecConfig {
    /// Single line piped to every command step in case it blocks on
    /// interactive input. Empty disables the pipe. Known limitation: the
    /// default unblocks some prompts but can feed wrong input to others.
    pub command_input: String,

    /// Interpreter argv used to run code steps.
    pub code_command: Vec<String>,

    /// Kill a step after this many seconds. `None` waits indefinitely.
    pub command_timeout_secs: Option<u64>,

    /// Truncate captured stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            name: "meta-llama/Llama-4-Maverick-17B-128E-Instruct".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            request_timeout_secs: None,
        }
    }
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            command_input: "5\n".to_string(),
            code_command: default_code_command(),
            command_timeout_secs: None,
            output_limit_bytes: 100_000,
        }
    }
}

fn default_code_command() -> Vec<String> {
    if cfg!(windows) {
        vec!["python".to_string()]
    } else {
        vec!["python3".to_string()]
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            exec: ExecConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.model.name.trim().is_empty() {
            return Err(anyhow!("model.name must not be empty"));
        }
        if self.model.max_tokens == 0 {
            return Err(anyhow!("model.max_tokens must be > 0"));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(anyhow!("model.temperature must be within 0.0..=2.0"));
        }
        if self.exec.code_command.is_empty() || self.exec.code_command[0].trim().is_empty() {
            return Err(anyhow!("exec.code_command must be a non-empty array"));
        }
        if self.exec.output_limit_bytes == 0 {
            return Err(anyhow!("exec.output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    /// Fail fast when the completion endpoint cannot be reached in
    /// principle. Called once at startup, before the first model call.
    pub fn require_credentials(&self) -> Result<()> {
        if self.model.api_key.trim().is_empty() {
            return Err(anyhow!(
                "missing API key (set AGENT_API_KEY or model.api_key in agent.toml)"
            ));
        }
        if self.model.base_url.trim().is_empty() {
            return Err(anyhow!(
                "missing endpoint (set AGENT_BASE_URL or model.base_url in agent.toml)"
            ));
        }
        Ok(())
    }
}

/// Load config from a TOML file and apply environment overrides.
///
/// If the file is missing, starts from `AgentConfig::default()`.
pub fn load_config(path: &Path) -> Result<AgentConfig> {
    load_config_with(path, |key| env::var(key).ok())
}

/// Same as [`load_config`] with an injectable variable lookup for tests.
pub fn load_config_with<F>(path: &Path, lookup: F) -> Result<AgentConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg: AgentConfig = if path.exists() {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?
    } else {
        AgentConfig::default()
    };

    if let Some(key) = lookup("AGENT_API_KEY") {
        cfg.model.api_key = key;
    }
    if let Some(url) = lookup("AGENT_BASE_URL") {
        cfg.model.base_url = url;
    }
    if let Some(name) = lookup("AGENT_MODEL") {
        cfg.model.name = name;
    }

    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_key: &str) -> Option<String> {
        None
    }

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config_with(&temp.path().join("missing.toml"), no_env).expect("load");
        assert_eq!(cfg, AgentConfig::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("agent.toml");
        fs::write(
            &path,
            r#"
[model]
name = "other-model"
max_tokens = 256

[exec]
command_input = ""
command_timeout_secs = 30
"#,
        )
        .expect("write config");

        let cfg = load_config_with(&path, no_env).expect("load");
        assert_eq!(cfg.model.name, "other-model");
        assert_eq!(cfg.model.max_tokens, 256);
        assert_eq!(cfg.exec.command_input, "");
        assert_eq!(cfg.exec.command_timeout_secs, Some(30));
        // Untouched fields keep their defaults.
        assert_eq!(cfg.exec.output_limit_bytes, 100_000);
    }

    #[test]
    fn env_overrides_file_values() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("agent.toml");
        fs::write(&path, "[model]\napi_key = \"file-key\"\n").expect("write config");

        let cfg = load_config_with(&path, |key| match key {
            "AGENT_API_KEY" => Some("env-key".to_string()),
            "AGENT_BASE_URL" => Some("https://example.test/v1".to_string()),
            _ => None,
        })
        .expect("load");

        assert_eq!(cfg.model.api_key, "env-key");
        assert_eq!(cfg.model.base_url, "https://example.test/v1");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = AgentConfig::default();
        cfg.model.max_tokens = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = AgentConfig::default();
        cfg.exec.code_command = Vec::new();
        assert!(cfg.validate().is_err());

        let mut cfg = AgentConfig::default();
        cfg.model.temperature = 9.0;
        assert!(cfg.validate().is_err());
    }

    /// Verifies the credential check names the environment variables the
    /// operator should set.
    #[test]
    fn missing_credentials_name_the_env_vars() {
        let cfg = AgentConfig::default();
        let err = cfg.require_credentials().unwrap_err();
        assert!(err.to_string().contains("AGENT_API_KEY"));

        let mut cfg = AgentConfig::default();
        cfg.model.api_key = "k".to_string();
        let err = cfg.require_credentials().unwrap_err();
        assert!(err.to_string().contains("AGENT_BASE_URL"));
    }
}
