//! Completion transport for plan generation.
//!
//! The [`Completer`] trait decouples the planner from the concrete model
//! backend. Tests use scripted completers that return predetermined text
//! without any network traffic.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::io::config::ModelConfig;

/// Parameters for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Abstraction over text-generation backends.
pub trait Completer {
    /// Return the raw completion text for the request.
    fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

impl<T: Completer + ?Sized> Completer for &T {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }
}

/// Completer backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct HttpCompleter {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl HttpCompleter {
    /// Build a client for the configured endpoint.
    ///
    /// With `request_timeout_secs` unset the call blocks until the provider
    /// answers; plan generation regularly exceeds reqwest's default timeout.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let builder = match config.request_timeout_secs {
            Some(secs) => reqwest::blocking::Client::builder().timeout(Duration::from_secs(secs)),
            None => reqwest::blocking::Client::builder().timeout(None::<Duration>),
        };
        let client = builder.build().context("build http client")?;
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint,
            model: config.name.clone(),
        })
    }
}

impl Completer for HttpCompleter {
    #[instrument(skip_all, fields(model = %self.model))]
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .context("send completion request")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(anyhow!(
                "completion endpoint returned {status}: {}",
                snippet(&detail, 200)
            ));
        }

        let parsed: ChatResponse = response.json().context("decode completion response")?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("completion response has no choices"))?;
        debug!(bytes = content.len(), "received completion");
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// First `limit` bytes of `text`, marking elision.
fn snippet(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verifies the request serializes to the shape the endpoint expects.
    #[test]
    fn chat_request_wire_shape_is_stable() {
        let body = ChatRequest {
            model: "test-model",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "be brief",
                },
                ChatMessage {
                    role: "user",
                    content: "hello",
                },
            ],
            max_tokens: 512,
            temperature: 0.7,
        };

        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(value["model"], "test-model");
        assert_eq!(value["max_tokens"], 512);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "hello");
    }

    #[test]
    fn chat_response_content_is_extracted() {
        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": "[]"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).expect("parse");
        assert_eq!(parsed.choices[0].message.content, "[]");
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        assert_eq!(snippet("short", 200), "short");
        let long = "é".repeat(200);
        let cut = snippet(&long, 3);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= 6);
    }

    #[test]
    fn endpoint_url_strips_trailing_slash() {
        let config = ModelConfig {
            base_url: "https://example.test/v1/".to_string(),
            ..ModelConfig::default()
        };
        let completer = HttpCompleter::new(&config).expect("build");
        assert_eq!(completer.endpoint, "https://example.test/v1/chat/completions");
    }
}
