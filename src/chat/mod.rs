//! Chat-completion proxy.
//!
//! [`CompletionClient`] wraps `reqwest::Client` and turns one user message
//! into one OpenAI-style chat-completion call: a fixed system prompt plus the
//! user's text, fixed model parameters, no history, no retries.
//!
//! ## Error handling
//!
//! Each failure stage has its own [`ChatError`] variant so the route layer
//! can map it onto a status code. Upstream error bodies are logged at debug
//! level only and never returned to the caller.

pub mod prompt;

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ChatConfig;

/// Model requested from the completion API.
pub const MODEL: &str = "gpt-3.5-turbo";
/// Upper bound on generated tokens per reply.
pub const MAX_TOKENS: u32 = 150;
pub const TEMPERATURE: f64 = 0.7;

/// Outbound request body.
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'static str,
    pub messages: Vec<Message<'a>>,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// One entry of the `messages` array.
#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> CompletionRequest<'a> {
    /// System prompt followed by the caller's raw text.
    pub fn new(user_message: &'a str) -> Self {
        Self {
            model: MODEL,
            messages: vec![
                Message {
                    role: "system",
                    content: prompt::SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: user_message,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

/// The subset of the completion response we read. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Content of the first choice, if present and non-empty.
    pub fn into_reply(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.is_empty())
    }
}

/// Failures of a single completion call, in the order they can occur.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("completion API key not configured")]
    NotConfigured,
    #[error("failed to encode completion request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to build completion request: {0}")]
    Build(reqwest::Error),
    #[error("completion request failed: {0}")]
    Transport(reqwest::Error),
    #[error("completion API returned HTTP {0}")]
    Upstream(reqwest::StatusCode),
    #[error("failed to decode completion response: {0}")]
    Decode(String),
    #[error("completion response has no content")]
    EmptyReply,
}

/// HTTP client for the upstream completion endpoint.
pub struct CompletionClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl CompletionClient {
    /// Build a client for `config.api_url`. An empty `api_key` leaves the
    /// client disabled: [`CompletionClient::complete`] fails fast.
    pub fn new(config: &ChatConfig, api_key: &str) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
            api_key: api_key.to_string(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Send `message` with the system prompt and return the reply text.
    pub async fn complete(&self, message: &str) -> Result<String, ChatError> {
        if !self.is_configured() {
            return Err(ChatError::NotConfigured);
        }

        let body = serde_json::to_vec(&CompletionRequest::new(message))?;
        let request = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .build()
            .map_err(ChatError::Build)?;

        let resp = self
            .http
            .execute(request)
            .await
            .map_err(ChatError::Transport)?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            if let Ok(text) = resp.text().await {
                debug!("Completion API error body: {text}");
            }
            return Err(ChatError::Upstream(status));
        }

        // The client timeout also covers the body, so a stalled read is a transport failure.
        let bytes = resp.bytes().await.map_err(ChatError::Transport)?;
        let parsed: CompletionResponse =
            serde_json::from_slice(&bytes).map_err(|e| ChatError::Decode(e.to_string()))?;

        parsed.into_reply().ok_or(ChatError::EmptyReply)
    }
}
