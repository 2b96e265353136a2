// src/llm/mod.rs

use crate::config::Settings;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;

pub mod retry;

pub use retry::{RetryPolicy, RetryingModel, Sleeper, ThreadSleeper};

/// Matches the OpenAI SDK default; the provider decides when to give up.
const LLM_TIMEOUT: Duration = Duration::from_secs(600);

/// One system/user message pair sent to the model.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

impl ChatRequest {
    /// Deterministic request (temperature 0).
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OPENAI_API_KEY is not configured")]
    MissingApiKey,

    #[error("LLM response missing message content")]
    EmptyResponse,
}

impl LlmError {
    /// Rate limits and transient server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::Status { status: 429 | 500 | 503, .. })
    }
}

/// Anything that can turn a [`ChatRequest`] into a single text completion.
pub trait ChatModel: Send + Sync {
    fn complete(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAIClient {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    base_url: String,
    pub model: String,
}

impl OpenAIClient {
    pub fn new(settings: &Settings) -> Result<Self, LlmError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(LLM_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key: settings.openai_api_key.clone(),
            base_url: settings.openai_base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }
}

impl ChatModel for OpenAIClient {
    fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let url = format!("{}/chat/completions", self.base_url);

        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "temperature": request.temperature,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json()?;
        message_content(&body)
            .map(str::to_string)
            .ok_or(LlmError::EmptyResponse)
    }
}

fn message_content(body: &Value) -> Option<&str> {
    body.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}
