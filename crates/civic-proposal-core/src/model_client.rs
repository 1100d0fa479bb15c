//! Model client: one chat-completions call per prompt over an OpenAI-compatible endpoint
//! (OpenRouter by default). reqwest only.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-flash-1.5";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Anything that turns a prompt into raw text. The pipeline only sees this trait, so tests can
/// script replies without a network.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Chat-completions client with bearer auth, a request timeout and at most one retry.
pub struct ChatCompletionsClient {
    api_key: String,
    api_url: String,
    model: String,
    max_attempts: u32,
    client: reqwest::Client,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "model client builder failed, using defaults without timeout");
                reqwest::Client::new()
            });
        Self {
            api_key: api_key.into().trim().to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_attempts: 1,
            client,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }

    /// Clamped to 1..=2: one call plus at most one retry.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.clamp(1, 2);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    async fn call_once(&self, prompt: &str) -> Result<String, ModelError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: Some(0.7),
        };

        let res = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: truncate(&text, 512),
            });
        }
        reply_content(&text)
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let mut attempt = 1;
        loop {
            match self.call_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.max_attempts && is_retryable(&e) => {
                    tracing::warn!(attempt, error = %e, "model call failed, retrying once");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// First choice's message content. A well-formed reply with no content is `Ok("")`.
fn reply_content(body: &str) -> Result<String, ModelError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| ModelError::Decode(e.to_string()))?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default())
}

fn is_retryable(err: &ModelError) -> bool {
    match err {
        ModelError::Timeout | ModelError::Call(_) => true,
        ModelError::Status { status, .. } => *status == 429 || *status >= 500,
        ModelError::Unavailable | ModelError::Decode(_) => false,
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempts_are_clamped() {
        let c = ChatCompletionsClient::new("k", DEFAULT_TIMEOUT);
        assert_eq!(c.max_attempts(), 1);
        assert_eq!(c.with_max_attempts(5).max_attempts(), 2);
        let c = ChatCompletionsClient::new("k", DEFAULT_TIMEOUT).with_max_attempts(0);
        assert_eq!(c.max_attempts(), 1);
    }

    #[test]
    fn request_body_is_openai_shaped() {
        let body = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "안녕",
            }],
            temperature: None,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["model"], DEFAULT_MODEL);
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["messages"][0]["content"], "안녕");
        assert!(v.get("temperature").is_none());
    }

    #[test]
    fn reply_content_takes_first_choice() {
        let body = r###"{"choices":[{"message":{"content":"## 1. 제안명"}},{"message":{"content":"x"}}]}"###;
        assert_eq!(reply_content(body).unwrap(), "## 1. 제안명");
    }

    #[test]
    fn empty_reply_is_ok() {
        assert_eq!(reply_content(r#"{"choices":[]}"#).unwrap(), "");
        assert_eq!(reply_content(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap(), "");
    }

    #[test]
    fn malformed_reply_is_decode_error() {
        assert!(matches!(reply_content("<html>"), Err(ModelError::Decode(_))));
    }

    #[test]
    fn only_transient_failures_retry() {
        assert!(is_retryable(&ModelError::Timeout));
        assert!(is_retryable(&ModelError::Status { status: 503, body: String::new() }));
        assert!(is_retryable(&ModelError::Status { status: 429, body: String::new() }));
        assert!(!is_retryable(&ModelError::Status { status: 401, body: String::new() }));
        assert!(!is_retryable(&ModelError::Decode("bad".into())));
    }
}
