//! LLM backends over HTTP.
//!
//! Enum dispatch over an OpenAI-compatible chat API and the Anthropic
//! Messages API, both via `reqwest`. A backend sends one prompt and returns
//! the raw response text; parsing and validation happen elsewhere.

use serde_json::{Value, json};

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::RunnerError;

/// A prompt ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Role framing and output contract.
    pub system: String,
    /// The serialized context package.
    pub user: String,
}

/// An LLM backend that can process a prompt and return a response.
#[derive(Debug)]
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(HttpBackend),
    /// Anthropic Messages API.
    Anthropic(HttpBackend),
}

/// Connection details shared by both APIs.
#[derive(Debug)]
pub struct HttpBackend {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpBackend {
    fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    async fn post(&self, request: reqwest::RequestBuilder, body: &Value, api: &str) -> Result<Value, RunnerError> {
        let response = request
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| RunnerError::LlmBackend(format!("{api} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(RunnerError::LlmBackend(format!("{api} returned {status}: {error_body}")));
        }

        response
            .json()
            .await
            .map_err(|e| RunnerError::LlmBackend(format!("{api} response parse failed: {e}")))
    }
}

impl LlmBackend {
    /// Create a backend from configuration.
    pub fn new(config: &LlmBackendConfig) -> Self {
        let http = HttpBackend::new(config);
        match config.backend_type {
            BackendType::OpenAi => Self::OpenAi(http),
            BackendType::Anthropic => Self::Anthropic(http),
        }
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }

    /// The configured model.
    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi(http) | Self::Anthropic(http) => &http.model,
        }
    }

    /// Send a prompt and return the response text.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::LlmBackend`] if the HTTP call fails or the
    /// response has no text content.
    pub async fn complete(&self, prompt: &Prompt) -> Result<String, RunnerError> {
        match self {
            Self::OpenAi(http) => {
                let body = json!({
                    "model": http.model,
                    "messages": [
                        {"role": "system", "content": prompt.system},
                        {"role": "user", "content": prompt.user}
                    ],
                    "temperature": 0.7,
                    "max_tokens": 400,
                    "response_format": {"type": "json_object"}
                });
                let request = http
                    .client
                    .post(format!("{}/chat/completions", http.api_url))
                    .header("Authorization", format!("Bearer {}", http.api_key));
                let json = http.post(request, &body, "OpenAI").await?;
                extract_openai_content(&json)
            }
            Self::Anthropic(http) => {
                let body = json!({
                    "model": http.model,
                    "max_tokens": 400,
                    "system": prompt.system,
                    "messages": [
                        {"role": "user", "content": prompt.user}
                    ]
                });
                let request = http
                    .client
                    .post(format!("{}/messages", http.api_url))
                    .header("x-api-key", &http.api_key)
                    .header("anthropic-version", "2023-06-01");
                let json = http.post(request, &body, "Anthropic").await?;
                extract_anthropic_content(&json)
            }
        }
    }
}

/// `choices[0].message.content`
fn extract_openai_content(json: &Value) -> Result<String, RunnerError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| RunnerError::LlmBackend("OpenAI response missing choices[0].message.content".to_owned()))
}

/// `content[0].text`
fn extract_anthropic_content(json: &Value) -> Result<String, RunnerError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| RunnerError::LlmBackend("Anthropic response missing content[0].text".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(backend_type: BackendType) -> LlmBackendConfig {
        LlmBackendConfig {
            backend_type,
            api_url: "http://localhost:11434/v1/".to_owned(),
            api_key: "test".to_owned(),
            model: "test-model".to_owned(),
        }
    }

    #[test]
    fn openai_content_is_extracted() {
        let json = json!({
            "choices": [{"message": {"content": "{\"action\": \"search\"}"}}]
        });
        assert!(extract_openai_content(&json).unwrap().contains("search"));
        assert!(extract_openai_content(&json!({"error": "rate_limit"})).is_err());
    }

    #[test]
    fn anthropic_content_is_extracted() {
        let json = json!({
            "content": [{"type": "text", "text": "{\"action\": \"lurk\"}"}]
        });
        assert!(extract_anthropic_content(&json).unwrap().contains("lurk"));
        assert!(extract_anthropic_content(&json!({"content": []})).is_err());
    }

    #[test]
    fn backend_dispatches_on_type() {
        let backend = LlmBackend::new(&config(BackendType::OpenAi));
        assert_eq!(backend.name(), "openai-compatible");
        assert_eq!(backend.model(), "test-model");
        let backend = LlmBackend::new(&config(BackendType::Anthropic));
        assert_eq!(backend.name(), "anthropic");
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let backend = LlmBackend::new(&config(BackendType::OpenAi));
        assert!(matches!(backend, LlmBackend::OpenAi(ref http) if http.api_url == "http://localhost:11434/v1"));
    }
}
