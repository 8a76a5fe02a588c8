//! LLM Client: the single point of entry for all hosted-model calls.
//!
//! ARCHITECTURAL RULE: No other module may call OpenAI or Gemini directly.
//! Text completions go through `LlmClient`; speech goes through the
//! transcription methods on the concrete clients.
//!
//! No retries: a failed call is reported once and the caller falls back to
//! its deterministic mock.
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::debug;

pub mod gemini;
pub mod openai;
pub mod prompts;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Per-request timeout for every provider call.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Turns a non-2xx response into `LlmError::Api`. OpenAI and Gemini both
/// wrap failures as `{"error": {"message": ...}}`; anything else is kept raw.
pub(crate) async fn api_error(response: reqwest::Response) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

/// Builds the shared HTTP client with the provider timeout applied.
pub(crate) fn http_client() -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}

/// A hosted text-completion backend (OpenAI chat, Gemini generateContent).
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Short backend label used in logs ("openai", "gemini").
    fn name(&self) -> &'static str;

    fn model(&self) -> &str;

    /// Sends one system + user turn and returns the raw text answer.
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError>;
}

/// Cheap-to-clone handle around the backend chosen at startup.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn CompletionBackend>,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    pub async fn call(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let text = self.backend.complete(prompt, system).await?;
        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }
        debug!(
            "{} call succeeded: {} chars returned",
            self.backend.name(),
            text.len()
        );
        Ok(text)
    }

    /// Calls the model and deserializes its answer as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let text = self.call(prompt, system).await?;
        serde_json::from_str(extract_json(&text)).map_err(LlmError::Parse)
    }
}

/// Isolates the JSON payload in model output: strips ```json fences, and
/// otherwise trims to the outermost `{ … }` when prose surrounds it.
pub fn extract_json(text: &str) -> &str {
    let text = strip_json_fences(text);
    if text.starts_with('{') || text.starts_with('[') {
        return text;
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_extract_json_from_surrounding_prose() {
        let input = "Sure! Here is the analysis:\n{\"score\": 7}\nHope this helps.";
        assert_eq!(extract_json(input), "{\"score\": 7}");
    }

    #[test]
    fn test_extract_json_keeps_top_level_array() {
        assert_eq!(extract_json(" [1, 2] "), "[1, 2]");
    }

    #[tokio::test]
    async fn test_call_json_parses_fenced_reply() {
        let client = ScriptedBackend::replying("```json\n{\"score\": 8}\n```");
        let value: serde_json::Value = client.call_json("p", "s").await.unwrap();
        assert_eq!(value["score"], 8);
    }

    #[tokio::test]
    async fn test_blank_reply_is_empty_content() {
        let client = ScriptedBackend::replying("   ");
        let err = client.call("p", "s").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_backend_error_is_propagated() {
        let client = ScriptedBackend::failing(503);
        let err = client.call_json::<serde_json::Value>("p", "s").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 503, .. }));
    }
}
