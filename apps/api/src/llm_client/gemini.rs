//! Gemini transport: `generateContent` for text and inline-audio transcription.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{api_error, extract_json, http_client, CompletionBackend, LlmError};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const TEXT_MODEL: &str = "gemini-1.5-flash";
const TEMPERATURE: f32 = 0.4;

const TRANSCRIBE_PROMPT: &str = "Transcribe this interview answer verbatim. \
    Respond with JSON only: {\"text\": \"<transcript>\", \"language\": \"<ISO 639-1 code>\"}";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        Some(text)
    }
}

/// What Gemini returns for an audio transcription prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiTranscript {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: http_client()?,
            api_key,
        })
    }

    async fn generate(&self, request: &GenerateRequest<'_>) -> Result<String, LlmError> {
        let url = format!("{API_BASE}/{TEXT_MODEL}:generateContent");
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let body: GenerateResponse = response.json().await?;
        body.into_text()
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    /// Sends the audio inline (base64) and asks for a JSON transcript.
    pub async fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<GeminiTranscript, LlmError> {
        let request = GenerateRequest {
            system_instruction: None,
            contents: vec![Content {
                role: Some("user"),
                parts: vec![
                    Part::Text {
                        text: TRANSCRIBE_PROMPT,
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: STANDARD.encode(audio),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };
        let text = self.generate(&request).await?;
        Ok(serde_json::from_str(extract_json(&text))?)
    }
}

#[async_trait]
impl CompletionBackend for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        TEXT_MODEL
    }

    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::Text { text: system }],
            }),
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part::Text { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json",
            },
        };
        self.generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape_is_camel_case() {
        let request = GenerateRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::Text { text: "sys" }],
            }),
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part::Inline {
                    inline_data: InlineData {
                        mime_type: "audio/wav".into(),
                        data: STANDARD.encode(b"abc"),
                    },
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "sys");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(
            value["contents"][0]["parts"][0]["inlineData"]["mimeType"],
            "audio/wav"
        );
        assert_eq!(value["contents"][0]["parts"][0]["inlineData"]["data"], "YWJj");
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}],"role":"model"}}]}"#;
        let body: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.into_text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn test_blocked_response_has_no_text() {
        let body: GenerateResponse = serde_json::from_str(r#"{"candidates":[{}]}"#).unwrap();
        assert!(body.into_text().is_none());
        let body: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(body.into_text().is_none());
    }
}
