//! Speech-to-text strategies.
//!
//! Like `InterviewProvider`, transcription never fails from the caller's
//! point of view: a provider error is logged and the mock transcript is
//! returned in its place.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::Config;
use crate::llm_client::{GeminiClient, OpenAiClient};
use crate::models::audio::{SpeechResult, TranscriptSegment};

/// 16 kHz mono, 16-bit samples.
const MOCK_BYTES_PER_SECOND: f64 = 32_000.0;
const MOCK_CONFIDENCE: f64 = 0.95;
const MOCK_WORDS_PER_SEGMENT: usize = 5;

const MOCK_TEXTS: &[(&str, &str)] = &[
    (
        "intro",
        "Hello, my name is John Smith and I'm applying for the software developer position. I have five years of experience in web development and I'm excited about this opportunity.",
    ),
    (
        "experience",
        "In my current role, I've been leading a team of three developers working on a customer-facing web application. We've improved performance by 40% and reduced bug reports by implementing a comprehensive testing strategy.",
    ),
    (
        "challenge",
        "The biggest challenge I faced was when our main database server crashed a week before a major product launch. I coordinated with the infrastructure team to restore from backups and implemented a more robust replication strategy to prevent similar issues in the future.",
    ),
    (
        "strength",
        "I believe my greatest strength is my ability to communicate technical concepts to non-technical stakeholders. This has been particularly valuable when working with product managers and designers to ensure we're building the right solutions.",
    ),
    (
        "weakness",
        "One area I'm working to improve is my time management when dealing with multiple competing priorities. I've started using the Pomodoro technique and more structured planning to ensure I'm allocating appropriate time to each task.",
    ),
];

const MOCK_DEFAULT_TEXT: &str = "Thank you for the opportunity to interview for this position. I believe my skills and experience make me a strong candidate, and I'm excited about the possibility of joining your team.";

/// An uploaded recording, read into memory for the provider call.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    /// File name as uploaded by the client.
    pub original_name: String,
    /// Lower-case, without the dot.
    pub extension: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, original_name: &str, stored_path: &Path) -> Self {
        let extension = stored_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        Self {
            bytes,
            original_name: original_name.to_string(),
            extension,
        }
    }

    fn mime_type(&self) -> &'static str {
        match self.extension.as_str() {
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            "m4a" => "audio/mp4",
            "ogg" => "audio/ogg",
            "webm" => "audio/webm",
            _ => "application/octet-stream",
        }
    }
}

#[async_trait]
pub trait SpeechToText: Send + Sync {
    fn name(&self) -> &'static str;

    async fn transcribe(&self, clip: &AudioClip) -> SpeechResult;
}

// ────────────────────────────────────────────────────────────────────────────
// OpenAI Whisper
// ────────────────────────────────────────────────────────────────────────────

pub struct WhisperTranscriber {
    client: OpenAiClient,
}

impl WhisperTranscriber {
    pub fn new(client: OpenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    fn name(&self) -> &'static str {
        "whisper"
    }

    async fn transcribe(&self, clip: &AudioClip) -> SpeechResult {
        match self
            .client
            .transcribe(clip.bytes.clone(), &clip.original_name)
            .await
        {
            Ok(t) => SpeechResult {
                text: t.text,
                confidence: None,
                duration: t.duration,
                language: t.language,
                segments: t
                    .segments
                    .into_iter()
                    .map(|s| TranscriptSegment {
                        id: s.id,
                        start: s.start,
                        end: s.end,
                        text: s.text.trim().to_string(),
                        confidence: None,
                    })
                    .collect(),
            },
            Err(e) => {
                warn!("Whisper transcription failed, using mock transcript: {e}");
                mock_transcription(&clip.original_name, clip.bytes.len())
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini
// ────────────────────────────────────────────────────────────────────────────

pub struct GeminiTranscriber {
    client: GeminiClient,
}

impl GeminiTranscriber {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SpeechToText for GeminiTranscriber {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn transcribe(&self, clip: &AudioClip) -> SpeechResult {
        match self.client.transcribe(&clip.bytes, clip.mime_type()).await {
            Ok(t) if !t.text.trim().is_empty() => SpeechResult {
                text: t.text.trim().to_string(),
                confidence: None,
                duration: Some(estimated_duration(clip.bytes.len())),
                language: t.language,
                segments: Vec::new(),
            },
            Ok(_) => {
                warn!("Gemini returned an empty transcript, using mock transcript");
                mock_transcription(&clip.original_name, clip.bytes.len())
            }
            Err(e) => {
                warn!("Gemini transcription failed, using mock transcript: {e}");
                mock_transcription(&clip.original_name, clip.bytes.len())
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Mock
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct MockTranscriber;

#[async_trait]
impl SpeechToText for MockTranscriber {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn transcribe(&self, clip: &AudioClip) -> SpeechResult {
        mock_transcription(&clip.original_name, clip.bytes.len())
    }
}

fn estimated_duration(byte_len: usize) -> f64 {
    byte_len as f64 / MOCK_BYTES_PER_SECOND
}

/// Canned transcript picked by keyword in the uploaded file name, with
/// five-word segments timed at `0.3 + 0.05 * len(word)` seconds per word.
pub fn mock_transcription(original_name: &str, byte_len: usize) -> SpeechResult {
    let lower = original_name.to_lowercase();
    let text = MOCK_TEXTS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map_or(MOCK_DEFAULT_TEXT, |(_, text)| *text);

    let words: Vec<&str> = text.split_whitespace().collect();
    let mut segments = Vec::new();
    let mut clock = 0.0_f64;
    for (id, chunk) in words.chunks(MOCK_WORDS_PER_SEGMENT).enumerate() {
        let start = clock;
        for word in chunk {
            clock += 0.3 + 0.05 * word.chars().count() as f64;
        }
        segments.push(TranscriptSegment {
            id: id as u32,
            start,
            end: clock,
            text: chunk.join(" "),
            confidence: Some(MOCK_CONFIDENCE),
        });
    }

    SpeechResult {
        text: text.to_string(),
        confidence: Some(MOCK_CONFIDENCE),
        duration: Some(estimated_duration(byte_len)),
        language: Some("en".to_string()),
        segments,
    }
}

/// Whisper when an OpenAI key is set, else Gemini, else the mock.
pub fn select_transcriber(config: &Config) -> Result<Arc<dyn SpeechToText>> {
    let transcriber: Arc<dyn SpeechToText> =
        match (&config.openai_api_key, &config.gemini_api_key) {
            (Some(key), _) => Arc::new(WhisperTranscriber::new(OpenAiClient::new(key.clone())?)),
            (None, Some(key)) => {
                Arc::new(GeminiTranscriber::new(GeminiClient::new(key.clone())?))
            }
            (None, None) => Arc::new(MockTranscriber),
        };
    info!("Speech-to-text: {}", transcriber.name());
    Ok(transcriber)
}
