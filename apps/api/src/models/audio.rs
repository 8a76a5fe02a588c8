use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_PROCESSING: &str = "processing";
pub const STATUS_ERROR: &str = "error";

/// Accepted audio upload extensions (lower-case, with dot).
pub const AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".m4a", ".ogg", ".webm"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub id: u32,
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Stored transcription result (`transcription.json`) and the poll response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub transcription_id: Uuid,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

impl Transcription {
    pub fn processing(transcription_id: Uuid, message: &str) -> Self {
        Self {
            transcription_id,
            status: STATUS_PROCESSING.to_string(),
            message: Some(message.to_string()),
            text: None,
            confidence: None,
            duration: None,
            language: None,
            segments: Vec::new(),
        }
    }

    /// Task failures already carry an `Error ...` prefix; bare messages get one.
    pub fn failed(transcription_id: Uuid, error: &str) -> Self {
        let text = if error.starts_with("Error") {
            error.to_string()
        } else {
            format!("Error: {error}")
        };
        Self {
            status: STATUS_ERROR.to_string(),
            text: Some(text),
            message: None,
            ..Self::processing(transcription_id, "")
        }
    }
}

/// Output of a speech-to-text strategy, before it is stamped with an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechResult {
    pub text: String,
    pub confidence: Option<f64>,
    pub duration: Option<f64>,
    pub language: Option<String>,
    pub segments: Vec<TranscriptSegment>,
}

impl SpeechResult {
    pub fn into_transcription(self, transcription_id: Uuid) -> Transcription {
        Transcription {
            transcription_id,
            status: STATUS_COMPLETED.to_string(),
            message: None,
            text: Some(self.text),
            confidence: self.confidence,
            duration: self.duration,
            language: self.language,
            segments: self.segments,
        }
    }
}
