use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Behavioral,
    Technical,
    Experience,
    #[default]
    #[serde(other)]
    General,
}

impl QuestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Behavioral => "behavioral",
            QuestionCategory::Technical => "technical",
            QuestionCategory::Experience => "experience",
            QuestionCategory::General => "general",
        }
    }

    /// Lenient parse of provider output: case-insensitive, unknown → General.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "behavioral" | "behavioural" => QuestionCategory::Behavioral,
            "technical" => QuestionCategory::Technical,
            "experience" => QuestionCategory::Experience,
            _ => QuestionCategory::General,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question_id: String,
    #[serde(alias = "question_text")]
    pub text: String,
    #[serde(rename = "type", alias = "question_type", default)]
    pub category: QuestionCategory,
    /// 1 (warm-up) to 5 (hard).
    pub difficulty: u8,
    pub order: usize,
}

impl InterviewQuestion {
    pub fn new(
        session_id: Uuid,
        order: usize,
        text: impl Into<String>,
        category: QuestionCategory,
        difficulty: u8,
    ) -> Self {
        Self {
            question_id: format!("{session_id}_{order}"),
            text: text.into(),
            category,
            difficulty: difficulty.clamp(1, 5),
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewResponse {
    pub question_index: usize,
    pub response_text: String,
    #[serde(default)]
    pub audio_file_path: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewFeedback {
    pub question_index: usize,
    #[serde(default)]
    pub question_id: String,
    /// 0.0 – 10.0
    pub overall_score: f64,
    pub content_feedback: String,
    pub tone_feedback: String,
    pub clarity_feedback: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Session lifecycle. `Abandoned` is part of the stored schema but nothing
/// assigns it; sessions only ever move `InProgress -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSession {
    pub session_id: Uuid,
    pub resume_id: Uuid,
    pub questions: Vec<InterviewQuestion>,
    pub current_question_index: usize,
    #[serde(default)]
    pub responses: Vec<InterviewResponse>,
    #[serde(default)]
    pub feedback: Vec<InterviewFeedback>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSummary {
    pub session_id: Uuid,
    pub resume_id: Uuid,
    pub question_count: usize,
    pub average_score: f64,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
    pub overall_feedback: String,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_category_becomes_general() {
        let c: QuestionCategory = serde_json::from_str(r#""background""#).unwrap();
        assert_eq!(c, QuestionCategory::General);
        let c: QuestionCategory = serde_json::from_str(r#""behavioral""#).unwrap();
        assert_eq!(c, QuestionCategory::Behavioral);
    }

    #[test]
    fn test_from_label_is_lenient() {
        assert_eq!(QuestionCategory::from_label(" Technical "), QuestionCategory::Technical);
        assert_eq!(QuestionCategory::from_label("BEHAVIORAL"), QuestionCategory::Behavioral);
        assert_eq!(QuestionCategory::from_label("situational"), QuestionCategory::General);
    }

    #[test]
    fn test_question_serializes_category_as_type() {
        let q = InterviewQuestion::new(Uuid::nil(), 2, "Why Rust?", QuestionCategory::Technical, 9);
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "technical");
        assert_eq!(value["difficulty"], 5);
        assert_eq!(
            value["question_id"],
            "00000000-0000-0000-0000-000000000000_2"
        );
    }

    #[test]
    fn test_session_status_snake_case() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::InProgress).unwrap(),
            r#""in_progress""#
        );
    }
}
