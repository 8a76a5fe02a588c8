//! AiProvider: OpenAI- or Gemini-backed strategy with mock fallback.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::mock;
use super::prompts::{
    FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM, QUESTIONS_PROMPT_TEMPLATE, QUESTIONS_SYSTEM,
    RESUME_PROMPT_TEMPLATE, RESUME_SYSTEM, SUMMARY_PROMPT_TEMPLATE, SUMMARY_SYSTEM,
};
use super::{InterviewProvider, ProviderKind, SummaryNarrative};
use crate::llm_client::prompts::{clip, MAX_PROMPT_DOCUMENT_CHARS};
use crate::llm_client::LlmClient;
use crate::models::interview::{
    InterviewFeedback, InterviewQuestion, InterviewSession, QuestionCategory,
};
use crate::models::resume::ResumeData;

const DEFAULT_DIFFICULTY: f64 = 3.0;

#[derive(Debug, Deserialize)]
struct QuestionSet {
    #[serde(default)]
    questions: Vec<QuestionDraft>,
}

#[derive(Debug, Deserialize)]
struct QuestionDraft {
    #[serde(default, alias = "question")]
    text: String,
    #[serde(default, rename = "type", alias = "category")]
    category: String,
    #[serde(default = "default_difficulty")]
    difficulty: f64,
}

fn default_difficulty() -> f64 {
    DEFAULT_DIFFICULTY
}

/// Provider feedback before it is stamped with index/id/timestamp.
/// `confidence_feedback` is accepted for `tone_feedback`.
#[derive(Debug, Deserialize)]
struct FeedbackDraft {
    #[serde(default, alias = "overall_score")]
    score: Option<f64>,
    #[serde(default)]
    content_feedback: Option<String>,
    #[serde(default, alias = "confidence_feedback")]
    tone_feedback: Option<String>,
    #[serde(default)]
    clarity_feedback: Option<String>,
    #[serde(default)]
    strengths: Option<Vec<String>>,
    #[serde(default)]
    improvements: Option<Vec<String>>,
}

impl FeedbackDraft {
    /// Fields the model left out keep the neutral default.
    fn into_feedback(self, question: &InterviewQuestion, question_index: usize) -> InterviewFeedback {
        let base = mock::default_feedback(question_index, &question.question_id);
        InterviewFeedback {
            overall_score: self
                .score
                .map_or(base.overall_score, |s| s.clamp(0.0, 10.0)),
            content_feedback: self.content_feedback.unwrap_or(base.content_feedback),
            tone_feedback: self.tone_feedback.unwrap_or(base.tone_feedback),
            clarity_feedback: self.clarity_feedback.unwrap_or(base.clarity_feedback),
            strengths: self.strengths.unwrap_or(base.strengths),
            improvements: self.improvements.unwrap_or(base.improvements),
            question_index: base.question_index,
            question_id: base.question_id,
            timestamp: base.timestamp,
        }
    }
}

pub struct AiProvider {
    kind: ProviderKind,
    llm: LlmClient,
}

impl AiProvider {
    pub fn new(kind: ProviderKind, llm: LlmClient) -> Self {
        Self { kind, llm }
    }
}

#[async_trait]
impl InterviewProvider for AiProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn structure_resume(&self, resume_id: Uuid, raw_text: &str) -> ResumeData {
        let prompt = RESUME_PROMPT_TEMPLATE
            .replace("{resume_text}", clip(raw_text, MAX_PROMPT_DOCUMENT_CHARS));
        match self.llm.call_json::<ResumeData>(&prompt, RESUME_SYSTEM).await {
            Ok(data) => data.finalize(resume_id, raw_text),
            Err(e) => {
                warn!(
                    "{} resume structuring failed for {resume_id}, using mock: {e}",
                    self.llm.backend_name()
                );
                mock::mock_resume(resume_id, raw_text)
            }
        }
    }

    async fn generate_questions(
        &self,
        resume: &ResumeData,
        session_id: Uuid,
        count: usize,
    ) -> Vec<InterviewQuestion> {
        // raw_text duplicates the structured fields and can be long.
        let view = ResumeData {
            raw_text: None,
            ..resume.clone()
        };
        let resume_json = serde_json::to_string_pretty(&view).unwrap_or_default();
        let prompt = QUESTIONS_PROMPT_TEMPLATE
            .replace("{count}", &count.to_string())
            .replace("{resume_json}", clip(&resume_json, MAX_PROMPT_DOCUMENT_CHARS));

        match self.llm.call_json::<QuestionSet>(&prompt, QUESTIONS_SYSTEM).await {
            Ok(set) => set
                .questions
                .into_iter()
                .filter(|d| !d.text.trim().is_empty())
                .enumerate()
                .map(|(order, d)| {
                    InterviewQuestion::new(
                        session_id,
                        order,
                        d.text.trim(),
                        QuestionCategory::from_label(&d.category),
                        d.difficulty.round().clamp(1.0, 5.0) as u8,
                    )
                })
                .collect(),
            Err(e) => {
                warn!(
                    "{} question generation failed for session {session_id}, using mock: {e}",
                    self.llm.backend_name()
                );
                mock::mock_questions(resume, session_id, count)
            }
        }
    }

    async fn analyze_response(
        &self,
        question: &InterviewQuestion,
        question_index: usize,
        response_text: &str,
    ) -> InterviewFeedback {
        let prompt = FEEDBACK_PROMPT_TEMPLATE
            .replace("{question}", &question.text)
            .replace("{category}", question.category.as_str())
            .replace("{difficulty}", &question.difficulty.to_string())
            .replace("{response}", clip(response_text, MAX_PROMPT_DOCUMENT_CHARS));

        match self.llm.call_json::<FeedbackDraft>(&prompt, FEEDBACK_SYSTEM).await {
            Ok(draft) => draft.into_feedback(question, question_index),
            Err(e) => {
                warn!(
                    "{} response analysis failed for {}, using mock: {e}",
                    self.llm.backend_name(),
                    question.question_id
                );
                mock::mock_feedback(question, question_index, response_text)
            }
        }
    }

    async fn summarize(&self, session: &InterviewSession, average_score: f64) -> SummaryNarrative {
        let transcript: Vec<_> = session
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let answer = session
                    .responses
                    .iter()
                    .rev()
                    .find(|r| r.question_index == i)
                    .map(|r| r.response_text.as_str());
                let feedback = session.feedback.iter().rev().find(|f| f.question_index == i);
                json!({
                    "question": q.text,
                    "type": q.category.as_str(),
                    "answer": answer,
                    "score": feedback.map(|f| f.overall_score),
                    "content_feedback": feedback.map(|f| f.content_feedback.as_str()),
                })
            })
            .collect();
        let transcript_json = serde_json::to_string_pretty(&transcript).unwrap_or_default();
        let prompt = SUMMARY_PROMPT_TEMPLATE
            .replace("{average_score}", &format!("{average_score:.1}"))
            .replace("{transcript_json}", clip(&transcript_json, MAX_PROMPT_DOCUMENT_CHARS));

        match self.llm.call_json::<SummaryNarrative>(&prompt, SUMMARY_SYSTEM).await {
            Ok(narrative) => narrative,
            Err(e) => {
                warn!(
                    "{} summary failed for session {}, using mock: {e}",
                    self.llm.backend_name(),
                    session.session_id
                );
                mock::mock_narrative(average_score)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedBackend;
    use chrono::Utc;
    use crate::models::interview::SessionStatus;

    fn provider(client: LlmClient) -> AiProvider {
        AiProvider::new(ProviderKind::OpenAi, client)
    }

    fn question() -> InterviewQuestion {
        InterviewQuestion::new(Uuid::nil(), 0, "Why Rust?", QuestionCategory::Technical, 3)
    }

    #[tokio::test]
    async fn test_resume_fields_are_owned_by_service() {
        let reply = r#"{"resume_id": "00000000-0000-0000-0000-000000000001",
                        "name": "Ada", "skills": null, "status": "draft"}"#;
        let id = Uuid::new_v4();
        let data = provider(ScriptedBackend::replying(reply))
            .structure_resume(id, "Ada\nRust")
            .await;
        assert_eq!(data.resume_id, id);
        assert_eq!(data.name.as_deref(), Some("Ada"));
        assert!(data.skills.is_empty());
        assert_eq!(data.status, "processed");
        assert_eq!(data.raw_text.as_deref(), Some("Ada\nRust"));
    }

    #[tokio::test]
    async fn test_resume_falls_back_to_mock_on_provider_error() {
        let data = provider(ScriptedBackend::failing(500))
            .structure_resume(Uuid::nil(), "Grace Hopper\ngrace@navy.mil")
            .await;
        assert_eq!(data.name.as_deref(), Some("Grace Hopper"));
        assert_eq!(data.email.as_deref(), Some("grace@navy.mil"));
        assert_eq!(data.status, "processed");
    }

    #[tokio::test]
    async fn test_questions_are_normalized() {
        let reply = r#"{"questions": [
            {"text": "Tell me about a failure.", "type": "Behavioral", "difficulty": 9},
            {"text": "  ", "type": "technical"},
            {"text": "What is ownership?", "type": "trivia", "difficulty": 0}
        ]}"#;
        let session_id = Uuid::new_v4();
        let qs = provider(ScriptedBackend::replying(reply))
            .generate_questions(&ResumeData::default(), session_id, 5)
            .await;

        assert_eq!(qs.len(), 2);
        assert_eq!(qs[0].category, QuestionCategory::Behavioral);
        assert_eq!(qs[0].difficulty, 5);
        assert_eq!(qs[1].category, QuestionCategory::General);
        assert_eq!(qs[1].difficulty, 1);
        assert_eq!(qs[1].question_id, format!("{session_id}_1"));
    }

    #[tokio::test]
    async fn test_questions_fall_back_to_mock_on_garbage() {
        let qs = provider(ScriptedBackend::replying("I cannot help with that."))
            .generate_questions(&ResumeData::default(), Uuid::nil(), 3)
            .await;
        assert_eq!(qs.len(), 3);
        assert!(qs[0].text.starts_with("Tell me about yourself"));
    }

    #[tokio::test]
    async fn test_feedback_accepts_confidence_alias_and_clamps() {
        let reply = r#"{"score": 14, "content_feedback": "Good depth.",
                        "confidence_feedback": "Calm delivery.", "strengths": ["Depth"]}"#;
        let fb = provider(ScriptedBackend::replying(reply))
            .analyze_response(&question(), 0, "Because of the borrow checker.")
            .await;
        assert_eq!(fb.overall_score, 10.0);
        assert_eq!(fb.tone_feedback, "Calm delivery.");
        assert_eq!(fb.clarity_feedback, "Your response was clear.");
        assert_eq!(fb.strengths, vec!["Depth"]);
        assert_eq!(fb.question_id, question().question_id);
    }

    #[tokio::test]
    async fn test_feedback_missing_fields_take_neutral_defaults() {
        let fb = provider(ScriptedBackend::replying(r#"{"content_feedback": "Solid."}"#))
            .analyze_response(&question(), 0, "Because of the borrow checker.")
            .await;
        let neutral = mock::default_feedback(0, &question().question_id);
        assert_eq!(fb.overall_score, 5.0);
        assert_eq!(fb.content_feedback, "Solid.");
        assert_eq!(fb.tone_feedback, neutral.tone_feedback);
        assert_eq!(fb.improvements, neutral.improvements);
    }

    #[tokio::test]
    async fn test_feedback_falls_back_to_mock_on_error() {
        let answer = "short";
        let fb = provider(ScriptedBackend::failing(429))
            .analyze_response(&question(), 0, answer)
            .await;
        let expected = mock::mock_feedback(&question(), 0, answer);
        assert_eq!(fb.overall_score, expected.overall_score);
        assert_eq!(fb.strengths, expected.strengths);
    }

    #[tokio::test]
    async fn test_summary_falls_back_to_mock_narrative() {
        let session = InterviewSession {
            session_id: Uuid::nil(),
            resume_id: Uuid::nil(),
            questions: vec![question()],
            current_question_index: 0,
            responses: vec![],
            feedback: vec![],
            status: SessionStatus::Completed,
            created_at: Utc::now(),
        };
        let narrative = provider(ScriptedBackend::failing(503))
            .summarize(&session, 8.5)
            .await;
        assert_eq!(narrative, mock::mock_narrative(8.5));

        let narrative = provider(ScriptedBackend::replying(
            r#"{"overall_feedback": "Strong.", "recommendations": ["Keep going."]}"#,
        ))
        .summarize(&session, 8.5)
        .await;
        assert_eq!(narrative.overall_feedback, "Strong.");
    }
}
