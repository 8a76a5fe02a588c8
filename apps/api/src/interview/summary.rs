//! End-of-interview summary: deterministic aggregation of the stored
//! feedback plus a narrative from the provider.

use chrono::Utc;

use crate::errors::AppError;
use crate::models::interview::{InterviewFeedback, InterviewSession, InterviewSummary, SessionStatus};
use crate::provider::InterviewProvider;

const MAX_HIGHLIGHTS: usize = 3;
const POSITIVE_WORDS: &[&str] = &["good", "excellent"];
const CONSTRUCTIVE_WORDS: &[&str] = &["improve", "consider"];

pub const FALLBACK_OVERALL_FEEDBACK: &str = "You demonstrated good communication skills and relevant experience. Continue to practice providing specific examples and quantifiable results.";

/// Aggregate part of a summary, before narrative.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackAggregate {
    pub average_score: f64,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
}

fn mentions(text: &str, words: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    words.iter().any(|w| lowered.contains(w))
}

/// Mean score (0 when empty) and the first three positive and constructive
/// comments in submission order. Content feedback is tested for both kinds
/// independently; tone and clarity count as positive before constructive.
pub fn aggregate(feedback: &[InterviewFeedback]) -> FeedbackAggregate {
    let average_score = if feedback.is_empty() {
        0.0
    } else {
        feedback.iter().map(|f| f.overall_score).sum::<f64>() / feedback.len() as f64
    };

    let mut strengths = Vec::new();
    let mut improvements = Vec::new();
    for f in feedback {
        if mentions(&f.content_feedback, POSITIVE_WORDS) {
            strengths.push(f.content_feedback.clone());
        }
        if mentions(&f.content_feedback, CONSTRUCTIVE_WORDS) {
            improvements.push(f.content_feedback.clone());
        }
        for comment in [&f.tone_feedback, &f.clarity_feedback] {
            if mentions(comment, POSITIVE_WORDS) {
                strengths.push(comment.clone());
            } else if mentions(comment, CONSTRUCTIVE_WORDS) {
                improvements.push(comment.clone());
            }
        }
    }
    strengths.truncate(MAX_HIGHLIGHTS);
    improvements.truncate(MAX_HIGHLIGHTS);

    FeedbackAggregate {
        average_score,
        strengths,
        areas_for_improvement: improvements,
    }
}

pub fn ensure_ready(session: &InterviewSession) -> Result<(), AppError> {
    if session.status != SessionStatus::Completed
        && session.responses.len() < session.questions.len()
    {
        return Err(AppError::Validation(
            "Interview is not complete. Please answer all questions first.".into(),
        ));
    }
    Ok(())
}

pub async fn summarize(
    provider: &dyn InterviewProvider,
    session: &InterviewSession,
) -> Result<InterviewSummary, AppError> {
    ensure_ready(session)?;

    let totals = aggregate(&session.feedback);
    let narrative = provider.summarize(session, totals.average_score).await;
    let overall_feedback = if narrative.overall_feedback.trim().is_empty() {
        FALLBACK_OVERALL_FEEDBACK.to_string()
    } else {
        narrative.overall_feedback
    };

    Ok(InterviewSummary {
        session_id: session.session_id,
        resume_id: session.resume_id,
        question_count: session.questions.len(),
        average_score: totals.average_score,
        strengths: totals.strengths,
        areas_for_improvement: totals.areas_for_improvement,
        overall_feedback,
        recommendations: narrative.recommendations,
        timestamp: Utc::now(),
    })
}
