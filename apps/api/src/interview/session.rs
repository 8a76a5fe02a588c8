//! Session lifecycle: creation, question lookup and response submission.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use super::questions;
use crate::errors::AppError;
use crate::models::interview::{
    InterviewFeedback, InterviewQuestion, InterviewResponse, InterviewSession, SessionStatus,
};
use crate::provider::InterviewProvider;
use crate::storage::{Store, StoredSession};

pub async fn start_session(
    store: &Store,
    provider: &dyn InterviewProvider,
    resume_id: Uuid,
    count: usize,
) -> Result<InterviewSession, AppError> {
    let session_id = Uuid::new_v4();
    let questions = match store.load_resume(resume_id).await {
        Ok(Some(resume)) => questions::generate(provider, &resume, session_id, count).await,
        Ok(None) => {
            return Err(AppError::NotFound(
                "Resume not found or still being processed".into(),
            ))
        }
        Err(e) => {
            warn!("Could not load resume {resume_id}, using default questions: {e:#}");
            questions::default_questions(session_id, count)
        }
    };
    let session = InterviewSession {
        session_id,
        resume_id,
        questions,
        current_question_index: 0,
        responses: Vec::new(),
        feedback: Vec::new(),
        status: SessionStatus::InProgress,
        created_at: Utc::now(),
    };
    store.create_session(&session).await?;
    info!(
        "Session {session_id} started for resume {resume_id} with {} questions",
        session.questions.len()
    );
    Ok(session)
}

pub async fn load(store: &Store, session_id: Uuid) -> Result<StoredSession, AppError> {
    store
        .load_session(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Interview session not found".into()))
}

pub fn question_at(
    session: &InterviewSession,
    question_index: i64,
) -> Result<&InterviewQuestion, AppError> {
    usize::try_from(question_index)
        .ok()
        .and_then(|i| session.questions.get(i))
        .ok_or_else(|| out_of_range(session))
}

fn out_of_range(session: &InterviewSession) -> AppError {
    AppError::Validation(format!(
        "Question index out of range. Valid range: 0-{}",
        session.questions.len().saturating_sub(1)
    ))
}

/// Appends the response and its feedback, then advances the session.
///
/// The pointer moves only when the current question is answered and never
/// passes the last question. Answering the last question completes the
/// session; nothing moves it back to `in_progress`.
pub fn apply_response(
    session: &mut InterviewSession,
    response: InterviewResponse,
    feedback: InterviewFeedback,
) {
    let index = response.question_index;
    let last = session.questions.len().saturating_sub(1);

    session.responses.push(response);
    session.feedback.push(feedback);

    if index == session.current_question_index {
        session.current_question_index = (index + 1).min(last);
    }
    if index == last {
        session.status = SessionStatus::Completed;
    }
}

pub async fn submit_response(
    store: &Store,
    provider: &dyn InterviewProvider,
    session_id: Uuid,
    question_index: i64,
    response_text: String,
    audio_file_path: Option<String>,
) -> Result<InterviewFeedback, AppError> {
    let mut stored = load(store, session_id).await?;
    let question = question_at(&stored.session, question_index)?.clone();
    // In range after question_at.
    let index = question_index as usize;

    let feedback = provider
        .analyze_response(&question, index, &response_text)
        .await;

    let response = InterviewResponse {
        question_index: index,
        response_text,
        audio_file_path,
        timestamp: Utc::now(),
    };
    apply_response(&mut stored.session, response, feedback.clone());
    store.save_session(&stored).await?;

    info!(
        "Session {session_id}: question {index} scored {:.1} (status {:?})",
        feedback.overall_score, stored.session.status
    );
    Ok(feedback)
}
