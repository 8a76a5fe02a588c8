use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use super::{session, summary};
use crate::errors::{ApiJson, ApiPath, AppError};
use crate::models::interview::{
    InterviewFeedback, InterviewQuestion, InterviewSession, InterviewSummary,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub resume_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResponseRequest {
    pub question_index: i64,
    pub response_text: String,
    #[serde(default)]
    pub audio_file_path: Option<String>,
}

fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(not_found.to_string()))
}

fn session_id(raw: &str) -> Result<Uuid, AppError> {
    parse_id(raw, "Interview session not found")
}

/// POST /api/interview/start
pub async fn handle_start(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<StartInterviewRequest>,
) -> Result<Json<InterviewSession>, AppError> {
    let resume_id = parse_id(&req.resume_id, "Resume not found or still being processed")?;
    let session = session::start_session(
        &state.store,
        state.provider.as_ref(),
        resume_id,
        state.config.questions_count,
    )
    .await?;
    Ok(Json(session))
}

/// GET /api/interview/:session_id
pub async fn handle_get_session(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<InterviewSession>, AppError> {
    let stored = session::load(&state.store, session_id(&id)?).await?;
    Ok(Json(stored.session))
}

/// GET /api/interview/:session_id/question/:question_index
pub async fn handle_get_question(
    State(state): State<AppState>,
    ApiPath((id, question_index)): ApiPath<(String, i64)>,
) -> Result<Json<InterviewQuestion>, AppError> {
    let stored = session::load(&state.store, session_id(&id)?).await?;
    let question = session::question_at(&stored.session, question_index)?;
    Ok(Json(question.clone()))
}

/// POST /api/interview/:session_id/response
pub async fn handle_submit_response(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(req): ApiJson<SubmitResponseRequest>,
) -> Result<Json<InterviewFeedback>, AppError> {
    let feedback = session::submit_response(
        &state.store,
        state.provider.as_ref(),
        session_id(&id)?,
        req.question_index,
        req.response_text,
        req.audio_file_path,
    )
    .await?;
    Ok(Json(feedback))
}

/// GET /api/interview/:session_id/summary
pub async fn handle_summary(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<InterviewSummary>, AppError> {
    let stored = session::load(&state.store, session_id(&id)?).await?;
    let summary = summary::summarize(state.provider.as_ref(), &stored.session).await?;
    Ok(Json(summary))
}
