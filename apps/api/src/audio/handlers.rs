use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::service::{accept_upload, transcription_state, TranscriptionState};
use crate::errors::{ApiQuery, AppError};
use crate::models::audio::{Transcription, STATUS_PROCESSING};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranscribeAccepted {
    pub transcription_id: Uuid,
    pub message: String,
    pub status: String,
}

fn parse_session_id(raw: &str) -> Result<Option<Uuid>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Uuid::parse_str(raw)
        .map(Some)
        .map_err(|_| AppError::NotFound("Interview session not found".into()))
}

/// POST /api/audio/transcribe
///
/// Multipart: `audio` file, optional `session_id` field (the query
/// parameter of the same name is accepted too; the form field wins).
pub async fn handle_transcribe(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SessionQuery>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeAccepted>, AppError> {
    let mut audio: Option<(String, Vec<u8>)> = None;
    let mut session_field: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("audio") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if bytes.len() > state.config.max_upload_size {
                    return Err(AppError::Validation(
                        "File size exceeds the maximum allowed size".into(),
                    ));
                }
                audio = Some((name, bytes.to_vec()));
            }
            Some("session_id") => session_field = Some(field.text().await?),
            _ => {}
        }
    }

    let (file_name, bytes) =
        audio.ok_or_else(|| AppError::Validation("An 'audio' file is required".into()))?;
    let session_id = match session_field.or(query.session_id) {
        Some(raw) => parse_session_id(&raw)?,
        None => None,
    };

    let transcription_id =
        accept_upload(&state.store, &state.tasks, session_id, &file_name, bytes).await?;

    Ok(Json(TranscribeAccepted {
        transcription_id,
        message: "Audio uploaded successfully. Transcription in progress.".into(),
        status: STATUS_PROCESSING.into(),
    }))
}

/// GET /api/audio/transcription/:id
pub async fn handle_get_transcription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound("Transcription not found".into());
    let transcription_id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let response = match transcription_state(&state.store, transcription_id).await? {
        TranscriptionState::Ready(t) => Json(t).into_response(),
        TranscriptionState::Failed(error) => {
            Json(Transcription::failed(transcription_id, &error)).into_response()
        }
        TranscriptionState::Processing => (
            StatusCode::ACCEPTED,
            Json(json!({
                "transcription_id": transcription_id,
                "message": "Transcription is still being processed",
                "status": STATUS_PROCESSING,
                "text": null,
            })),
        )
            .into_response(),
        TranscriptionState::NotFound => return Err(not_found()),
    };
    Ok(response)
}
