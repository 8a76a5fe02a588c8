use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use super::extract::DocumentKind;
use super::ingest::{ingest_file, ingest_link, resume_state, ResumeState};
use crate::errors::AppError;
use crate::models::resume::ResumeUploadResponse;
use crate::state::AppState;

const STATUS_PROCESSING: &str = "processing";
const ALLOWED_TYPES: &str = ".pdf, .docx";

/// POST /api/resume/upload
///
/// Multipart: a `resume` file (.pdf / .docx) or a `resume_link` text field.
/// When both are sent the file is used.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeUploadResponse>, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut link: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("resume") => {
                let name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // An empty file part is what browsers send for "no file chosen".
                if name.is_empty() && bytes.is_empty() {
                    continue;
                }
                if bytes.len() > state.config.max_upload_size {
                    return Err(AppError::Validation(
                        "File size exceeds the maximum allowed size".into(),
                    ));
                }
                file = Some((name, bytes.to_vec()));
            }
            Some("resume_link") => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    link = Some(text);
                }
            }
            _ => {}
        }
    }

    let (resume_id, message) = match (file, link) {
        (Some((name, bytes)), _) => {
            let kind = DocumentKind::from_file_name(&name).ok_or_else(|| {
                AppError::Validation(format!("Invalid file type. Allowed types: {ALLOWED_TYPES}"))
            })?;
            let id = ingest_file(&state.store, &state.tasks, kind, bytes).await?;
            (id, "Resume uploaded successfully. Processing in progress.")
        }
        (None, Some(link)) => {
            let id = ingest_link(&state.store, &state.tasks, &link).await?;
            (id, "Resume link provided successfully. Processing in progress.")
        }
        (None, None) => {
            return Err(AppError::Validation(
                "Either resume file or resume link must be provided".into(),
            ))
        }
    };

    Ok(Json(ResumeUploadResponse {
        resume_id,
        message: message.into(),
        status: STATUS_PROCESSING.into(),
    }))
}

/// GET /api/resume/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound("Resume not found".into());
    let resume_id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let response = match resume_state(&state.store, resume_id).await? {
        ResumeState::Ready(data) => Json(data).into_response(),
        ResumeState::Processing => (
            StatusCode::ACCEPTED,
            Json(json!({
                "message": "Resume is still being processed",
                "status": STATUS_PROCESSING,
            })),
        )
            .into_response(),
        ResumeState::Failed(message) => Json(json!({
            "resume_id": resume_id,
            "status": "error",
            "message": message,
        }))
        .into_response(),
        ResumeState::NotFound => return Err(not_found()),
    };
    Ok(response)
}
