pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::audio::handlers as audio;
use crate::interview::handlers as interview;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::subscribe;

/// Multipart framing on top of the largest accepted file.
const BODY_LIMIT_OVERHEAD: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_size + BODY_LIMIT_OVERHEAD;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Resume
        .route("/api/resume/upload", post(resume::handle_upload))
        .route("/api/resume/:resume_id", get(resume::handle_get_resume))
        // Interview
        .route("/api/interview/start", post(interview::handle_start))
        .route("/api/interview/:session_id", get(interview::handle_get_session))
        .route(
            "/api/interview/:session_id/question/:question_index",
            get(interview::handle_get_question),
        )
        .route(
            "/api/interview/:session_id/response",
            post(interview::handle_submit_response),
        )
        .route(
            "/api/interview/:session_id/summary",
            get(interview::handle_summary),
        )
        // Audio
        .route("/api/audio/transcribe", post(audio::handle_transcribe))
        .route(
            "/api/audio/transcription/:transcription_id",
            get(audio::handle_get_transcription),
        )
        // Newsletter
        .route(
            "/api/subscribe",
            post(subscribe::handle_subscribe).put(subscribe::handle_update),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
