use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use uuid::Uuid;

use super::transcriber::AudioClip;
use crate::errors::AppError;
use crate::models::audio::{Transcription, AUDIO_EXTENSIONS};
use crate::models::task::TaskStatus;
use crate::storage::{read_json, read_text, write_atomic, write_json, Store, ERROR_FILE, TRANSCRIPTION_FILE};
use crate::tasks::{read_record, Job, JobContext, TaskQueue};

const AUDIO_FILE_STEM: &str = "audio";

/// Lower-case extension with the leading dot, if it is an accepted audio type.
pub fn audio_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    let ext = format!(".{ext}");
    AUDIO_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Stores the recording and queues its transcription. With a session the
/// audio lands under the session directory, otherwise under `temp/`.
pub async fn accept_upload(
    store: &Store,
    queue: &TaskQueue,
    session_id: Option<Uuid>,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<Uuid, AppError> {
    let ext = audio_extension(file_name).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid file type. Allowed types: {}",
            AUDIO_EXTENSIONS.join(", ")
        ))
    })?;

    let session_dir = match session_id {
        Some(id) => Some(
            store
                .find_session_dir(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Interview session not found".into()))?,
        ),
        None => None,
    };

    let transcription_id = Uuid::new_v4();
    let dir = store.transcription_dir(session_dir.as_deref(), transcription_id);
    let audio_path = dir.join(format!("{AUDIO_FILE_STEM}{ext}"));
    write_atomic(&audio_path, bytes).await?;
    store.register_transcription(transcription_id, dir.clone());

    queue
        .submit(Job::Transcribe {
            transcription_id,
            dir,
            audio_path,
            original_name: file_name.to_string(),
        })
        .await?;
    info!("Transcription {transcription_id} queued for '{file_name}'");
    Ok(transcription_id)
}

/// Worker body for `Job::Transcribe`.
pub async fn run_transcription(
    ctx: &JobContext,
    transcription_id: Uuid,
    dir: &Path,
    audio_path: &Path,
    original_name: &str,
) -> Result<()> {
    let bytes = tokio::fs::read(audio_path)
        .await
        .with_context(|| format!("Failed to read {}", audio_path.display()))?;
    let clip = AudioClip::new(bytes, original_name, audio_path);

    let result = ctx.transcriber.transcribe(&clip).await;
    let transcription = result.into_transcription(transcription_id);
    write_json(&dir.join(TRANSCRIPTION_FILE), &transcription).await?;
    info!(
        "Transcription {transcription_id} written via {} ({} bytes of audio)",
        ctx.transcriber.name(),
        clip.bytes.len()
    );
    Ok(())
}

#[derive(Debug)]
pub enum TranscriptionState {
    Ready(Transcription),
    Processing,
    Failed(String),
    NotFound,
}

pub async fn transcription_state(store: &Store, transcription_id: Uuid) -> Result<TranscriptionState> {
    let Some(dir) = store.find_transcription_dir(transcription_id).await? else {
        return Ok(TranscriptionState::NotFound);
    };

    if let Some(record) = read_record(&dir).await? {
        if record.status.is_pending() {
            return Ok(TranscriptionState::Processing);
        }
        if record.status == TaskStatus::Error {
            let message = match record.error {
                Some(message) => message,
                None => read_text(&dir.join(ERROR_FILE))
                    .await?
                    .unwrap_or_else(|| "Error transcribing audio".to_string()),
            };
            return Ok(TranscriptionState::Failed(message));
        }
    }

    if let Some(t) = read_json::<Transcription>(&dir.join(TRANSCRIPTION_FILE)).await? {
        return Ok(TranscriptionState::Ready(t));
    }
    if let Some(message) = read_text(&dir.join(ERROR_FILE)).await? {
        return Ok(TranscriptionState::Failed(message));
    }
    if find_audio_file(&dir).await?.is_some() {
        return Ok(TranscriptionState::Processing);
    }
    Ok(TranscriptionState::NotFound)
}

async fn find_audio_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to list {}", dir.display())),
    };
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_audio = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(AUDIO_FILE_STEM) && audio_extension(n).is_some());
        if is_audio {
            return Ok(Some(path));
        }
    }
    Ok(None)
}
