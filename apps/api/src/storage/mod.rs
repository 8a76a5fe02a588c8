//! Filesystem JSON store rooted at `UPLOAD_DIR`.
//!
//! Layout:
//! ```text
//! {root}/{resume_id}/resume.{pdf,docx} | resume_link.txt
//! {root}/{resume_id}/task.json, resume_data.json, error.txt
//! {root}/{resume_id}/interviews/{session_id}/session.json
//! {root}/{resume_id}/interviews/{session_id}/audio/{transcription_id}/...
//! {root}/temp/{transcription_id}/...
//! ```
//! All writes go through a temp file + rename so a concurrent reader never
//! observes a half-written document.

pub mod index;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;
use uuid::Uuid;

use crate::models::interview::InterviewSession;
use crate::models::resume::ResumeData;
use index::{EntryKind, PathIndex, AUDIO_DIR, INTERVIEWS_DIR, SESSION_FILE, TEMP_DIR};

pub const RESUME_DATA_FILE: &str = "resume_data.json";
pub const ERROR_FILE: &str = "error.txt";
pub const TRANSCRIPTION_FILE: &str = "transcription.json";

/// A session together with the directory it was loaded from.
#[derive(Debug, Clone)]
pub struct StoredSession {
    pub dir: PathBuf,
    pub session: InterviewSession,
}

#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    index: PathIndex,
}

impl Store {
    /// Opens (creating if needed) the upload root.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(root.join(TEMP_DIR))
            .await
            .with_context(|| format!("Failed to create upload root {}", root.display()))?;
        Ok(Self {
            root,
            index: PathIndex::default(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resume_dir(&self, resume_id: Uuid) -> PathBuf {
        self.root.join(resume_id.to_string())
    }

    pub fn session_dir(&self, resume_id: Uuid, session_id: Uuid) -> PathBuf {
        self.resume_dir(resume_id)
            .join(INTERVIEWS_DIR)
            .join(session_id.to_string())
    }

    /// Directory for a transcription; nested under the session when there is one.
    pub fn transcription_dir(&self, session_dir: Option<&Path>, transcription_id: Uuid) -> PathBuf {
        match session_dir {
            Some(dir) => dir.join(AUDIO_DIR).join(transcription_id.to_string()),
            None => self.root.join(TEMP_DIR).join(transcription_id.to_string()),
        }
    }

    pub async fn load_resume(&self, resume_id: Uuid) -> Result<Option<ResumeData>> {
        read_json(&self.resume_dir(resume_id).join(RESUME_DATA_FILE)).await
    }

    /// Persists a brand-new session and registers it in the index.
    pub async fn create_session(&self, session: &InterviewSession) -> Result<StoredSession> {
        let dir = self.session_dir(session.resume_id, session.session_id);
        write_json(&dir.join(SESSION_FILE), session).await?;
        self.index
            .insert(EntryKind::Session, session.session_id, dir.clone());
        Ok(StoredSession {
            dir,
            session: session.clone(),
        })
    }

    pub async fn find_session_dir(&self, session_id: Uuid) -> Result<Option<PathBuf>> {
        if let Some(dir) = self.index.get(EntryKind::Session, session_id) {
            if dir.join(SESSION_FILE).is_file() {
                return Ok(Some(dir));
            }
        }
        let root = self.root.clone();
        let found =
            tokio::task::spawn_blocking(move || index::search_session_dir(&root, session_id))
                .await
                .context("Session search task panicked")?;
        if let Some(dir) = &found {
            debug!("Resolved session {session_id} by directory walk: {}", dir.display());
            self.index.insert(EntryKind::Session, session_id, dir.clone());
        }
        Ok(found)
    }

    pub async fn load_session(&self, session_id: Uuid) -> Result<Option<StoredSession>> {
        let Some(dir) = self.find_session_dir(session_id).await? else {
            return Ok(None);
        };
        let session: Option<InterviewSession> = read_json(&dir.join(SESSION_FILE)).await?;
        Ok(session.map(|session| StoredSession { dir, session }))
    }

    /// Rewrites `session.json`. Concurrent writers are last-writer-wins.
    pub async fn save_session(&self, stored: &StoredSession) -> Result<()> {
        write_json(&stored.dir.join(SESSION_FILE), &stored.session).await
    }

    pub fn register_transcription(&self, transcription_id: Uuid, dir: PathBuf) {
        self.index
            .insert(EntryKind::Transcription, transcription_id, dir);
    }

    pub async fn find_transcription_dir(&self, transcription_id: Uuid) -> Result<Option<PathBuf>> {
        if let Some(dir) = self.index.get(EntryKind::Transcription, transcription_id) {
            if dir.is_dir() {
                return Ok(Some(dir));
            }
        }
        let root = self.root.clone();
        let found = tokio::task::spawn_blocking(move || {
            index::search_transcription_dir(&root, transcription_id)
        })
        .await
        .context("Transcription search task panicked")?;
        if let Some(dir) = &found {
            self.index
                .insert(EntryKind::Transcription, transcription_id, dir.clone());
        }
        Ok(found)
    }
}

/// Reads and deserializes a JSON document. A missing file is `Ok(None)`.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let Some(bytes) = read_optional(path).await? else {
        return Ok(None);
    };
    let value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Corrupt JSON document at {}", path.display()))?;
    Ok(Some(value))
}

pub async fn read_text(path: &Path) -> Result<Option<String>> {
    Ok(read_optional(path)
        .await?
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    write_atomic(path, bytes).await
}

/// Writes `bytes` to a sibling temp file, fsyncs, then renames over `path`.
/// Parent directories are created as needed.
pub async fn write_atomic(path: &Path, bytes: impl Into<Vec<u8>>) -> Result<()> {
    let path = path.to_path_buf();
    let bytes = bytes.into();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let dir = path
            .parent()
            .with_context(|| format!("{} has no parent directory", path.display()))?;
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path)
            .map_err(|e| e.error)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    })
    .await
    .context("Atomic write task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::{InterviewQuestion, QuestionCategory, SessionStatus};
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_session(resume_id: Uuid) -> InterviewSession {
        let session_id = Uuid::new_v4();
        InterviewSession {
            session_id,
            resume_id,
            questions: vec![InterviewQuestion::new(
                session_id,
                0,
                "Tell me about yourself.",
                QuestionCategory::General,
                1,
            )],
            current_question_index: 0,
            responses: vec![],
            feedback: vec![],
            status: SessionStatus::InProgress,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_write_atomic_replaces_and_leaves_no_temp_files() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("nested").join("doc.json");

        write_json(&path, &serde_json::json!({"v": 1})).await.unwrap();
        write_json(&path, &serde_json::json!({"v": 2})).await.unwrap();

        let value: serde_json::Value = read_json(&path).await.unwrap().unwrap();
        assert_eq!(value["v"], 2);

        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1, "temp file left behind");
    }

    #[tokio::test]
    async fn test_read_json_missing_is_none() {
        let root = TempDir::new().unwrap();
        let value: Option<serde_json::Value> =
            read_json(&root.path().join("nope.json")).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_read_json_corrupt_is_error() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_json::<serde_json::Value>(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_session_round_trip_through_index() {
        let root = TempDir::new().unwrap();
        let store = Store::open(root.path()).await.unwrap();
        let session = sample_session(Uuid::new_v4());

        store.create_session(&session).await.unwrap();
        let loaded = store.load_session(session.session_id).await.unwrap().unwrap();
        assert_eq!(loaded.session, session);
        assert_eq!(
            loaded.dir,
            store.session_dir(session.resume_id, session.session_id)
        );
    }

    #[tokio::test]
    async fn test_session_found_by_walk_after_restart() {
        let root = TempDir::new().unwrap();
        let session = sample_session(Uuid::new_v4());
        {
            let store = Store::open(root.path()).await.unwrap();
            store.create_session(&session).await.unwrap();
        }

        // A fresh store has an empty index and must walk the tree.
        let store = Store::open(root.path()).await.unwrap();
        let loaded = store.load_session(session.session_id).await.unwrap();
        assert_eq!(loaded.map(|s| s.session), Some(session));
        assert!(store.load_session(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transcription_dir_layout() {
        let root = TempDir::new().unwrap();
        let store = Store::open(root.path()).await.unwrap();
        let id = Uuid::new_v4();
        assert_eq!(
            store.transcription_dir(None, id),
            root.path().join(TEMP_DIR).join(id.to_string())
        );
        let session_dir = store.session_dir(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(
            store.transcription_dir(Some(&session_dir), id),
            session_dir.join(AUDIO_DIR).join(id.to_string())
        );
    }
}
