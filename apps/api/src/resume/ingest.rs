//! Resume ingestion: persist the upload, then (in a worker) extract,
//! structure and store `resume_data.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use uuid::Uuid;

use super::extract::{extract_file_text, fetch_link_text, DocumentKind};
use crate::models::resume::ResumeData;
use crate::models::task::TaskStatus;
use crate::storage::{read_json, read_text, write_atomic, write_json, Store, ERROR_FILE, RESUME_DATA_FILE};
use crate::tasks::{read_record, Job, JobContext, TaskQueue};

pub const RESUME_LINK_FILE: &str = "resume_link.txt";
const RESUME_FILE_STEM: &str = "resume";

/// Where the text of a resume comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeSource {
    /// Stored `resume.{pdf,docx}`.
    File(PathBuf),
    /// Stored `resume_link.txt` holding the URL.
    Link(PathBuf),
}

/// Writes the uploaded document under a fresh resume id and queues parsing.
pub async fn ingest_file(
    store: &Store,
    queue: &TaskQueue,
    kind: DocumentKind,
    bytes: Vec<u8>,
) -> Result<Uuid> {
    let resume_id = Uuid::new_v4();
    let dir = store.resume_dir(resume_id);
    let path = dir.join(format!("{RESUME_FILE_STEM}.{}", kind.extension()));
    write_atomic(&path, bytes).await?;

    queue
        .submit(Job::ParseResume {
            resume_id,
            dir,
            source: ResumeSource::File(path),
        })
        .await?;
    info!("Resume {resume_id} uploaded ({})", kind.extension());
    Ok(resume_id)
}

pub async fn ingest_link(store: &Store, queue: &TaskQueue, link: &str) -> Result<Uuid> {
    let resume_id = Uuid::new_v4();
    let dir = store.resume_dir(resume_id);
    let path = dir.join(RESUME_LINK_FILE);
    write_atomic(&path, link.trim()).await?;

    queue
        .submit(Job::ParseResume {
            resume_id,
            dir,
            source: ResumeSource::Link(path),
        })
        .await?;
    info!("Resume {resume_id} submitted as link");
    Ok(resume_id)
}

/// Worker body for `Job::ParseResume`.
pub async fn run_parse(
    ctx: &JobContext,
    resume_id: Uuid,
    dir: &Path,
    source: &ResumeSource,
) -> Result<()> {
    let text = match source {
        ResumeSource::File(path) => extract_file_text(path).await?,
        ResumeSource::Link(path) => {
            let link = read_text(path)
                .await?
                .with_context(|| format!("Missing {}", path.display()))?;
            fetch_link_text(&ctx.http, &link).await?
        }
    };

    let data = ctx.provider.structure_resume(resume_id, &text).await;
    write_json(&dir.join(RESUME_DATA_FILE), &data).await?;
    info!(
        "Resume {resume_id} parsed via {} ({} chars)",
        ctx.provider.kind().as_str(),
        text.len()
    );
    Ok(())
}

/// What the poll endpoint should report for a resume.
#[derive(Debug)]
pub enum ResumeState {
    Ready(ResumeData),
    Processing,
    Failed(String),
    NotFound,
}

/// Reads `task.json` when present; otherwise infers the state from which
/// files exist (data written before task records were kept).
pub async fn resume_state(store: &Store, resume_id: Uuid) -> Result<ResumeState> {
    let dir = store.resume_dir(resume_id);
    if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
        return Ok(ResumeState::NotFound);
    }

    if let Some(record) = read_record(&dir).await? {
        if record.status.is_pending() {
            return Ok(ResumeState::Processing);
        }
        if record.status == TaskStatus::Error {
            let message = match record.error {
                Some(message) => message,
                None => read_marker(&dir).await?,
            };
            return Ok(ResumeState::Failed(message));
        }
    }

    if let Some(data) = read_json::<ResumeData>(&dir.join(RESUME_DATA_FILE)).await? {
        return Ok(ResumeState::Ready(data));
    }
    if let Some(message) = read_text(&dir.join(ERROR_FILE)).await? {
        return Ok(ResumeState::Failed(message));
    }
    Ok(ResumeState::Processing)
}

async fn read_marker(dir: &Path) -> Result<String> {
    Ok(read_text(&dir.join(ERROR_FILE))
        .await?
        .unwrap_or_else(|| "Error parsing resume".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::{TaskKind, TaskRecord, TASK_FILE};
    use crate::tasks::testing::{mock_context, wait_for_task};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn docx_bytes(lines: &[&str]) -> Vec<u8> {
        use docx_rs::{Docx, Paragraph, Run};
        let mut doc = Docx::new();
        for line in lines {
            doc = doc.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)));
        }
        let mut buf = Cursor::new(Vec::new());
        doc.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn test_docx_upload_is_parsed_by_worker() {
        let root = TempDir::new().unwrap();
        let store = Store::open(root.path()).await.unwrap();
        let queue = TaskQueue::start(1, mock_context());

        let bytes = docx_bytes(&["Linus Example", "linus@example.com", "555-867-5309"]);
        let resume_id = ingest_file(&store, &queue, DocumentKind::Docx, bytes)
            .await
            .unwrap();
        let dir = store.resume_dir(resume_id);
        assert!(dir.join("resume.docx").is_file());

        let record = wait_for_task(&dir).await;
        assert_eq!(record.status, TaskStatus::Done);

        match resume_state(&store, resume_id).await.unwrap() {
            ResumeState::Ready(data) => {
                assert_eq!(data.resume_id, resume_id);
                assert_eq!(data.name.as_deref(), Some("Linus Example"));
                assert_eq!(data.email.as_deref(), Some("linus@example.com"));
                assert_eq!(data.phone.as_deref(), Some("555-867-5309"));
                assert_eq!(data.status, "processed");
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_state_unknown_id_is_not_found() {
        let root = TempDir::new().unwrap();
        let store = Store::open(root.path()).await.unwrap();
        assert!(matches!(
            resume_state(&store, Uuid::new_v4()).await.unwrap(),
            ResumeState::NotFound
        ));
    }

    #[tokio::test]
    async fn test_state_reads_task_record() {
        let root = TempDir::new().unwrap();
        let store = Store::open(root.path()).await.unwrap();
        let id = Uuid::new_v4();
        let dir = store.resume_dir(id);

        let queued = TaskRecord::queued(id, TaskKind::ResumeParse);
        write_json(&dir.join(TASK_FILE), &queued).await.unwrap();
        assert!(matches!(
            resume_state(&store, id).await.unwrap(),
            ResumeState::Processing
        ));

        let failed = queued.transition(TaskStatus::Error, Some("Error parsing resume: boom".into()));
        write_json(&dir.join(TASK_FILE), &failed).await.unwrap();
        match resume_state(&store, id).await.unwrap() {
            ResumeState::Failed(message) => assert_eq!(message, "Error parsing resume: boom"),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_state_inferred_from_files_without_record() {
        let root = TempDir::new().unwrap();
        let store = Store::open(root.path()).await.unwrap();
        let id = Uuid::new_v4();
        let dir = store.resume_dir(id);

        write_atomic(&dir.join("resume.pdf"), b"%PDF".to_vec()).await.unwrap();
        assert!(matches!(
            resume_state(&store, id).await.unwrap(),
            ResumeState::Processing
        ));

        write_atomic(&dir.join(ERROR_FILE), "Error parsing resume: legacy").await.unwrap();
        assert!(matches!(
            resume_state(&store, id).await.unwrap(),
            ResumeState::Failed(_)
        ));
    }
}
