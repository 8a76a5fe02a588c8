//! Background task queue.
//!
//! Uploads enqueue a `Job` and return immediately. A fixed pool of workers
//! drains the channel; each job keeps a `task.json` record next to its output
//! (`queued → running → done | error`) that the poll endpoints read, so
//! "still processing" is an explicit state rather than a missing file.
//!
//! No retries, cancellation or timeouts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info};
use uuid::Uuid;

use crate::audio::service::run_transcription;
use crate::audio::transcriber::SpeechToText;
use crate::models::task::{TaskKind, TaskRecord, TaskStatus, TASK_FILE};
use crate::provider::InterviewProvider;
use crate::resume::ingest::{run_parse, ResumeSource};
use crate::storage::{read_json, write_atomic, write_json, ERROR_FILE};

/// Everything a worker needs to execute any job.
#[derive(Clone)]
pub struct JobContext {
    pub provider: Arc<dyn InterviewProvider>,
    pub transcriber: Arc<dyn SpeechToText>,
    pub http: reqwest::Client,
}

#[derive(Debug, Clone)]
pub enum Job {
    ParseResume {
        resume_id: Uuid,
        dir: PathBuf,
        source: ResumeSource,
    },
    Transcribe {
        transcription_id: Uuid,
        dir: PathBuf,
        audio_path: PathBuf,
        original_name: String,
    },
}

impl Job {
    pub fn id(&self) -> Uuid {
        match self {
            Job::ParseResume { resume_id, .. } => *resume_id,
            Job::Transcribe {
                transcription_id, ..
            } => *transcription_id,
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Job::ParseResume { .. } => TaskKind::ResumeParse,
            Job::Transcribe { .. } => TaskKind::Transcription,
        }
    }

    /// Directory holding the job's inputs, `task.json` and output.
    pub fn dir(&self) -> &Path {
        match self {
            Job::ParseResume { dir, .. } | Job::Transcribe { dir, .. } => dir,
        }
    }
}

#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl TaskQueue {
    /// Spawns `workers` tasks sharing one receiver. Must be called inside a
    /// tokio runtime. Workers exit once every queue handle is dropped.
    pub fn start(workers: usize, ctx: JobContext) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));

        for worker in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let ctx = ctx.clone();
            tokio::spawn(async move {
                loop {
                    // Hold the lock only while waiting for the next job.
                    let next = rx.lock().await.recv().await;
                    let Some(job) = next else { break };
                    execute(&ctx, job).await;
                }
                info!("Task worker {worker} stopped");
            });
        }
        info!("Task queue started with {} worker(s)", workers.max(1));

        Self { tx }
    }

    /// Persists the `queued` record, then hands the job to a worker.
    pub async fn submit(&self, job: Job) -> Result<()> {
        let record = TaskRecord::queued(job.id(), job.kind());
        write_record(job.dir(), &record).await?;
        self.tx
            .send(job)
            .map_err(|_| anyhow!("Task queue is closed"))?;
        Ok(())
    }
}

pub async fn read_record(dir: &Path) -> Result<Option<TaskRecord>> {
    read_json(&dir.join(TASK_FILE)).await
}

async fn write_record(dir: &Path, record: &TaskRecord) -> Result<()> {
    write_json(&dir.join(TASK_FILE), record).await
}

/// Runs one job to completion and records the outcome. The result file (or
/// `error.txt`) is always written before the terminal status.
async fn execute(ctx: &JobContext, job: Job) {
    let id = job.id();
    let kind = job.kind();
    let dir = job.dir().to_path_buf();

    let record = match read_record(&dir).await {
        Ok(Some(record)) => record,
        _ => TaskRecord::queued(id, kind),
    };
    let record = record.transition(TaskStatus::Running, None);
    if let Err(e) = write_record(&dir, &record).await {
        error!("Failed to mark {} task {id} running: {e:#}", kind.as_str());
    }

    let outcome = match job {
        Job::ParseResume {
            resume_id,
            dir,
            source,
        } => run_parse(ctx, resume_id, &dir, &source).await,
        Job::Transcribe {
            transcription_id,
            dir,
            audio_path,
            original_name,
        } => run_transcription(ctx, transcription_id, &dir, &audio_path, &original_name).await,
    };

    let record = match outcome {
        Ok(()) => {
            info!("{} task {id} done", kind.as_str());
            record.transition(TaskStatus::Done, None)
        }
        Err(e) => {
            error!("{} task {id} failed: {e:#}", kind.as_str());
            let message = format!("{}: {e:#}", kind.error_prefix());
            if let Err(write_err) = write_atomic(&dir.join(ERROR_FILE), message.clone()).await {
                error!("Failed to write error marker for task {id}: {write_err:#}");
            }
            record.transition(TaskStatus::Error, Some(message))
        }
    };

    if let Err(e) = write_record(&dir, &record).await {
        error!("Failed to record outcome of {} task {id}: {e:#}", kind.as_str());
    }
}
