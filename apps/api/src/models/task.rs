use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File name of the status record kept next to each background job's output.
pub const TASK_FILE: &str = "task.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    ResumeParse,
    Transcription,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::ResumeParse => "resume_parse",
            TaskKind::Transcription => "transcription",
        }
    }

    /// Leads the message written to the job's `error.txt`.
    pub fn error_prefix(&self) -> &'static str {
        match self {
            TaskKind::ResumeParse => "Error parsing resume",
            TaskKind::Transcription => "Error transcribing audio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Running,
    Done,
    Error,
}

impl TaskStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Queued | TaskStatus::Running)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Same identifier as the resume or transcription the task produces.
    pub task_id: Uuid,
    pub kind: TaskKind,
    pub status: TaskStatus,
    #[serde(default)]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    pub fn queued(task_id: Uuid, kind: TaskKind) -> Self {
        let now = Utc::now();
        Self {
            task_id,
            kind,
            status: TaskStatus::Queued,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transition(mut self, status: TaskStatus, error: Option<String>) -> Self {
        self.status = status;
        self.error = error;
        self.updated_at = Utc::now();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_keeps_identity() {
        let id = Uuid::new_v4();
        let queued = TaskRecord::queued(id, TaskKind::ResumeParse);
        let failed = queued
            .clone()
            .transition(TaskStatus::Error, Some("boom".into()));
        assert_eq!(failed.task_id, id);
        assert_eq!(failed.created_at, queued.created_at);
        assert_eq!(failed.status, TaskStatus::Error);
        assert!(!failed.status.is_pending());
        assert!(queued.status.is_pending());
    }

    #[test]
    fn test_status_serialization() {
        let value = serde_json::to_value(TaskRecord::queued(Uuid::nil(), TaskKind::Transcription))
            .unwrap();
        assert_eq!(value["status"], "queued");
        assert_eq!(value["kind"], "transcription");
    }
}
