//! Job model.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Pipeline stage a job is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Received,
    Validating,
    Extracting,
    Generating,
    Complete,
    Failed,
}

impl JobStatus {
    pub fn all() -> &'static [JobStatus] {
        &[
            Self::Received,
            Self::Validating,
            Self::Extracting,
            Self::Generating,
            Self::Complete,
            Self::Failed,
        ]
    }

    /// Complete and failed jobs never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Default human-readable message for the status.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Received => "Job received",
            Self::Validating => "Validating file",
            Self::Extracting => "Extracting text content",
            Self::Generating => "Creating DOCX document",
            Self::Complete => "Processing completed successfully",
            Self::Failed => "Processing failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Received => write!(f, "received"),
            Self::Validating => write!(f, "validating"),
            Self::Extracting => write!(f, "extracting"),
            Self::Generating => write!(f, "generating"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One entry of a job's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub status: JobStatus,
    pub at: DateTime<Utc>,
}

/// Location of a generated artifact on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactHandle {
    #[serde(skip)]
    pub path: PathBuf,
    /// Filename offered to downloaders.
    pub filename: String,
    pub size: u64,
    pub sha256: String,
}

/// A tracked unit of work from submission to completion or failure.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub job_id: String,
    pub status: JobStatus,
    pub message: String,
    /// Sanitized name of the uploaded file.
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub history: Vec<StatusChange>,
}

impl Job {
    /// New job in the `received` state.
    pub fn new(job_id: impl Into<String>, filename: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            job_id: job_id.into(),
            status: JobStatus::Received,
            message: JobStatus::Received.message().to_string(),
            filename: filename.into(),
            created_at: now,
            updated_at: now,
            artifact: None,
            error: None,
            history: vec![StatusChange {
                status: JobStatus::Received,
                at: now,
            }],
        }
    }

    /// Move to `status`, recording the transition.
    pub fn transition(&mut self, status: JobStatus) {
        let now = Utc::now();
        self.status = status;
        self.message = status.message().to_string();
        self.updated_at = now;
        self.history.push(StatusChange { status, at: now });
    }

    pub fn complete(&mut self, artifact: ArtifactHandle) {
        self.transition(JobStatus::Complete);
        self.artifact = Some(artifact);
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.transition(JobStatus::Failed);
        self.message = format!("Processing failed: {}", error);
        self.error = Some(error);
    }
}

/// Job counts per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub received: usize,
    pub validating: usize,
    pub extracting: usize,
    pub generating: usize,
    pub complete: usize,
    pub failed: usize,
    pub total: usize,
}

impl JobSummary {
    pub fn count(&mut self, status: JobStatus) {
        match status {
            JobStatus::Received => self.received += 1,
            JobStatus::Validating => self.validating += 1,
            JobStatus::Extracting => self.extracting += 1,
            JobStatus::Generating => self.generating += 1,
            JobStatus::Complete => self.complete += 1,
            JobStatus::Failed => self.failed += 1,
        }
        self.total += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        for status in JobStatus::all() {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, serde_json::json!(status.to_string()));
        }
        assert!(JobStatus::Complete.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(!JobStatus::Generating.is_terminal());
    }

    #[test]
    fn test_transitions_recorded() {
        let mut job = Job::new("job-1", "notes.txt");
        job.transition(JobStatus::Validating);
        job.transition(JobStatus::Extracting);
        job.fail("invalid UTF-8 at byte 2");

        let statuses: Vec<JobStatus> = job.history.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![
                JobStatus::Received,
                JobStatus::Validating,
                JobStatus::Extracting,
                JobStatus::Failed
            ]
        );
        assert_eq!(job.error.as_deref(), Some("invalid UTF-8 at byte 2"));
        assert_eq!(job.message, "Processing failed: invalid UTF-8 at byte 2");
        assert!(job.updated_at >= job.created_at);
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = JobSummary::default();
        summary.count(JobStatus::Complete);
        summary.count(JobStatus::Complete);
        summary.count(JobStatus::Failed);
        assert_eq!(summary.complete, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total, 3);
    }
}
