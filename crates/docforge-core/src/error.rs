//! Error types for DocForge.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Failed to extract text from file: {0}")]
    Extraction(String),

    #[error("Failed to generate document: {0}")]
    Generation(String),

    /// A pipeline stage failed after the job was recorded.
    #[error("Processing failed: {source}")]
    JobFailed {
        job_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Job not completed yet: {0}")]
    NotReady(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Processing,
    NotFound,
    NotReady,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::Processing => "processing_error",
            Self::NotFound => "not_found",
            Self::NotReady => "not_ready",
            Self::Internal => "internal_error",
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Extraction(_) | Self::Generation(_) | Self::JobFailed { .. } => {
                ErrorKind::Processing
            }
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotReady(_) => ErrorKind::NotReady,
            Self::Io(_) | Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Job id attached to a failure, if the failure happened inside a recorded job.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            Self::JobFailed { job_id, .. } => Some(job_id),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Error::Validation("x".into()).kind(), ErrorKind::Validation);
        assert_eq!(Error::Extraction("x".into()).kind(), ErrorKind::Processing);
        assert_eq!(Error::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(Error::NotReady("x".into()).kind(), ErrorKind::NotReady);
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_job_failed_carries_id_and_source() {
        let err = Error::JobFailed {
            job_id: "job-1".into(),
            source: Box::new(Error::Extraction("invalid UTF-8 at byte 3".into())),
        };
        assert_eq!(err.kind(), ErrorKind::Processing);
        assert_eq!(err.job_id(), Some("job-1"));
        assert_eq!(
            err.to_string(),
            "Processing failed: Failed to extract text from file: invalid UTF-8 at byte 3"
        );
    }
}
