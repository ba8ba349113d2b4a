//! DocForge Core — error type, configuration, submission types.

pub mod config;
pub mod error;
pub mod types;

pub use config::{DocForgeConfig, RetentionPolicy, UploadLimits};
pub use error::{Error, ErrorKind, Result};
pub use types::{SubmissionMetadata, UploadedFile};
