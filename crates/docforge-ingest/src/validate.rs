//! Upload validation: extension allow-list, size ceiling, submission metadata.
//!
//! Validation never touches the filesystem or the job table; a rejected
//! upload leaves no trace.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use docforge_core::{Error, Result, SubmissionMetadata, UploadLimits, UploadedFile};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9-]+(\.[a-zA-Z0-9-]+)*\.[a-zA-Z]{2,}$").unwrap()
});

/// Content types accepted regardless of the allow-listed extension.
const GENERIC_CONTENT_TYPES: &[&str] = &["application/octet-stream"];

/// Checks an upload against the configured limits.
#[derive(Debug, Clone)]
pub struct Validator {
    limits: UploadLimits,
}

impl Validator {
    pub fn new(limits: UploadLimits) -> Self {
        Self { limits }
    }

    /// Run every check, stopping at the first violated constraint.
    pub fn validate(&self, file: &UploadedFile, metadata: &SubmissionMetadata) -> Result<()> {
        let outcome = self
            .validate_file_type(&file.filename)
            .and_then(|_| self.validate_file_size(file.size()))
            .and_then(|_| validate_content_type(file.content_type.as_deref()))
            .and_then(|_| validate_metadata(metadata));

        match &outcome {
            Ok(()) => debug!("Validated {} ({} bytes)", file.filename, file.size()),
            Err(e) => warn!("Rejected upload {}: {}", file.filename, e),
        }
        outcome
    }

    /// Extension must be on the allow-list (case-insensitive).
    pub fn validate_file_type(&self, filename: &str) -> Result<()> {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if ext.is_empty() || !self.limits.allowed_extensions.iter().any(|a| *a == ext) {
            return Err(Error::Validation(format!(
                "File type not allowed. Only {} files are accepted.",
                self.limits.allowed_extensions.join(", ")
            )));
        }
        Ok(())
    }

    /// Size must be non-zero and within the configured ceiling.
    pub fn validate_file_size(&self, size: u64) -> Result<()> {
        if size == 0 {
            return Err(Error::Validation("Uploaded file is empty".into()));
        }
        if size > self.limits.max_file_size_bytes() {
            return Err(Error::Validation(format!(
                "File size exceeds maximum allowed size of {}MB",
                self.limits.max_file_size_mb
            )));
        }
        Ok(())
    }
}

/// A declared content type, when present, must be textual.
pub fn validate_content_type(content_type: Option<&str>) -> Result<()> {
    let Some(content_type) = content_type else {
        return Ok(());
    };
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    if essence.is_empty() || essence.starts_with("text/") || GENERIC_CONTENT_TYPES.contains(&essence.as_str()) {
        return Ok(());
    }
    Err(Error::Validation(format!(
        "Content-Type '{}' is not a text type",
        content_type
    )))
}

/// Issuer id must be present and the email well formed.
pub fn validate_metadata(metadata: &SubmissionMetadata) -> Result<()> {
    if metadata.issuer_id.trim().is_empty() {
        return Err(Error::Validation("issuer_id must not be empty".into()));
    }
    if !EMAIL_RE.is_match(metadata.user_email.trim()) {
        return Err(Error::Validation(format!(
            "user_email is not a valid email address: {:?}",
            metadata.user_email
        )));
    }
    Ok(())
}

/// Sanitize a filename to prevent path traversal.
pub fn sanitize_filename(name: &str) -> String {
    let name = name
        .replace('/', "")
        .replace('\\', "")
        .replace("..", "");

    std::path::Path::new(&name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("unnamed")
        .to_string()
}
