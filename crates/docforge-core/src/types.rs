//! Submission types shared by every pipeline stage.

use serde::{Deserialize, Serialize};

/// A file as received from the caller, before validation.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    /// Content type declared by the client, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            bytes,
        }
    }

    /// Size of the received payload in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercase extension of the filename, empty when there is none.
    pub fn extension(&self) -> String {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default()
    }
}

/// Caller-supplied metadata attached to the generated document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub issuer_id: String,
    pub user_email: String,
}

impl SubmissionMetadata {
    pub fn new(issuer_id: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            issuer_id: issuer_id.into(),
            user_email: user_email.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        let file = UploadedFile::new("Notes.TXT", None, b"hi".to_vec());
        assert_eq!(file.extension(), "txt");
        assert_eq!(file.size(), 2);

        let file = UploadedFile::new("archive.tar.gz", None, Vec::new());
        assert_eq!(file.extension(), "gz");

        let file = UploadedFile::new("README", None, Vec::new());
        assert_eq!(file.extension(), "");
    }
}
