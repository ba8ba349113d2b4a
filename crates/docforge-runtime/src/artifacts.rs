//! On-disk storage for generated documents, one directory per job.

use std::path::{Path, PathBuf};

use docforge_core::{Error, Result};
use docforge_docx::GeneratedDocument;
use tracing::{debug, warn};

use crate::types::ArtifactHandle;

pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open the store, creating the root directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn job_dir(&self, job_id: &str) -> PathBuf {
        self.root.join(job_id)
    }

    /// Write a document under `<root>/<job_id>/<filename>`.
    pub fn write(
        &self,
        job_id: &str,
        filename: &str,
        document: &GeneratedDocument,
    ) -> Result<ArtifactHandle> {
        let dir = self.job_dir(job_id);
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(filename);
        std::fs::write(&path, &document.bytes)?;
        debug!("Stored artifact {}", path.display());

        Ok(ArtifactHandle {
            path,
            filename: filename.to_string(),
            size: document.len() as u64,
            sha256: document.sha256.clone(),
        })
    }

    pub fn read(&self, handle: &ArtifactHandle) -> Result<Vec<u8>> {
        match std::fs::read(&handle.path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::NotFound(format!(
                "Output file not found: {}",
                handle.filename
            ))),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Delete everything stored for a job. Missing directories are ignored.
    pub fn remove(&self, job_id: &str) {
        let dir = self.job_dir(job_id);
        if !dir.exists() {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&dir) {
            warn!("Failed to remove artifacts for job {}: {}", job_id, e);
        }
    }
}

/// Download name for a given upload: `<stem>_processed.docx`.
pub fn output_filename(source_filename: &str) -> String {
    let stem = Path::new(source_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");
    format!("{}_processed.docx", stem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> GeneratedDocument {
        GeneratedDocument {
            bytes: b"PK fake".to_vec(),
            sha256: "abc".to_string(),
        }
    }

    #[test]
    fn test_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::open(dir.path().join("temp")).unwrap();

        let handle = store.write("job-1", "notes_processed.docx", &document()).unwrap();
        assert_eq!(handle.path, dir.path().join("temp/job-1/notes_processed.docx"));
        assert_eq!(handle.size, 7);
        assert_eq!(store.read(&handle).unwrap(), b"PK fake");

        store.remove("job-1");
        assert!(!dir.path().join("temp/job-1").exists());
        assert!(matches!(store.read(&handle), Err(Error::NotFound(_))));

        // Removing twice is harmless.
        store.remove("job-1");
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(output_filename("notes.txt"), "notes_processed.docx");
        assert_eq!(output_filename("my.report.txt"), "my.report_processed.docx");
        assert_eq!(output_filename(""), "document_processed.docx");
    }
}
