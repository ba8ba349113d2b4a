//! Processor — runs validate → extract → generate and tracks each job.

use chrono::Utc;
use docforge_core::{DocForgeConfig, Error, Result, SubmissionMetadata, UploadedFile};
use docforge_ingest::{sanitize_filename, Validator};
use tracing::{error, info};

use crate::artifacts::{output_filename, ArtifactStore};
use crate::jobs::JobStore;
use crate::types::{ArtifactHandle, Job, JobStatus, JobSummary};

/// Owns the job table and the artifact store; one per process.
pub struct Processor {
    validator: Validator,
    jobs: JobStore,
    artifacts: ArtifactStore,
}

impl Processor {
    pub fn new(config: &DocForgeConfig) -> Result<Self> {
        let artifacts = ArtifactStore::open(&config.temp_storage_path)?;
        info!(
            "Processor initialized: max_upload={}MB, extensions={:?}, storage={}",
            config.limits.max_file_size_mb,
            config.limits.allowed_extensions,
            artifacts.root().display()
        );
        Ok(Self {
            validator: Validator::new(config.limits.clone()),
            jobs: JobStore::new(&config.retention),
            artifacts,
        })
    }

    /// Run the full pipeline for one upload.
    ///
    /// Validation failures return before a job exists. Any later failure is
    /// recorded on the job and returned as [`Error::JobFailed`].
    pub fn submit(&self, file: UploadedFile, metadata: SubmissionMetadata) -> Result<Job> {
        let job_id = uuid::Uuid::new_v4().to_string();
        let mut job = Job::new(&job_id, sanitize_filename(&file.filename));

        job.transition(JobStatus::Validating);
        self.validator.validate(&file, &metadata)?;

        for old in self.jobs.insert(job) {
            self.artifacts.remove(&old.job_id);
        }
        info!("Job {} accepted: {} ({} bytes)", job_id, file.filename, file.size());

        match self.run_stages(&job_id, &file, &metadata) {
            Ok(handle) => {
                let job = self
                    .jobs
                    .update(&job_id, |j| j.complete(handle))
                    .ok_or_else(|| Error::NotFound(format!("Job {} evicted during processing", job_id)))?;
                info!("Job {} complete", job_id);
                Ok(job)
            }
            Err(e) => {
                let detail = e.to_string();
                error!("Job {} failed: {}", job_id, detail);
                self.jobs.update(&job_id, |j| j.fail(&detail));
                self.artifacts.remove(&job_id);
                Err(Error::JobFailed {
                    job_id,
                    source: Box::new(e),
                })
            }
        }
    }

    fn run_stages(
        &self,
        job_id: &str,
        file: &UploadedFile,
        metadata: &SubmissionMetadata,
    ) -> Result<ArtifactHandle> {
        self.set_status(job_id, JobStatus::Extracting);
        let extraction = docforge_ingest::extract(file, metadata)?;

        self.set_status(job_id, JobStatus::Generating);
        let document = docforge_docx::generate(&extraction)?;
        self.artifacts
            .write(job_id, &output_filename(&extraction.source_filename), &document)
    }

    fn set_status(&self, job_id: &str, status: JobStatus) {
        self.jobs.update(job_id, |j| j.transition(status));
    }

    /// Current state of a job.
    pub fn get_status(&self, job_id: &str) -> Result<Job> {
        self.jobs
            .get(job_id)
            .ok_or_else(|| Error::NotFound("Job not found".into()))
    }

    /// Artifact handle of a completed job.
    pub fn get_artifact(&self, job_id: &str) -> Result<ArtifactHandle> {
        let job = self.get_status(job_id)?;
        if job.status != JobStatus::Complete {
            return Err(Error::NotReady(format!("job {} is {}", job_id, job.status)));
        }
        job.artifact
            .ok_or_else(|| Error::NotFound("Output file not found".into()))
    }

    /// Artifact handle and bytes of a completed job.
    pub fn read_artifact(&self, job_id: &str) -> Result<(ArtifactHandle, Vec<u8>)> {
        let handle = self.get_artifact(job_id)?;
        let bytes = self.artifacts.read(&handle)?;
        Ok((handle, bytes))
    }

    pub fn summary(&self) -> JobSummary {
        self.jobs.summary()
    }

    /// Evict finished jobs past their retention window along with their artifacts.
    pub fn sweep_expired(&self) -> usize {
        let expired = self.jobs.sweep_expired(Utc::now());
        for job in &expired {
            self.artifacts.remove(&job.job_id);
        }
        if !expired.is_empty() {
            info!("Swept {} expired jobs", expired.len());
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::io::Read;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn test_processor() -> (Processor, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = DocForgeConfig::with_storage(dir.path().join("temp"));
        (Processor::new(&config).unwrap(), dir)
    }

    fn meta() -> SubmissionMetadata {
        SubmissionMetadata::new("I-1", "a@b.com")
    }

    fn text_file(name: &str, text: &str) -> UploadedFile {
        UploadedFile::new(name, Some("text/plain".into()), text.as_bytes().to_vec())
    }

    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name("word/document.xml").unwrap();
        let mut xml = String::new();
        entry.read_to_string(&mut xml).unwrap();
        xml
    }

    #[test]
    fn test_submit_completes() {
        let (processor, _dir) = test_processor();
        let text = "Quarterly report: revenue up, costs down. Thanks!!";
        assert_eq!(text.len(), 50);

        let job = processor.submit(text_file("report.txt", text), meta()).unwrap();
        assert_eq!(job.status, JobStatus::Complete);
        assert!(job.error.is_none());

        let statuses: Vec<JobStatus> = job.history.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![
                JobStatus::Received,
                JobStatus::Validating,
                JobStatus::Extracting,
                JobStatus::Generating,
                JobStatus::Complete
            ]
        );

        let polled = processor.get_status(&job.job_id).unwrap();
        assert_eq!(polled.status, JobStatus::Complete);

        let (handle, bytes) = processor.read_artifact(&job.job_id).unwrap();
        assert_eq!(handle.filename, "report_processed.docx");
        assert!(!bytes.is_empty());
        let xml = document_xml(&bytes);
        assert!(xml.contains(">Quarterly report: revenue up, costs down. Thanks!!<"));
        assert!(xml.contains(">I-1<"));
        assert!(xml.contains(">a@b.com<"));
    }

    #[test]
    fn test_rejected_upload_creates_no_job() {
        let (processor, dir) = test_processor();
        let err = processor
            .submit(text_file("payload.exe", "MZ"), meta())
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(processor.summary().total, 0);
        assert_eq!(std::fs::read_dir(dir.path().join("temp")).unwrap().count(), 0);
    }

    #[test]
    fn test_oversized_upload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DocForgeConfig::with_storage(dir.path());
        config.limits.max_file_size_mb = 1;
        let processor = Processor::new(&config).unwrap();

        let file = UploadedFile::new("big.txt", None, vec![b'a'; 1024 * 1024 + 1]);
        let err = processor.submit(file, meta()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(processor.summary().total, 0);
    }

    #[test]
    fn test_invalid_utf8_fails_job() {
        let (processor, _dir) = test_processor();
        let file = UploadedFile::new("bad.txt", None, vec![b'o', b'k', 0xC3, 0x28]);
        let err = processor.submit(file, meta()).unwrap_err();

        let job_id = err.job_id().unwrap().to_string();
        assert!(matches!(err, Error::JobFailed { .. }));

        let job = processor.get_status(&job_id).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.error.unwrap().contains("invalid UTF-8"));
        assert!(job.artifact.is_none());
        assert!(matches!(processor.get_artifact(&job_id), Err(Error::NotReady(_))));
    }

    #[test]
    fn test_unknown_job_not_found() {
        let (processor, _dir) = test_processor();
        assert!(matches!(processor.get_status("nope"), Err(Error::NotFound(_))));
        assert!(matches!(processor.get_artifact("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_identical_inputs_identical_artifacts() {
        let (processor, _dir) = test_processor();
        let a = processor.submit(text_file("same.txt", "same\ttext"), meta()).unwrap();
        let b = processor.submit(text_file("same.txt", "same\ttext"), meta()).unwrap();
        assert_ne!(a.job_id, b.job_id);

        let (_, bytes_a) = processor.read_artifact(&a.job_id).unwrap();
        let (_, bytes_b) = processor.read_artifact(&b.job_id).unwrap();
        assert_eq!(bytes_a, bytes_b);
        assert_eq!(a.artifact.unwrap().sha256, b.artifact.unwrap().sha256);
    }

    #[test]
    fn test_concurrent_submissions() {
        let (processor, _dir) = test_processor();
        let processor = Arc::new(processor);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let processor = Arc::clone(&processor);
                thread::spawn(move || {
                    let file = text_file(&format!("doc{}.txt", i), &format!("document {}", i));
                    processor.submit(file, meta()).unwrap()
                })
            })
            .collect();

        let ids: HashSet<String> = handles
            .into_iter()
            .map(|h| h.join().unwrap().job_id)
            .collect();
        assert_eq!(ids.len(), 16);

        let summary = processor.summary();
        assert_eq!(summary.complete, 16);
        assert_eq!(summary.total, 16);
        for id in &ids {
            assert!(processor.read_artifact(id).is_ok());
        }
    }

    #[test]
    fn test_capacity_eviction_removes_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DocForgeConfig::with_storage(dir.path());
        config.retention.max_jobs = 1;
        let processor = Processor::new(&config).unwrap();

        let first = processor.submit(text_file("one.txt", "one"), meta()).unwrap();
        let second = processor.submit(text_file("two.txt", "two"), meta()).unwrap();

        assert!(matches!(processor.get_status(&first.job_id), Err(Error::NotFound(_))));
        assert!(!dir.path().join(&first.job_id).exists());
        assert!(dir.path().join(&second.job_id).exists());
    }

    #[test]
    fn test_sweep_expired() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DocForgeConfig::with_storage(dir.path());
        config.retention.job_ttl = Duration::from_secs(0);
        let processor = Processor::new(&config).unwrap();

        let job = processor.submit(text_file("one.txt", "one"), meta()).unwrap();
        assert_eq!(processor.sweep_expired(), 1);
        assert!(matches!(processor.get_status(&job.job_id), Err(Error::NotFound(_))));
        assert!(!dir.path().join(&job.job_id).exists());
    }
}
