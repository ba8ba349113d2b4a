//! Command-line client for a running DocForge server.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::routes::extraction::API_PREFIX;

const POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// The fields of a job response the CLI cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct JobView {
    pub job_id: String,
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobView {
    pub fn is_terminal(&self) -> bool {
        self.status == "complete" || self.status == "failed"
    }
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Server URL from `DOCFORGE_SERVER_URL`, or the local default.
    pub fn from_env() -> Self {
        let url = std::env::var("DOCFORGE_SERVER_URL")
            .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self::new(&url)
    }

    fn extraction_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    /// Upload a file for processing.
    pub async fn upload_file(
        &self,
        path: &Path,
        issuer_id: &str,
        user_email: &str,
    ) -> anyhow::Result<JobView> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.txt")
            .to_string();

        let part = Part::bytes(bytes).file_name(filename).mime_str("text/plain")?;
        let form = Form::new()
            .part("file", part)
            .text("issuer_id", issuer_id.to_string())
            .text("user_email", user_email.to_string());

        let response = self
            .http
            .post(self.extraction_url("/upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            bail!("Upload failed ({}): {}", status, response.text().await?);
        }
        Ok(response.json().await?)
    }

    /// Get the status of a processing job.
    pub async fn get_job_status(&self, job_id: &str) -> anyhow::Result<JobView> {
        let response = self
            .http
            .get(self.extraction_url(&format!("/status/{}", job_id)))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            bail!("Failed to get status ({}): {}", status, response.text().await?);
        }
        Ok(response.json().await?)
    }

    /// Poll until the job is complete or failed.
    pub async fn wait_for_completion(
        &self,
        job_id: &str,
        timeout: Duration,
    ) -> anyhow::Result<JobView> {
        let started = Instant::now();
        while started.elapsed() < timeout {
            let job = self.get_job_status(job_id).await?;
            if job.is_terminal() {
                return Ok(job);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        bail!("Job {} did not finish within {}s", job_id, timeout.as_secs())
    }

    /// Download a completed job's document to `output`. Returns the byte count.
    pub async fn download(&self, job_id: &str, output: &Path) -> anyhow::Result<u64> {
        let response = self
            .http
            .get(self.extraction_url(&format!("/download/{}", job_id)))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            bail!("Download failed ({}): {}", status, response.text().await?);
        }
        let bytes = response.bytes().await?;
        tokio::fs::write(output, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", output.display()))?;
        Ok(bytes.len() as u64)
    }
}
