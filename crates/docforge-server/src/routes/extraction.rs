//! Document extraction routes — upload, status, download.
//! Mounted under /api/v1/doc-extraction.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use docforge_core::{Error, SubmissionMetadata, UploadedFile};
use docforge_docx::DOCX_MEDIA_TYPE;
use docforge_runtime::{ArtifactHandle, Job, JobStatus, JobSummary, StatusChange};

use crate::error::ApiError;
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1/doc-extraction";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload_document))
        .route("/status/{job_id}", get(get_job_status))
        .route("/download/{job_id}", get(download_document))
        .route("/jobs", get(get_job_summary))
}

/// Job state as returned to clients.
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub message: String,
    /// Sanitized name of the uploaded file.
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub download_url: Option<String>,
    /// Download filename, size and sha256 of the generated document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub history: Vec<StatusChange>,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        let download_url = (job.status == JobStatus::Complete)
            .then(|| format!("{}/download/{}", API_PREFIX, job.job_id));
        Self {
            job_id: job.job_id,
            status: job.status,
            message: job.message,
            filename: job.filename,
            created_at: job.created_at,
            updated_at: job.updated_at,
            download_url,
            artifact: job.artifact,
            error: job.error,
            history: job.history,
        }
    }
}

/// POST /upload — multipart form with `file`, `issuer_id`, `user_email`.
async fn upload_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<JobResponse>, ApiError> {
    let max_mb = state.config.limits.max_file_size_mb;
    let mut file = None;
    let mut issuer_id = None;
    let mut user_email = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_mb))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(|c| c.to_string());
                let bytes = field.bytes().await.map_err(|e| multipart_error(e, max_mb))?;
                file = Some(UploadedFile::new(filename, content_type, bytes.to_vec()));
            }
            "issuer_id" => {
                issuer_id = Some(field.text().await.map_err(|e| multipart_error(e, max_mb))?);
            }
            "user_email" => {
                user_email = Some(field.text().await.map_err(|e| multipart_error(e, max_mb))?);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| missing_field("file"))?;
    let metadata = SubmissionMetadata::new(
        issuer_id.ok_or_else(|| missing_field("issuer_id"))?.trim(),
        user_email.ok_or_else(|| missing_field("user_email"))?.trim(),
    );

    info!(
        "Upload received: {} ({} bytes) from issuer {}",
        file.filename,
        file.size(),
        metadata.issuer_id
    );

    let worker_state = state.clone();
    let job = tokio::task::spawn_blocking(move || worker_state.processor.submit(file, metadata))
        .await
        .map_err(|e| Error::Internal(format!("processing task failed: {}", e)))??;

    Ok(Json(JobResponse::from(job)))
}

/// GET /status/:job_id — current job state.
async fn get_job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state.processor.get_status(&job_id)?;
    Ok(Json(JobResponse::from(job)))
}

/// GET /download/:job_id — the generated document.
async fn download_document(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let (handle, bytes) = state.processor.read_artifact(&job_id)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        header_safe_filename(&handle.filename)
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, DOCX_MEDIA_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// GET /jobs — job counts per status.
async fn get_job_summary(State(state): State<Arc<AppState>>) -> Json<JobSummary> {
    Json(state.processor.summary())
}

fn missing_field(name: &str) -> Error {
    Error::Validation(format!("Missing form field: {}", name))
}

fn multipart_error(err: MultipartError, max_mb: u64) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::Validation(format!(
            "File size exceeds maximum allowed size of {}MB",
            max_mb
        ))
    } else {
        Error::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Printable ASCII only, no quotes, so the name fits in a header value.
fn header_safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
