//! HTTP error responses for pipeline errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docforge_core::{Error, ErrorKind};
use tracing::{debug, error};

/// Wrapper so core errors can be returned from handlers.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::NotReady => StatusCode::CONFLICT,
            ErrorKind::Processing | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.0.to_string();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status, detail);
        } else {
            debug!("Request rejected ({}): {}", status, detail);
        }

        let mut body = serde_json::json!({
            "error": self.0.kind().as_str(),
            "detail": detail,
        });
        if let Some(job_id) = self.0.job_id() {
            body["job_id"] = serde_json::json!(job_id);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError(Error::Validation("bad".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(Error::NotFound("Job not found".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError(Error::NotReady("job x is failed".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError(Error::Generation("zip".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
