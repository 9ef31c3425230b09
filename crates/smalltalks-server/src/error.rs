//! API error types.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use smalltalks_core::SmallTalksError;
use thiserror::Error;

/// API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Detection or rule loading failed.
    #[error("{0}")]
    Detection(#[from] SmallTalksError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Detection(SmallTalksError::SourceUnavailable { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "source_unavailable")
            }
            ApiError::Detection(SmallTalksError::InvalidPattern { .. })
            | ApiError::Detection(SmallTalksError::InvalidRuleData { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "invalid_rules")
            }
            ApiError::Detection(SmallTalksError::WordDetector(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "analysis_failed")
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_errors_are_service_unavailable() {
        let err = ApiError::from(SmallTalksError::SourceUnavailable {
            path: "intents.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        });
        assert_eq!(err.status_and_code(), (StatusCode::SERVICE_UNAVAILABLE, "source_unavailable"));
    }

    #[test]
    fn word_detector_errors_are_internal() {
        let err = ApiError::from(SmallTalksError::WordDetector("offline".into()));
        assert_eq!(err.status_and_code(), (StatusCode::INTERNAL_SERVER_ERROR, "analysis_failed"));
    }
}
