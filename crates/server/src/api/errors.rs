//! API error types mapped to HTTP status codes.
//!
//! Each [`ApiError`] variant maps to a specific HTTP status code and produces
//! a JSON response body `{"error": "message"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ragsearch_core::RetrievalError;
use serde_json::json;

/// Application-level error type that implements `IntoResponse`.
///
/// Each variant maps to an HTTP status code:
/// - `BadRequest` → 400
/// - `NotFound` → 404
/// - `BadGateway` → 502
/// - `ServiceUnavailable` → 503
/// - `Internal` → 500
#[derive(Debug)]
pub enum ApiError {
    /// Invalid request parameters (400).
    BadRequest(String),
    /// Resource not found (404).
    NotFound(String),
    /// The embedding provider failed (502).
    BadGateway(String),
    /// No corpus is loaded (503).
    ServiceUnavailable(String),
    /// Unexpected server error (500).
    Internal(String),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RetrievalError> for ApiError {
    fn from(err: RetrievalError) -> Self {
        let message = err.to_string();
        match err {
            RetrievalError::InvalidConfig { .. }
            | RetrievalError::DimensionMismatch { .. }
            | RetrievalError::NonFiniteEmbedding => ApiError::BadRequest(message),
            RetrievalError::EmptyCorpus => ApiError::ServiceUnavailable(message),
            RetrievalError::Provider(_) => ApiError::BadGateway(message),
            RetrievalError::IndexInconsistency { .. } => {
                tracing::error!(error = %message, "index inconsistency");
                ApiError::Internal(message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg)
            | ApiError::Internal(msg) => msg,
        };
        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragsearch_core::EmbeddingError;

    #[test]
    fn test_retrieval_error_status_mapping() {
        let cases = [
            (RetrievalError::EmptyCorpus, StatusCode::SERVICE_UNAVAILABLE),
            (
                RetrievalError::InvalidConfig {
                    reason: "alpha".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                RetrievalError::DimensionMismatch {
                    expected: 4,
                    actual: 3,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                RetrievalError::Provider(EmbeddingError::RequestFailed {
                    reason: "down".into(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                RetrievalError::IndexInconsistency {
                    details: "x".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }
}
