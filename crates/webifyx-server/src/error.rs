use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use webifyx_core::StorageError;

use crate::response::ErrorResponse;

/// Error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{ "success": false, "error": ... }`
/// bodies with a matching status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Storage(StorageError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "Site not found".to_string())
            }
            ApiError::Storage(err @ StorageError::Conflict { .. }) => {
                (StatusCode::CONFLICT, err.to_string())
            }
            ApiError::Storage(err @ StorageError::Invalid(_)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
