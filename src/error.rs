/// Unified error types for the gameshelf feed service
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum ShelfError {
    /// The data store could not be reached or failed at the transport level
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// An actor referenced by a follow list has no user record
    #[error("User not found for actor: {0}")]
    PartialUserNotFound(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored documents that failed to (de)serialize
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShelfError {
    /// True for failures that mean the store itself is unusable right now.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ShelfError::DataUnavailable(_) | ShelfError::Database(_))
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert ShelfError to HTTP response
impl IntoResponse for ShelfError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ShelfError::DataUnavailable(_) | ShelfError::Database(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "DataUnavailable",
                "Feed data is temporarily unavailable".to_string(),
            ),
            ShelfError::NotFound(_) | ShelfError::PartialUserNotFound(_) => {
                (StatusCode::NOT_FOUND, "NotFound", self.to_string())
            }
            ShelfError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
            }
            ShelfError::Serialization(_) | ShelfError::Io(_) | ShelfError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for service operations
pub type ShelfResult<T> = Result<T, ShelfError>;
