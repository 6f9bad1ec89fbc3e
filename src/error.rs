//! Unified error types for the check-in service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
#[derive(Error, Debug)]
pub enum AppError {
    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation errors (bad form input)
    #[error("{0}")]
    Validation(String),

    /// Authentication errors (bad credentials, missing session)
    #[error("{0}")]
    Authentication(String),

    /// Authorization errors (non-admin hitting admin routes)
    #[error("{0}")]
    Authorization(String),

    /// Conflict errors (e.g. duplicate email)
    #[error("{0}")]
    Conflict(String),

    /// Not found errors (unknown user id)
    #[error("{0}")]
    NotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert AppError to an HTTP response.
///
/// Handlers recover the user-facing taxonomy (validation, auth,
/// authorization, not-found) as flash + redirect before it ever reaches
/// this impl; this is the backstop for infrastructure failures.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string()),
            AppError::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "AuthenticationRequired",
                self.to_string(),
            ),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, "Forbidden", self.to_string()),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "Conflict", self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            AppError::Database(_) | AppError::Io(_) | AppError::Internal(_) => (
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
pub type AppResult<T> = Result<T, AppError>;
