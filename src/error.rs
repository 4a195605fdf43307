// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Every layer (store, service, handlers) reports failures through it,
/// and the HTTP boundary maps each kind to a status code.
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request: rejected before any storage access
    Validation(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict: the comment is already soft-deleted
    AlreadyDeleted(String),

    // 500 Internal Server Error: connectivity, timeout, constraint violation
    Storage(String),
}

impl AppError {
    pub fn comment_not_found(id: i64) -> Self {
        AppError::NotFound(format!("Comment {} not found", id))
    }

    pub fn parent_not_found(id: i64) -> Self {
        AppError::NotFound(format!("Parent comment {} not found", id))
    }

    pub fn comment_deleted(id: i64) -> Self {
        AppError::AlreadyDeleted(format!("Comment {} is already deleted", id))
    }

    pub fn parent_deleted(id: i64) -> Self {
        AppError::AlreadyDeleted(format!("Parent comment {} is already deleted", id))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "validation error: {}", msg),
            AppError::NotFound(msg) => write!(f, "not found: {}", msg),
            AppError::AlreadyDeleted(msg) => write!(f, "already deleted: {}", msg),
            AppError::Storage(msg) => write!(f, "storage error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
/// Storage details are logged but never sent to the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::AlreadyDeleted(msg) => (StatusCode::CONFLICT, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::Storage`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
