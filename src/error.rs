//! Error types for the cleaning task service
//!
//! Provides unified error handling using thiserror. Every failure that reaches
//! a handler is an [`AppError`]; the storage layer reports [`StoreError`] and
//! is classified at the operation boundary with [`AppError::context`].

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::db::StoreError;
use crate::models::ErrorResponse;
use crate::staff::DirectoryError;

// == App Error Enum ==
/// Unified error type for the service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid, missing or malformed argument
    #[error("{0}")]
    InvalidRequest(String),

    /// Missing or invalid bearer token
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to use the route
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist, or a collection is empty
    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure
    #[error("{0}")]
    Internal(String),

    /// Unclassified storage failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Unclassified identity directory failure
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
}

impl AppError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// HTTP status the error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) | AppError::Store(_) | AppError::Directory(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Classifies the error at an operation boundary.
    ///
    /// Classified errors pass through unchanged; unclassified storage or
    /// directory failures become `Internal` with `msg` as prefix.
    pub fn context(self, msg: &str) -> Self {
        match self {
            AppError::Store(source) => AppError::Internal(format!("{msg}: {source}")),
            AppError::Directory(source) => AppError::Internal(format!("{msg}: {source}")),
            classified => classified,
        }
    }
}

/// Classifies any failure convertible into [`AppError`] at an operation boundary.
pub trait ResultExt<T> {
    fn context(self, msg: &str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AppError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let err: AppError = e.into();
            err.context(msg)
        })
    }
}

// == Extractor Rejections ==
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = Json(ErrorResponse::new(self.to_string(), status.as_u16()));
        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the service.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::invalid("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("missing").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Store(StoreError::Duplicate).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_context_wraps_unclassified() {
        let err = AppError::Store(StoreError::MissingReference).context("Error creating area");
        assert!(matches!(err, AppError::Internal(ref msg) if msg.starts_with("Error creating area")));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), StoreError> = Err(StoreError::Duplicate);
        let err = result.context("Error adding template").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_context_keeps_classified() {
        let err = AppError::not_found("Cleaning task list not found").context("Error deleting");
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Cleaning task list not found"));
    }
}
