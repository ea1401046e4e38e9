//! Forum Error Types
//!
//! Forum-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type ForumResult<T> = Result<T, ForumError>;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("Category not found")]
    CategoryNotFound,

    #[error("A category with slug '{0}' already exists")]
    CategoryExists(String),

    /// City categories are roots, property-type categories sit under a city
    #[error("Invalid category placement: {0}")]
    InvalidHierarchy(&'static str),

    #[error("Post not found")]
    PostNotFound,

    #[error("Reply not found")]
    ReplyNotFound,

    #[error("Post is locked")]
    PostLocked,

    /// Validation and permission failures raised as `AppError`
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ForumError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ForumError::CategoryNotFound | ForumError::PostNotFound | ForumError::ReplyNotFound => {
                ErrorKind::NotFound
            }
            ForumError::CategoryExists(_) => ErrorKind::Conflict,
            ForumError::InvalidHierarchy(_) => ErrorKind::UnprocessableEntity,
            ForumError::PostLocked => ErrorKind::Locked,
            ForumError::App(e) => e.kind(),
            ForumError::Database(_) | ForumError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            ForumError::CategoryNotFound => Some("CATEGORY_NOT_FOUND"),
            ForumError::CategoryExists(_) => Some("CATEGORY_EXISTS"),
            ForumError::InvalidHierarchy(_) => Some("INVALID_CATEGORY_PARENT"),
            ForumError::PostNotFound => Some("POST_NOT_FOUND"),
            ForumError::ReplyNotFound => Some("REPLY_NOT_FOUND"),
            ForumError::PostLocked => Some("POST_LOCKED"),
            ForumError::App(e) => e.code(),
            ForumError::Database(_) | ForumError::Internal(_) => None,
        }
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            ForumError::App(e) => e,
            ForumError::Database(e) => AppError::from(e),
            ForumError::PostLocked => AppError::locked("Post is locked")
                .with_code("POST_LOCKED")
                .with_action("Locked threads accept no new replies"),
            other => {
                let mut err = AppError::new(other.kind(), other.to_string());
                if let Some(code) = other.code() {
                    err = err.with_code(code);
                }
                err
            }
        }
    }

    fn log(&self) {
        match self {
            ForumError::Database(e) => {
                tracing::error!(error = %e, "Forum database error");
            }
            ForumError::Internal(msg) => {
                tracing::error!(message = %msg, "Forum internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Forum error");
            }
        }
    }
}

impl IntoResponse for ForumError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ForumError::PostLocked.into_response().status(), StatusCode::LOCKED);
        assert_eq!(
            ForumError::InvalidHierarchy("x").into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ForumError::CategoryExists("pune".into()).into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_locked_code() {
        let err = ForumError::PostLocked.into_app_error();
        assert_eq!(err.code(), Some("POST_LOCKED"));
        assert_eq!(err.status_code(), 423);
    }
}
