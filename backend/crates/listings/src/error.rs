//! Listings Error Types
//!
//! Listings-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::entities::{ListingType, PropertyStatus};

pub type ListingsResult<T> = Result<T, ListingsError>;

#[derive(Debug, Error)]
pub enum ListingsError {
    #[error("Builder not found")]
    BuilderNotFound,

    #[error("Project not found")]
    ProjectNotFound,

    #[error("Property listing not found")]
    PropertyNotFound,

    #[error("Agent profile not found")]
    AgentNotFound,

    /// Another row took the slug between lookup and insert
    #[error("Slug '{0}' is already taken")]
    SlugTaken(String),

    #[error("A {listing_type} listing cannot be marked {status}")]
    InvalidStatus {
        listing_type: ListingType,
        status: PropertyStatus,
    },

    #[error("Listing is not accepting enquiries")]
    ListingNotActive,

    #[error("Too many enquiries, retry in {retry_after_secs}s")]
    EnquiryRateLimited { retry_after_secs: u64 },

    /// Validation and permission failures raised as `AppError`
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ListingsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ListingsError::BuilderNotFound
            | ListingsError::ProjectNotFound
            | ListingsError::PropertyNotFound
            | ListingsError::AgentNotFound => ErrorKind::NotFound,
            ListingsError::SlugTaken(_) | ListingsError::ListingNotActive => ErrorKind::Conflict,
            ListingsError::InvalidStatus { .. } => ErrorKind::UnprocessableEntity,
            ListingsError::EnquiryRateLimited { .. } => ErrorKind::TooManyRequests,
            ListingsError::App(e) => e.kind(),
            ListingsError::Database(_) | ListingsError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            ListingsError::BuilderNotFound => Some("BUILDER_NOT_FOUND"),
            ListingsError::ProjectNotFound => Some("PROJECT_NOT_FOUND"),
            ListingsError::PropertyNotFound => Some("PROPERTY_NOT_FOUND"),
            ListingsError::AgentNotFound => Some("AGENT_NOT_FOUND"),
            ListingsError::SlugTaken(_) => Some("SLUG_TAKEN"),
            ListingsError::InvalidStatus { .. } => Some("INVALID_LISTING_STATUS"),
            ListingsError::ListingNotActive => Some("LISTING_NOT_ACTIVE"),
            ListingsError::EnquiryRateLimited { .. } => Some("ENQUIRY_RATE_LIMITED"),
            ListingsError::App(e) => e.code(),
            ListingsError::Database(_) | ListingsError::Internal(_) => None,
        }
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            ListingsError::App(e) => e,
            ListingsError::Database(e) => AppError::from(e),
            ListingsError::EnquiryRateLimited { retry_after_secs } => {
                AppError::too_many_requests("Too many enquiries")
                    .with_code("ENQUIRY_RATE_LIMITED")
                    .with_action(format!("Try again in {retry_after_secs} seconds"))
            }
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
            ListingsError::Database(e) => {
                tracing::error!(error = %e, "Listings database error");
            }
            ListingsError::Internal(msg) => {
                tracing::error!(message = %msg, "Listings internal error");
            }
            ListingsError::EnquiryRateLimited { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Enquiry rejected: rate limited");
            }
            _ => {
                tracing::debug!(error = %self, "Listings error");
            }
        }
    }
}

impl IntoResponse for ListingsError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}
