//! Ads Error Types
//!
//! Ads-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::entities::AdStatus;

pub type AdsResult<T> = Result<T, AdsError>;

#[derive(Debug, Error)]
pub enum AdsError {
    #[error("Ad slot {0} does not exist")]
    SlotNotFound(i32),

    #[error("Ad slot {0} is not accepting bookings")]
    SlotDisabled(i32),

    /// A Pending or Active ad already covers part of the requested range
    #[error("Ad slot {slot_number} is already booked for the requested dates")]
    SlotOccupied { slot_number: i32 },

    #[error("Advertisement not found")]
    AdNotFound,

    #[error("Cannot move an advertisement from {from} to {to}")]
    InvalidTransition { from: AdStatus, to: AdStatus },

    #[error("Advertisement ended on {0}")]
    AlreadyEnded(chrono::NaiveDate),

    /// Validation and permission failures raised as `AppError`
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdsError::SlotNotFound(_) | AdsError::AdNotFound => ErrorKind::NotFound,
            AdsError::SlotDisabled(_) => ErrorKind::UnprocessableEntity,
            AdsError::SlotOccupied { .. } | AdsError::InvalidTransition { .. } => {
                ErrorKind::Conflict
            }
            AdsError::AlreadyEnded(_) => ErrorKind::Gone,
            AdsError::App(e) => e.kind(),
            AdsError::Database(_) | AdsError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            AdsError::SlotNotFound(_) => Some("AD_SLOT_NOT_FOUND"),
            AdsError::SlotDisabled(_) => Some("AD_SLOT_DISABLED"),
            AdsError::SlotOccupied { .. } => Some("AD_SLOT_OCCUPIED"),
            AdsError::AdNotFound => Some("AD_NOT_FOUND"),
            AdsError::InvalidTransition { .. } => Some("AD_INVALID_TRANSITION"),
            AdsError::AlreadyEnded(_) => Some("AD_ALREADY_ENDED"),
            AdsError::App(e) => e.code(),
            AdsError::Database(_) | AdsError::Internal(_) => None,
        }
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            AdsError::App(e) => e,
            AdsError::Database(e) => AppError::from(e),
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
            AdsError::Database(e) => {
                tracing::error!(error = %e, "Ads database error");
            }
            AdsError::Internal(msg) => {
                tracing::error!(message = %msg, "Ads internal error");
            }
            AdsError::SlotOccupied { slot_number } => {
                tracing::info!(slot_number, "Booking rejected: slot occupied");
            }
            _ => {
                tracing::debug!(error = %self, "Ads error");
            }
        }
    }
}

impl IntoResponse for AdsError {
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
        let cases = [
            (AdsError::SlotNotFound(3), StatusCode::NOT_FOUND),
            (AdsError::SlotOccupied { slot_number: 1 }, StatusCode::CONFLICT),
            (AdsError::SlotDisabled(2), StatusCode::UNPROCESSABLE_ENTITY),
            (
                AdsError::InvalidTransition {
                    from: AdStatus::Expired,
                    to: AdStatus::Active,
                },
                StatusCode::CONFLICT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_codes() {
        assert_eq!(
            AdsError::SlotOccupied { slot_number: 4 }.code(),
            Some("AD_SLOT_OCCUPIED")
        );
        let err: AdsError = AppError::forbidden("no").with_code("ROLE_REQUIRED").into();
        assert_eq!(err.into_app_error().code(), Some("ROLE_REQUIRED"));
    }
}
