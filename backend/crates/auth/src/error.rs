//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Email address is already registered")]
    EmailTaken,

    #[error("Phone number is already registered")]
    PhoneTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is temporarily locked")]
    AccountLocked { retry_after_secs: i64 },

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Session not found or expired")]
    SessionInvalid,

    #[error("Session fingerprint mismatch")]
    SessionFingerprintMismatch,

    #[error("Missing required header: {0}")]
    MissingHeader(String),

    #[error("This password has appeared in a data breach")]
    PasswordCompromised,

    #[error("Too many verification codes requested")]
    OtpRateLimited { retry_after_secs: i64 },

    #[error("Please wait before requesting another code")]
    OtpCooldown { retry_after_secs: i64 },

    #[error("Verification code is incorrect")]
    OtpInvalid,

    #[error("Verification code has expired or was already used")]
    OtpExpired,

    #[error("Too many incorrect attempts; request a new code")]
    OtpExhausted,

    #[error("No {0} on file for this account")]
    ChannelUnavailable(&'static str),

    #[error("{0} is already verified")]
    AlreadyVerified(&'static str),

    #[error("Verification code could not be delivered")]
    DeliveryFailed,

    /// Validation and permission failures raised as `AppError`
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken | AuthError::PhoneTaken | AuthError::AlreadyVerified(_) => {
                ErrorKind::Conflict
            }
            AuthError::InvalidCredentials
            | AuthError::SessionInvalid
            | AuthError::SessionFingerprintMismatch => ErrorKind::Unauthorized,
            AuthError::AccountLocked { .. } => ErrorKind::Locked,
            AuthError::AccountDisabled => ErrorKind::Forbidden,
            AuthError::MissingHeader(_)
            | AuthError::PasswordCompromised
            | AuthError::OtpInvalid => ErrorKind::BadRequest,
            AuthError::OtpRateLimited { .. } | AuthError::OtpCooldown { .. } => {
                ErrorKind::TooManyRequests
            }
            AuthError::OtpExpired | AuthError::OtpExhausted => ErrorKind::Gone,
            AuthError::ChannelUnavailable(_) => ErrorKind::UnprocessableEntity,
            AuthError::DeliveryFailed => ErrorKind::ServiceUnavailable,
            AuthError::App(e) => e.kind(),
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Machine-readable code for clients
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AuthError::UserNotFound => Some("USER_NOT_FOUND"),
            AuthError::EmailTaken => Some("EMAIL_TAKEN"),
            AuthError::PhoneTaken => Some("PHONE_TAKEN"),
            AuthError::InvalidCredentials => Some("INVALID_CREDENTIALS"),
            AuthError::AccountLocked { .. } => Some("ACCOUNT_LOCKED"),
            AuthError::AccountDisabled => Some("ACCOUNT_DISABLED"),
            AuthError::SessionInvalid | AuthError::SessionFingerprintMismatch => {
                Some("SESSION_INVALID")
            }
            AuthError::MissingHeader(_) => Some("MISSING_HEADER"),
            AuthError::PasswordCompromised => Some("PASSWORD_COMPROMISED"),
            AuthError::OtpRateLimited { .. } => Some("OTP_RATE_LIMITED"),
            AuthError::OtpCooldown { .. } => Some("OTP_COOLDOWN"),
            AuthError::OtpInvalid => Some("OTP_INVALID"),
            AuthError::OtpExpired => Some("OTP_EXPIRED"),
            AuthError::OtpExhausted => Some("OTP_ATTEMPTS_EXHAUSTED"),
            AuthError::ChannelUnavailable(_) => Some("CHANNEL_UNAVAILABLE"),
            AuthError::AlreadyVerified(_) => Some("ALREADY_VERIFIED"),
            AuthError::DeliveryFailed => Some("OTP_DELIVERY_FAILED"),
            AuthError::App(e) => e.code(),
            AuthError::Database(_) | AuthError::Internal(_) => None,
        }
    }

    fn retry_after_secs(&self) -> Option<i64> {
        match self {
            AuthError::AccountLocked { retry_after_secs }
            | AuthError::OtpRateLimited { retry_after_secs }
            | AuthError::OtpCooldown { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }

    pub fn into_app_error(self) -> AppError {
        match self {
            AuthError::App(e) => e,
            // Keeps the SQLSTATE mapping (unique violation → 409 etc.)
            AuthError::Database(e) => AppError::from(e),
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
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountLocked { .. } => {
                tracing::warn!("Login attempt on locked account");
            }
            AuthError::SessionFingerprintMismatch => {
                tracing::warn!("Session fingerprint mismatch detected");
            }
            AuthError::OtpExhausted | AuthError::OtpRateLimited { .. } => {
                tracing::warn!(error = %self, "OTP abuse signal");
            }
            AuthError::DeliveryFailed => {
                tracing::error!("OTP delivery failed on every channel");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let retry_after = self.retry_after_secs();
        let mut response = self.into_app_error().into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }
        response
    }
}

impl From<platform::client::FingerprintError> for AuthError {
    fn from(err: platform::client::FingerprintError) -> Self {
        match err {
            platform::client::FingerprintError::MissingHeader(header) => {
                AuthError::MissingHeader(header)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::AccountLocked { retry_after_secs: 60 }, StatusCode::LOCKED),
            (AuthError::AccountDisabled, StatusCode::FORBIDDEN),
            (AuthError::EmailTaken, StatusCode::CONFLICT),
            (AuthError::OtpExpired, StatusCode::GONE),
            (AuthError::OtpExhausted, StatusCode::GONE),
            (AuthError::DeliveryFailed, StatusCode::SERVICE_UNAVAILABLE),
            (AuthError::OtpCooldown { retry_after_secs: 5 }, StatusCode::TOO_MANY_REQUESTS),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_retry_after_header() {
        let response = AuthError::OtpRateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }

    #[test]
    fn test_app_error_passthrough() {
        let err: AuthError = AppError::forbidden("nope").with_code("ROLE_REQUIRED").into();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.code(), Some("ROLE_REQUIRED"));
    }
}
