//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the OTP
//! delivery port.

pub mod entity;
pub mod notifier;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    auth::Auth, auth_session::AuthSession, user::User, verification_code::VerificationCode,
};
pub use notifier::{NotifyError, OtpNotifier};
pub use repository::{
    AuthRepository, AuthSessionRepository, AuthStore, UserRepository, VerificationCodeRepository,
};
