//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod request_otp;
pub mod reset_password;
pub mod session_token;
pub mod set_role;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod verify_otp;

// Re-exports
pub use check_session::{CheckSessionUseCase, ProfileOutput, SessionInfoOutput};
pub use config::AuthConfig;
pub use request_otp::{RequestOtpInput, RequestOtpOutput, RequestOtpUseCase};
pub use reset_password::{ResetPasswordInput, ResetPasswordUseCase};
pub use set_role::SetRoleUseCase;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use verify_otp::{VerifyOtpInput, VerifyOtpOutput, VerifyOtpUseCase};
