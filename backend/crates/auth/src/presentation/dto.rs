//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::ProfileOutput;
use crate::domain::value_object::{otp::VerificationPurpose, user_role::UserRole};

// ============================================================================
// Sign Up
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_name: String,
    pub password: String,
    /// `member` (default), `agent` or `builder`
    #[serde(default)]
    pub account_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpResponse {
    pub public_id: String,
}

// ============================================================================
// Sign In
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// Email or phone number
    pub identifier: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub public_id: String,
    pub role: UserRole,
}

// ============================================================================
// Session Status
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub public_id: Option<String>,
    pub role: Option<UserRole>,
    pub verified: Option<bool>,
    pub expires_at_ms: Option<i64>,
}

impl SessionStatusResponse {
    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            public_id: None,
            role: None,
            verified: None,
            expires_at_ms: None,
        }
    }
}

// ============================================================================
// OTP
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    pub identifier: String,
    pub purpose: VerificationPurpose,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequestResponse {
    pub expires_in_secs: u64,
    pub resend_after_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerifyRequest {
    pub identifier: String,
    pub purpose: VerificationPurpose,
    pub code: String,
    #[serde(default)]
    pub remember_me: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerifyResponse {
    pub public_id: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub phone_verified: bool,
    /// True when a session cookie was issued
    pub signed_in: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub identifier: String,
    pub code: String,
    pub new_password: String,
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleRequest {
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleResponse {
    pub public_id: String,
    pub role: UserRole,
}

/// Current user profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoResponse {
    pub public_id: String,
    pub display_name: String,
    pub role: UserRole,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileOutput> for UserInfoResponse {
    fn from(p: ProfileOutput) -> Self {
        Self {
            public_id: p.public_id,
            display_name: p.display_name,
            role: p.role,
            email: p.email,
            phone: p.phone,
            email_verified: p.email_verified,
            phone_verified: p.phone_verified,
            created_at: p.created_at,
        }
    }
}
