//! One-time passcode value objects

use derive_more::Display;
use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const OTP_LENGTH: usize = 6;

/// Exactly six ASCII digits
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        if trimmed.len() != OTP_LENGTH || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::bad_request(format!(
                "Verification code must be exactly {OTP_LENGTH} digits"
            ))
            .with_code("INVALID_OTP_FORMAT"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Fresh uniformly distributed code
    pub fn generate() -> Self {
        Self(platform::crypto::random_numeric_code(OTP_LENGTH))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OtpCode").field(&"[REDACTED]").finish()
    }
}

/// What a verification code proves
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum VerificationPurpose {
    #[display("verify_email")]
    VerifyEmail = 0,
    #[display("verify_phone")]
    VerifyPhone = 1,
    #[display("sign_in")]
    SignIn = 2,
    #[display("reset_password")]
    ResetPassword = 3,
}

impl VerificationPurpose {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::VerifyEmail),
            1 => Some(Self::VerifyPhone),
            2 => Some(Self::SignIn),
            3 => Some(Self::ResetPassword),
            _ => None,
        }
    }

    /// Channels to try, most preferred first
    pub const fn channel_preference(&self) -> &'static [OtpChannel] {
        match self {
            Self::VerifyEmail => &[OtpChannel::Email],
            Self::VerifyPhone => &[OtpChannel::Sms],
            Self::SignIn | Self::ResetPassword => &[OtpChannel::Sms, OtpChannel::Email],
        }
    }
}

/// Delivery channel for a code
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum OtpChannel {
    #[display("sms")]
    Sms = 0,
    #[display("email")]
    Email = 1,
}

impl OtpChannel {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Sms),
            1 => Some(Self::Email),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_parse() {
        assert_eq!(OtpCode::parse(" 042917 ").unwrap().as_str(), "042917");
        assert!(OtpCode::parse("42917").is_err());
        assert!(OtpCode::parse("0429170").is_err());
        assert!(OtpCode::parse("04291a").is_err());
        assert!(OtpCode::parse("０４２９１７").is_err());
    }

    #[test]
    fn test_generate() {
        let code = OtpCode::generate();
        assert_eq!(code.as_str().len(), OTP_LENGTH);
        assert!(!format!("{code:?}").contains(code.as_str()));
    }

    #[test]
    fn test_channel_preference() {
        assert_eq!(
            VerificationPurpose::SignIn.channel_preference(),
            &[OtpChannel::Sms, OtpChannel::Email]
        );
        assert_eq!(
            VerificationPurpose::VerifyEmail.channel_preference(),
            &[OtpChannel::Email]
        );
    }

    #[test]
    fn test_ids_and_display() {
        assert_eq!(VerificationPurpose::from_id(3), Some(VerificationPurpose::ResetPassword));
        assert_eq!(VerificationPurpose::from_id(9), None);
        assert_eq!(OtpChannel::from_id(OtpChannel::Email.id()), Some(OtpChannel::Email));
        assert_eq!(VerificationPurpose::VerifyPhone.to_string(), "verify_phone");
    }
}
