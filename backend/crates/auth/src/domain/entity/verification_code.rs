//! Verification Code Entity
//!
//! A one-time passcode sent over SMS or email. Only
//! `HMAC-SHA256(secret, code_id || code)` is stored, so a leaked table does
//! not reveal usable codes.

use chrono::{DateTime, Duration, Utc};
use platform::crypto::{constant_time_eq, hmac_sha256};
use uuid::Uuid;

use crate::domain::value_object::{
    otp::{OtpChannel, OtpCode, VerificationPurpose},
    user_id::UserId,
};

#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub code_id: Uuid,
    pub user_id: UserId,
    pub purpose: VerificationPurpose,
    pub channel: OtpChannel,
    pub code_hash: Vec<u8>,
    pub attempts: u16,
    pub max_attempts: u16,
    pub expires_at: DateTime<Utc>,
    /// Set once used or superseded
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Why a submitted code was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRejection {
    /// Already used or replaced by a newer code
    Consumed,
    Expired,
    /// Attempt budget spent
    Exhausted,
    /// Wrong code; attempts left afterwards
    Mismatch { remaining: u16 },
}

impl VerificationCode {
    pub fn issue(
        user_id: UserId,
        purpose: VerificationPurpose,
        channel: OtpChannel,
        code: &OtpCode,
        secret: &[u8],
        ttl: Duration,
        max_attempts: u16,
    ) -> Self {
        let now = Utc::now();
        let code_id = Uuid::new_v4();

        Self {
            code_id,
            user_id,
            purpose,
            channel,
            code_hash: Self::digest(secret, code_id, code).to_vec(),
            attempts: 0,
            max_attempts,
            expires_at: now + ttl,
            consumed_at: None,
            created_at: now,
        }
    }

    fn digest(secret: &[u8], code_id: Uuid, code: &OtpCode) -> [u8; 32] {
        let mut message = Vec::with_capacity(16 + code.as_str().len());
        message.extend_from_slice(code_id.as_bytes());
        message.extend_from_slice(code.as_str().as_bytes());
        hmac_sha256(secret, &message)
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.consumed_at.is_none() && now < self.expires_at && self.attempts < self.max_attempts
    }

    /// Check a submitted code at `now`. A mismatch costs one attempt and a
    /// match consumes the code; the caller persists either change.
    pub fn attempt(
        &mut self,
        secret: &[u8],
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<(), CodeRejection> {
        if self.consumed_at.is_some() {
            return Err(CodeRejection::Consumed);
        }
        if now >= self.expires_at {
            return Err(CodeRejection::Expired);
        }
        if self.attempts >= self.max_attempts {
            return Err(CodeRejection::Exhausted);
        }

        let expected = Self::digest(secret, self.code_id, code);
        if constant_time_eq(&expected, &self.code_hash) {
            self.consumed_at = Some(now);
            return Ok(());
        }

        self.attempts += 1;
        if self.attempts >= self.max_attempts {
            Err(CodeRejection::Exhausted)
        } else {
            Err(CodeRejection::Mismatch {
                remaining: self.max_attempts - self.attempts,
            })
        }
    }

    /// Seconds until another code may be sent
    pub fn cooldown_remaining(&self, cooldown: Duration, now: DateTime<Utc>) -> i64 {
        (self.created_at + cooldown - now).num_seconds().max(0)
    }
}
