//! Auth Session Entity
//!
//! Server-side session referenced by the signed cookie token.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::{public_id::PublicId, user_id::UserId};

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: Uuid,
    pub user_id: UserId,
    pub public_id: PublicId,
    /// Unix timestamp (ms)
    pub expires_at_ms: i64,
    pub remember_me: bool,
    /// SHA-256 of the User-Agent the session was created with
    pub client_fingerprint_hash: Vec<u8>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl AuthSession {
    /// TTL comes from `AuthConfig`
    pub fn new(
        user_id: UserId,
        public_id: PublicId,
        remember_me: bool,
        fingerprint_hash: Vec<u8>,
        client_ip: Option<String>,
        user_agent: Option<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            session_id: Uuid::new_v4(),
            user_id,
            public_id,
            expires_at_ms: (now + ttl).timestamp_millis(),
            remember_me,
            client_fingerprint_hash: fingerprint_hash,
            client_ip,
            user_agent,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }

    pub fn remaining_ms(&self) -> i64 {
        (self.expires_at_ms - Utc::now().timestamp_millis()).max(0)
    }

    /// Sliding extension for remember-me sessions: once less than half of
    /// `ttl_long` remains, push expiry back to `now + ttl_long`.
    /// Returns whether the expiry moved.
    pub fn extend_if_needed(&mut self, ttl_long: Duration) -> bool {
        if !self.remember_me {
            return false;
        }

        let now = Utc::now();
        if self.expires_at_ms < (now + ttl_long / 2).timestamp_millis() {
            self.expires_at_ms = (now + ttl_long).timestamp_millis();
            return true;
        }
        false
    }
}
