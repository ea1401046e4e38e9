//! User Password Value Objects
//!
//! Thin domain wrappers over `platform::password`: policy violations turn
//! into 400 responses with a hint, hashing failures into 500s.

use kernel::error::app_error::{AppError, AppResult};
use platform::password::{ClearTextPassword, HashedPassword, PasswordPolicyError};
use std::fmt;

/// Password as typed by the user, zeroized on drop
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    pub fn new(raw: String) -> AppResult<Self> {
        ClearTextPassword::new(raw).map(Self).map_err(policy_error)
    }

    /// HIBP lookup. Callers treat `Err` as "unknown" and carry on.
    pub async fn is_compromised(&self) -> AppResult<bool> {
        self.0
            .check_breach()
            .await
            .map_err(|e| AppError::service_unavailable(e.to_string()))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

fn policy_error(err: PasswordPolicyError) -> AppError {
    let action = match err {
        PasswordPolicyError::TooShort { .. } => "Please choose a longer password",
        PasswordPolicyError::TooLong { .. } => "Please choose a shorter password",
        PasswordPolicyError::Compromised => "Please choose a password that has not been leaked",
        PasswordPolicyError::EmptyOrWhitespace => "Please enter a password",
        PasswordPolicyError::InvalidCharacter => "Please remove control characters",
        PasswordPolicyError::CommonPattern => "Please choose a less predictable password",
    };
    AppError::bad_request(err.to_string())
        .with_code("WEAK_PASSWORD")
        .with_action(action)
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

/// Stored Argon2id hash
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_raw(raw: &RawPassword, pepper: Option<&[u8]>) -> AppResult<Self> {
        raw.inner()
            .hash(pepper)
            .map(Self)
            .map_err(|e| AppError::internal("Password hashing failed").with_source(e))
    }

    pub fn from_phc_string(phc_string: impl Into<String>) -> AppResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|e| AppError::internal("Invalid password hash in database").with_source(e))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub fn verify(&self, raw: &RawPassword, pepper: Option<&[u8]>) -> bool {
        self.0.verify(raw.inner(), pepper)
    }

    pub fn needs_rehash(&self) -> bool {
        self.0.needs_rehash()
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword").field("hash", &"[HASH]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_errors_carry_code() {
        let err = RawPassword::new("short".to_string()).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.code(), Some("WEAK_PASSWORD"));
        assert!(err.action().is_some());

        assert!(RawPassword::new("password123".to_string()).is_err());
    }

    #[test]
    fn test_hash_verify_and_restore() {
        let raw = RawPassword::new("Lakeview Towers 12B".to_string()).unwrap();
        let hashed = UserPassword::from_raw(&raw, Some(b"pepper")).unwrap();
        assert!(hashed.verify(&raw, Some(b"pepper")));

        let restored = UserPassword::from_phc_string(hashed.as_phc_string()).unwrap();
        assert!(restored.verify(&raw, Some(b"pepper")));
        assert!(!restored.verify(&raw, None));
    }

    #[test]
    fn test_invalid_stored_hash() {
        assert_eq!(
            UserPassword::from_phc_string("not-a-hash").unwrap_err().status_code(),
            500
        );
    }
}
