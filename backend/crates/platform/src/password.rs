//! Password Hashing and Verification
//!
//! NIST SP 800-63B style password handling:
//! - Argon2id hashing (memory-hard, OWASP default parameters)
//! - Zeroization of clear text on drop
//! - Optional pepper appended before hashing
//! - Optional HIBP (Have I Been Pwned) k-anonymity breach check

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use sha1::{Digest, Sha1};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// HIBP range API (k-Anonymity model)
const HIBP_API_URL: &str = "https://api.pwnedpasswords.com/range/";

/// Passwords rejected outright. Includes marketplace-flavoured guesses.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "abcdefgh",
    "letmein1",
    "welcome1",
    "welcome123",
    "admin123",
    "iloveyou",
    "sunshine",
    "football",
    "trustno1",
    "realestate",
    "property1",
    "property123",
    "myhome123",
    "newhome1",
    "dreamhome",
];

const KEYBOARD_PATTERNS: &[&str] = &["qwerty", "asdfgh", "zxcvbn", "qazwsx", "1qaz2wsx"];

/// Password policy violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("This password has been compromised in a data breach")]
    Compromised,

    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    #[error("Password contains invalid control characters")]
    InvalidCharacter,

    #[error("Password is too common or follows a predictable pattern")]
    CommonPattern,
}

/// Hashing / verification failures
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,

    /// Non-fatal: callers log and continue
    #[error("Breach check failed: {0}")]
    BreachCheckFailed(String),
}

/// Clear text password, zeroized when dropped
///
/// Not `Clone` on purpose; `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Validate and NFKC-normalize user input
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let raw = Zeroizing::new(raw);
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // Length counts code points, not bytes
        let char_count = normalized.chars().count();
        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        if is_common_pattern(&normalized) {
            return Err(PasswordPolicyError::CommonPattern);
        }

        Ok(Self(normalized))
    }

    /// Skip policy checks (tests only)
    #[cfg(test)]
    pub fn new_unchecked(raw: String) -> Self {
        Self(raw)
    }

    fn peppered(&self, pepper: Option<&[u8]>) -> Zeroizing<Vec<u8>> {
        let mut bytes = self.0.as_bytes().to_vec();
        if let Some(p) = pepper {
            bytes.extend_from_slice(p);
        }
        Zeroizing::new(bytes)
    }

    /// Hash with Argon2id and a fresh 128-bit salt
    pub fn hash(&self, pepper: Option<&[u8]>) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(&self.peppered(pepper), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }

    /// Query HIBP with the first 5 hex chars of the SHA-1 digest
    ///
    /// `Ok(true)` means the password appears in a known breach.
    pub async fn check_breach(&self) -> Result<bool, PasswordHashError> {
        let digest = Sha1::digest(self.0.as_bytes());
        let hash_hex = hex_encode_upper(&digest);
        let (prefix, suffix) = hash_hex.split_at(5);

        let response = reqwest::get(format!("{HIBP_API_URL}{prefix}"))
            .await
            .map_err(|e| PasswordHashError::BreachCheckFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PasswordHashError::BreachCheckFailed(format!(
                "API returned status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PasswordHashError::BreachCheckFailed(e.to_string()))?;

        // Body lines look like `SUFFIX:COUNT`
        Ok(body.lines().any(|line| {
            line.split_once(':')
                .is_some_and(|(candidate, _)| candidate.eq_ignore_ascii_case(suffix))
        }))
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

/// Argon2id hash in PHC string format, safe to store
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Parse a stored PHC string
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }

    /// Verify (Argon2 compares in constant time)
    pub fn verify(&self, password: &ClearTextPassword, pepper: Option<&[u8]>) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(&password.peppered(pepper), &parsed)
            .is_ok()
    }

    /// True when the stored hash is not Argon2id
    pub fn needs_rehash(&self) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => parsed.algorithm != argon2::Algorithm::Argon2id.ident(),
            Err(_) => true,
        }
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

fn is_common_pattern(password: &str) -> bool {
    let lower = password.to_lowercase();
    let mut chars = lower.chars();

    if let Some(first) = chars.next() {
        if chars.all(|c| c == first) {
            return true;
        }
    }

    is_sequential_digits(&lower)
        || KEYBOARD_PATTERNS.iter().any(|p| lower.contains(p))
        || COMMON_PASSWORDS.contains(&lower.as_str())
}

/// "12345678", "98765432", "7890123" and friends
fn is_sequential_digits(s: &str) -> bool {
    if !s.chars().all(|c| c.is_ascii_digit()) || s.len() < 4 {
        return false;
    }
    let digits: Vec<u32> = s.chars().filter_map(|c| c.to_digit(10)).collect();
    let ascending = digits.windows(2).all(|w| w[1] == (w[0] + 1) % 10);
    let descending = digits.windows(2).all(|w| w[0] == (w[1] + 1) % 10);
    ascending || descending
}

fn hex_encode_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_limits() {
        assert!(matches!(
            ClearTextPassword::new("short".to_string()),
            Err(PasswordPolicyError::TooShort { min: 8, actual: 5 })
        ));
        assert!(matches!(
            ClearTextPassword::new("Ab3$".repeat(40)),
            Err(PasswordPolicyError::TooLong { .. })
        ));
    }

    #[test]
    fn test_whitespace_only() {
        assert!(matches!(
            ClearTextPassword::new("          ".to_string()),
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
    }

    #[test]
    fn test_control_character() {
        assert!(matches!(
            ClearTextPassword::new("Balcony\u{0007}View42".to_string()),
            Err(PasswordPolicyError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_common_patterns() {
        for weak in ["password123", "RealEstate", "qwerty2024!", "12345678", "98765432", "zzzzzzzz"] {
            assert!(
                matches!(
                    ClearTextPassword::new(weak.to_string()),
                    Err(PasswordPolicyError::CommonPattern)
                ),
                "{weak} should be rejected"
            );
        }
    }

    #[test]
    fn test_valid_passwords() {
        assert!(ClearTextPassword::new("Sea-facing 3BHK, Bandra!".to_string()).is_ok());
        assert!(ClearTextPassword::new("パスワード安全です!".to_string()).is_ok());
    }

    #[test]
    fn test_hash_and_verify_with_pepper() {
        let password = ClearTextPassword::new_unchecked("Verandah#Garden9".to_string());
        let pepper = b"pepper";
        let hashed = password.hash(Some(pepper)).unwrap();

        assert!(hashed.verify(&password, Some(pepper)));
        assert!(!hashed.verify(&password, None));

        let wrong = ClearTextPassword::new_unchecked("Verandah#Garden8".to_string());
        assert!(!hashed.verify(&wrong, Some(pepper)));
        assert!(!hashed.needs_rehash());
    }

    #[test]
    fn test_phc_string_restore() {
        let password = ClearTextPassword::new_unchecked("Courtyard-77-Pune".to_string());
        let stored = password.hash(None).unwrap().as_phc_string().to_string();
        let restored = HashedPassword::from_phc_string(stored).unwrap();
        assert!(restored.verify(&password, None));
        assert!(HashedPassword::from_phc_string("plain").is_err());
    }

    #[test]
    fn test_debug_redaction() {
        let password = ClearTextPassword::new_unchecked("secret-value".to_string());
        assert!(!format!("{:?}", password).contains("secret"));
    }

    #[test]
    fn test_hex_encode_upper() {
        assert_eq!(hex_encode_upper(&[0xab, 0x01]), "AB01");
    }
}
