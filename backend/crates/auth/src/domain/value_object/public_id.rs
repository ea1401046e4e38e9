//! PublicId Value Object
//!
//! Users are addressed by a 21-character nanoid in URLs and responses so
//! the internal UUID never leaves the server.
//!
//! ```rust
//! use auth::domain::value_object::public_id::PublicId;
//!
//! let public_id = PublicId::new();
//! assert_eq!(public_id.as_str().len(), 21);
//! ```
use std::str::FromStr;

use kernel::error::app_error::{AppError, AppResult};
use nid::Nanoid;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicId(Nanoid);

impl PublicId {
    #[inline]
    pub fn new() -> Self {
        Self(Nanoid::new())
    }

    pub fn parse_str(s: &str) -> AppResult<Self> {
        Nanoid::from_str(s).map(PublicId).map_err(|e| {
            AppError::bad_request(format!("Invalid user id: {e}")).with_code("INVALID_ID")
        })
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for PublicId {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        PublicId::parse_str(s)
    }
}

impl Default for PublicId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PublicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_ids_are_unique() {
        assert_ne!(PublicId::new(), PublicId::new());
    }

    #[test]
    fn test_parse() {
        let id: PublicId = "V1StGXR8_Z5jdHi6B-myT".parse().unwrap();
        assert_eq!(id.to_string(), "V1StGXR8_Z5jdHi6B-myT");
        assert!(PublicId::parse_str("short").is_err());
        assert!(PublicId::parse_str("invalid_id!@#$%^&*()_").is_err());
    }
}
