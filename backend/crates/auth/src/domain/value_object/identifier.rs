//! Sign-in identifier: an email address or a phone number

use kernel::error::app_error::AppResult;
use std::fmt;

use super::{email::Email, phone_number::PhoneNumber};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Email(Email),
    Phone(PhoneNumber),
}

impl Identifier {
    /// Anything containing `@` is treated as an email
    pub fn parse(raw: &str, default_country_code: &str) -> AppResult<Self> {
        if raw.contains('@') {
            Email::new(raw).map(Identifier::Email)
        } else {
            PhoneNumber::new(raw, default_country_code).map(Identifier::Phone)
        }
    }

    /// Canonical form, used as a rate-limit key
    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Email(email) => email.as_str(),
            Identifier::Phone(phone) => phone.as_str(),
        }
    }

    pub fn masked(&self) -> String {
        match self {
            Identifier::Email(email) => email.masked(),
            Identifier::Phone(phone) => phone.masked(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert!(matches!(
            Identifier::parse("Buyer@Example.com", "91").unwrap(),
            Identifier::Email(_)
        ));
        let phone = Identifier::parse("98765-43210", "91").unwrap();
        assert_eq!(phone.as_str(), "+919876543210");
        assert!(Identifier::parse("not-an-identifier", "91").is_err());
    }
}
