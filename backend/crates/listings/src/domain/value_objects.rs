//! Domain Value Objects
//!
//! Validated directory and listing fields.

use http::Uri;
use kernel::error::app_error::{AppError, AppResult};

fn bounded(
    raw: &str,
    min: usize,
    max: usize,
    field: &'static str,
    code: &'static str,
    multiline: bool,
) -> AppResult<String> {
    let value = raw.trim();
    let len = value.chars().count();
    if len < min || len > max {
        return Err(
            AppError::bad_request(format!("{field} must be {min}-{max} characters")).with_code(code),
        );
    }

    let bad_char = |c: char| c.is_control() && !(multiline && matches!(c, '\n' | '\t' | '\r'));
    if value.chars().any(bad_char) {
        return Err(AppError::bad_request(format!("{field} contains invalid characters"))
            .with_code(code));
    }

    Ok(value.to_string())
}

macro_rules! text_value {
    ($name:ident, $min:expr, $max:expr, $field:literal, $code:literal, $multiline:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: &str) -> AppResult<Self> {
                bounded(raw, $min, $max, $field, $code, $multiline).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }
    };
}

text_value!(BuilderName, 2, 120, "Builder name", "INVALID_BUILDER_NAME", false);
text_value!(ProjectName, 2, 120, "Project name", "INVALID_PROJECT_NAME", false);
text_value!(ListingTitle, 5, 150, "Title", "INVALID_LISTING_TITLE", false);
text_value!(Description, 0, 5_000, "Description", "INVALID_DESCRIPTION", true);
text_value!(AgentName, 2, 80, "Display name", "INVALID_AGENT_NAME", false);
text_value!(ContactName, 1, 80, "Name", "INVALID_CONTACT_NAME", false);
text_value!(EnquiryMessage, 1, 2_000, "Message", "INVALID_ENQUIRY_MESSAGE", true);

impl BuilderName {
    pub fn slug(&self) -> String {
        slug::slugify(&self.0)
    }
}

impl ProjectName {
    pub fn slug(&self) -> String {
        slug::slugify(&self.0)
    }
}

/// City or locality, whitespace collapsed. Filters compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place(String);

impl Place {
    pub fn new(raw: &str, field: &'static str) -> AppResult<Self> {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        bounded(&collapsed, 2, 80, field, "INVALID_LOCATION", false).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

const URL_MAX_LEN: usize = 2048;

/// Absolute http(s) URL with a host
pub fn website(raw: &str) -> AppResult<String> {
    let raw = raw.trim();
    let invalid =
        || AppError::bad_request("website must be an absolute http(s) URL").with_code("INVALID_URL");

    if raw.is_empty() || raw.len() > URL_MAX_LEN {
        return Err(invalid());
    }
    let uri: Uri = raw.parse().map_err(|_| invalid())?;
    match (uri.scheme_str(), uri.host()) {
        (Some("http" | "https"), Some(host)) if !host.is_empty() => Ok(raw.to_string()),
        _ => Err(invalid()),
    }
}

/// Contact phone: optional leading `+`, 7 to 15 digits; spaces and dashes dropped
pub fn contact_phone(raw: &str) -> AppResult<String> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);

    if (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(compact)
    } else {
        Err(AppError::bad_request("Invalid phone number").with_code("INVALID_PHONE"))
    }
}

/// Contact email, lowercased. Only the shape is checked.
pub fn contact_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    let invalid = || AppError::bad_request("Invalid email address").with_code("INVALID_EMAIL");

    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@') =>
        {
            Ok(email)
        }
        _ => Err(invalid()),
    }
}

/// Empty input means "not given"
pub fn optional<T>(raw: Option<&str>, parse: impl FnOnce(&str) -> AppResult<T>) -> AppResult<Option<T>> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => parse(value).map(Some),
        _ => Ok(None),
    }
}

/// Strictly positive amount or area
pub fn positive(value: i64, field: &'static str, code: &'static str) -> AppResult<i64> {
    if value > 0 {
        Ok(value)
    } else {
        Err(AppError::bad_request(format!("{field} must be greater than zero")).with_code(code))
    }
}

/// Room counts: 0 to 50
pub fn room_count(value: Option<i16>, field: &'static str) -> AppResult<Option<i16>> {
    match value {
        Some(n) if !(0..=50).contains(&n) => Err(AppError::bad_request(format!(
            "{field} must be between 0 and 50"
        ))
        .with_code("INVALID_ROOM_COUNT")),
        other => Ok(other),
    }
}

/// Inclusive project price band, both ends optional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PriceRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl PriceRange {
    pub fn new(min: Option<i64>, max: Option<i64>) -> AppResult<Self> {
        let min = min.map(|v| positive(v, "priceMin", "INVALID_PRICE")).transpose()?;
        let max = max.map(|v| positive(v, "priceMax", "INVALID_PRICE")).transpose()?;
        if matches!((min, max), (Some(lo), Some(hi)) if lo > hi) {
            return Err(AppError::bad_request("priceMin must not exceed priceMax")
                .with_code("INVALID_PRICE_RANGE"));
        }
        Ok(Self { min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_slugs() {
        let name = BuilderName::new("  Godrej Properties ").unwrap();
        assert_eq!(name.as_str(), "Godrej Properties");
        assert_eq!(name.slug(), "godrej-properties");
        assert!(BuilderName::new("X").is_err());

        let project = ProjectName::new("Skyline @ Baner").unwrap();
        assert_eq!(project.slug(), "skyline-baner");

        assert!(Description::new("").is_ok());
        assert!(ListingTitle::new("2BHK").is_err());
    }

    #[test]
    fn test_place_collapses_whitespace() {
        let place = Place::new("  Navi   Mumbai ", "city").unwrap();
        assert_eq!(place.as_str(), "Navi Mumbai");
        let err = Place::new("x", "city").unwrap_err();
        assert_eq!(err.code(), Some("INVALID_LOCATION"));
    }

    #[test]
    fn test_contact_fields() {
        assert_eq!(contact_phone("+91 98765-43210").unwrap(), "+919876543210");
        assert!(contact_phone("12345").is_err());
        assert!(contact_phone("98765abc10").is_err());

        assert_eq!(contact_email(" Sales@Acme.IN ").unwrap(), "sales@acme.in");
        assert!(contact_email("sales@acme").is_err());
        assert!(contact_email("@acme.in").is_err());

        assert_eq!(optional(Some("  "), contact_email).unwrap(), None);
        assert!(optional(Some("nope"), contact_email).is_err());
    }

    #[test]
    fn test_website() {
        assert!(website("https://acme.example/about").is_ok());
        assert!(website("ftp://acme.example").is_err());
        assert!(website("acme.example").is_err());
    }

    #[test]
    fn test_price_range() {
        assert!(PriceRange::new(Some(5_000_000), Some(9_000_000)).is_ok());
        assert!(PriceRange::new(Some(5_000_000), None).is_ok());
        let err = PriceRange::new(Some(9), Some(5)).unwrap_err();
        assert_eq!(err.code(), Some("INVALID_PRICE_RANGE"));
        assert!(PriceRange::new(Some(0), None).is_err());
    }

    #[test]
    fn test_room_count() {
        assert_eq!(room_count(Some(3), "bedrooms").unwrap(), Some(3));
        assert!(room_count(Some(-1), "bedrooms").is_err());
        assert_eq!(room_count(None, "bedrooms").unwrap(), None);
    }
}
