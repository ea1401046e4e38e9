//! Domain Value Objects
//!
//! Length-checked user text. Bodies keep their line breaks; titles and
//! names are single-line.

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

    let bad_char = |c: char| c.is_control() && !(multiline && (c == '\n' || c == '\t' || c == '\r'));
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
            pub const MIN_CHARS: usize = $min;
            pub const MAX_CHARS: usize = $max;

            pub fn new(raw: &str) -> AppResult<Self> {
                bounded(raw, $min, $max, $field, $code, $multiline).map(Self)
            }

            /// Trust values already validated on write
            pub fn from_db(value: String) -> Self {
                Self(value)
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

text_value!(PostTitle, 5, 150, "Title", "INVALID_POST_TITLE", false);
text_value!(PostBody, 1, 10_000, "Body", "INVALID_POST_BODY", true);
text_value!(ReplyBody, 1, 5_000, "Reply", "INVALID_REPLY_BODY", true);
text_value!(CategoryName, 2, 60, "Category name", "INVALID_CATEGORY_NAME", false);

impl CategoryName {
    /// URL segment for the name
    pub fn slug(&self) -> String {
        slug::slugify(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_bounds() {
        assert!(PostTitle::new("  Hi  ").is_err());
        assert_eq!(
            PostTitle::new("  Best localities in Pune? ").unwrap().as_str(),
            "Best localities in Pune?"
        );
        assert!(PostTitle::new(&"a".repeat(151)).is_err());
        assert!(PostTitle::new("Two\nlines here").is_err());
    }

    #[test]
    fn test_body_keeps_newlines() {
        let body = PostBody::new("First line\nsecond line").unwrap();
        assert!(body.as_str().contains('\n'));
        assert!(PostBody::new("   ").is_err());
        assert!(ReplyBody::new("bell\u{7}").is_err());

        let err = ReplyBody::new(&"x".repeat(5_001)).unwrap_err();
        assert_eq!(err.code(), Some("INVALID_REPLY_BODY"));
    }

    #[test]
    fn test_category_slug() {
        let name = CategoryName::new("Navi Mumbai").unwrap();
        assert_eq!(name.slug(), "navi-mumbai");
        let name = CategoryName::new("Villas & Bungalows").unwrap();
        assert_eq!(name.slug(), "villas-bungalows");
    }
}
