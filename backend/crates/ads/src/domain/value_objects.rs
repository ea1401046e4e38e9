//! Domain Value Objects
//!
//! Validated booking inputs.

use chrono::{Duration, NaiveDate};
use http::Uri;
use kernel::error::app_error::{AppError, AppResult};

const TITLE_MIN_CHARS: usize = 3;
const TITLE_MAX_CHARS: usize = 80;
const URL_MAX_LEN: usize = 2048;

/// Creative content of an advertisement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdCopy {
    pub title: String,
    pub image_url: String,
    pub target_url: String,
}

impl AdCopy {
    pub fn new(title: &str, image_url: &str, target_url: &str) -> AppResult<Self> {
        let title = title.trim();
        let len = title.chars().count();
        if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
            return Err(AppError::bad_request(format!(
                "Title must be {TITLE_MIN_CHARS}-{TITLE_MAX_CHARS} characters"
            ))
            .with_code("INVALID_AD_TITLE"));
        }
        if title.chars().any(char::is_control) {
            return Err(AppError::bad_request("Title contains control characters")
                .with_code("INVALID_AD_TITLE"));
        }

        Ok(Self {
            title: title.to_string(),
            image_url: web_url(image_url, "imageUrl")?,
            target_url: web_url(target_url, "targetUrl")?,
        })
    }
}

/// Absolute http(s) URL with a host
fn web_url(raw: &str, field: &'static str) -> AppResult<String> {
    let raw = raw.trim();
    let invalid = || {
        AppError::bad_request(format!("{field} must be an absolute http(s) URL"))
            .with_code("INVALID_AD_URL")
    };

    if raw.is_empty() || raw.len() > URL_MAX_LEN {
        return Err(invalid());
    }
    let uri: Uri = raw.parse().map_err(|_| invalid())?;
    match (uri.scheme_str(), uri.host()) {
        (Some("http" | "https"), Some(host)) if !host.is_empty() => Ok(raw.to_string()),
        _ => Err(invalid()),
    }
}

/// Inclusive run of whole days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    start: NaiveDate,
    days: u32,
}

impl BookingWindow {
    pub fn new(start: NaiveDate, days: u32) -> AppResult<Self> {
        if days == 0 {
            return Err(AppError::bad_request("Booking must cover at least one day")
                .with_code("INVALID_AD_DURATION"));
        }
        Ok(Self { start, days })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day the ad runs
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(self.days as i64 - 1)
    }

    pub fn days(&self) -> u32 {
        self.days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ad_copy_validation() {
        let ok = AdCopy::new("  Lakeside Villas ", "https://cdn.example.com/v.jpg", "http://example.com/x")
            .unwrap();
        assert_eq!(ok.title, "Lakeside Villas");

        assert!(AdCopy::new("ab", "https://a.com/i.png", "https://a.com").is_err());
        assert!(AdCopy::new("Valid title", "ftp://a.com/i.png", "https://a.com").is_err());
        assert!(AdCopy::new("Valid title", "https://a.com/i.png", "/relative").is_err());
        assert!(AdCopy::new("Valid title", "https://a.com/i.png", "javascript:alert(1)").is_err());

        let err = AdCopy::new("Valid title", "", "https://a.com").unwrap_err();
        assert_eq!(err.code(), Some("INVALID_AD_URL"));
    }

    #[test]
    fn test_booking_window_end_is_inclusive() {
        let start: NaiveDate = "2026-12-30".parse().unwrap();
        let one = BookingWindow::new(start, 1).unwrap();
        assert_eq!(one.end(), start);

        let seven = BookingWindow::new(start, 7).unwrap();
        assert_eq!(seven.end(), "2027-01-05".parse::<NaiveDate>().unwrap());

        assert!(BookingWindow::new(start, 0).is_err());
    }
}
