//! Phone Number Value Object
//!
//! 電話番号は SMS による OTP 送信先、およびサインイン識別子として使う。
//!
//! ## 正規化
//! - 空白・ハイフン・括弧・ドットを除去
//! - 先頭の `+` は任意
//! - `+` なしの 10 桁（国内番号）には設定された国番号を付与
//! - 保存形式は常に `+<digits>`
//!
//! ## 不変条件
//! - 数字のみ、10〜15 桁（E.164 の上限）

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const PHONE_MIN_DIGITS: usize = 10;
pub const PHONE_MAX_DIGITS: usize = 15;

const NATIONAL_NUMBER_DIGITS: usize = 10;
const SEPARATORS: &[char] = &[' ', '-', '(', ')', '.'];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// `default_country_code` is digits only, e.g. `"91"`
    pub fn new(raw: &str, default_country_code: &str) -> AppResult<Self> {
        let cleaned: String = raw.trim().chars().filter(|c| !SEPARATORS.contains(c)).collect();

        let (international, digits) = match cleaned.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, cleaned.as_str()),
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("Phone number may only contain digits"));
        }

        let len = digits.len();
        if !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&len) {
            return Err(invalid(format!(
                "Phone number must have {PHONE_MIN_DIGITS}-{PHONE_MAX_DIGITS} digits (got {len})"
            )));
        }

        let full = if !international && len == NATIONAL_NUMBER_DIGITS {
            format!("{default_country_code}{digits}")
        } else {
            digits.to_string()
        };

        if full.len() > PHONE_MAX_DIGITS {
            return Err(invalid("Phone number is too long once the country code is added"));
        }

        Ok(Self(format!("+{full}")))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last four digits only, for logs
    pub fn masked(&self) -> String {
        let tail: String = self
            .0
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("+***{tail}")
    }
}

fn invalid(message: impl Into<std::borrow::Cow<'static, str>>) -> AppError {
    AppError::bad_request(message).with_code("INVALID_PHONE")
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_national_number_gets_country_code() {
        let phone = PhoneNumber::new("98765 43210", "91").unwrap();
        assert_eq!(phone.as_str(), "+919876543210");
    }

    #[test]
    fn test_international_number_kept() {
        let phone = PhoneNumber::new("+1 (415) 555-0132", "91").unwrap();
        assert_eq!(phone.as_str(), "+14155550132");

        let phone = PhoneNumber::new("+91-98765-43210", "91").unwrap();
        assert_eq!(phone.as_str(), "+919876543210");
    }

    #[test]
    fn test_plain_international_digits() {
        // 12 digits without '+': already carries a country code
        let phone = PhoneNumber::new("919876543210", "91").unwrap();
        assert_eq!(phone.as_str(), "+919876543210");
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(PhoneNumber::new("", "91").is_err());
        assert!(PhoneNumber::new("12345", "91").is_err());
        assert!(PhoneNumber::new("+1234567890123456", "91").is_err());
        assert!(PhoneNumber::new("98765x3210", "91").is_err());
        assert!(PhoneNumber::new("++919876543210", "91").is_err());
    }

    #[test]
    fn test_masked() {
        let phone = PhoneNumber::new("9876543210", "91").unwrap();
        assert_eq!(phone.masked(), "+***3210");
    }
}
