//! Display Name Value Object
//!
//! 表示名はフォーラム投稿や問い合わせ一覧に表示される名前。
//! ログイン識別子ではないため一意性は要求しない。
//!
//! ## 処理順
//! NFKC 正規化 → 前後空白除去 → 連続空白の圧縮 → 検証
//!
//! ## 不変条件
//! - 長さ: 2〜60 文字（正規化後、コードポイント単位）
//! - 制御文字を含まない

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

pub const DISPLAY_NAME_MIN_LENGTH: usize = 2;
pub const DISPLAY_NAME_MAX_LENGTH: usize = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(raw: impl AsRef<str>) -> AppResult<Self> {
        let normalized: String = raw.as_ref().nfkc().collect();

        if normalized.chars().any(char::is_control) {
            return Err(invalid("Display name contains control characters"));
        }

        let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
        let len = collapsed.chars().count();

        if len < DISPLAY_NAME_MIN_LENGTH {
            return Err(invalid(format!(
                "Display name must be at least {DISPLAY_NAME_MIN_LENGTH} characters"
            )));
        }
        if len > DISPLAY_NAME_MAX_LENGTH {
            return Err(invalid(format!(
                "Display name must be at most {DISPLAY_NAME_MAX_LENGTH} characters"
            )));
        }

        Ok(Self(collapsed))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn invalid(message: impl Into<std::borrow::Cow<'static, str>>) -> AppError {
    AppError::bad_request(message).with_code("INVALID_DISPLAY_NAME")
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
