//! Cookie Management Infrastructure
//!
//! `Set-Cookie` construction and lookup for the session cookie.

use axum::http::{HeaderMap, HeaderValue, header};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie attributes shared by issue and clear
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
        }
    }
}

impl CookieConfig {
    fn attributes(&self) -> String {
        let mut attrs = String::new();
        if self.http_only {
            attrs.push_str("; HttpOnly");
        }
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs.push_str("; SameSite=");
        attrs.push_str(self.same_site.as_str());
        attrs.push_str("; Path=");
        attrs.push_str(&self.path);
        attrs
    }

    /// `Set-Cookie` value carrying `value` for `max_age_secs`
    pub fn build_set_cookie(&self, value: &str, max_age_secs: u64) -> String {
        format!(
            "{}={}{}; Max-Age={}",
            self.name,
            value,
            self.attributes(),
            max_age_secs
        )
    }

    /// `Set-Cookie` value that expires the cookie immediately
    pub fn build_delete_cookie(&self) -> String {
        format!(
            "{}={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name,
            self.attributes()
        )
    }

    pub fn set_cookie_header(&self, value: &str, max_age_secs: u64) -> HeaderValue {
        HeaderValue::from_str(&self.build_set_cookie(value, max_age_secs))
            .unwrap_or_else(|_| HeaderValue::from_static(""))
    }

    pub fn delete_cookie_header(&self) -> HeaderValue {
        HeaderValue::from_str(&self.build_delete_cookie())
            .unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

/// Extract a cookie value from the `Cookie` header
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}
