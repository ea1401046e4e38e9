//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

pub use platform::cookie::SameSite;
use platform::cookie::CookieConfig;
use platform::rate_limit::RateLimitConfig;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_cookie_name: String,
    /// HMAC key for session tokens and OTP digests (32 bytes)
    pub session_secret: [u8; 32],
    /// Session TTL without "Remember Me" (12 hours)
    pub session_ttl_short: Duration,
    /// Session TTL with "Remember Me" (1 week)
    pub session_ttl_long: Duration,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    /// Application-wide secret appended before hashing
    pub password_pepper: Option<Vec<u8>>,
    /// Ask HIBP at sign-up / password reset
    pub check_breached_passwords: bool,
    /// Digits prefixed to 10-digit national phone numbers
    pub default_country_code: String,
    /// SMS delivery available (otherwise SMS sends fail and email is used)
    pub sms_enabled: bool,
    pub otp_ttl: Duration,
    pub otp_max_attempts: u16,
    pub otp_resend_cooldown: Duration,
    /// Issuance budget per identifier
    pub otp_rate_limit: RateLimitConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "estate_session".to_string(),
            session_secret: [0u8; 32],
            session_ttl_short: Duration::from_secs(12 * 3600),
            session_ttl_long: Duration::from_secs(7 * 24 * 3600),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            check_breached_passwords: false,
            default_country_code: "91".to_string(),
            sms_enabled: false,
            otp_ttl: Duration::from_secs(10 * 60),
            otp_max_attempts: 5,
            otp_resend_cooldown: Duration::from_secs(60),
            otp_rate_limit: RateLimitConfig::new(5, 15 * 60),
        }
    }
}

impl AuthConfig {
    /// Create config with a random session secret
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = [0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    pub fn session_ttl(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.session_ttl_long
        } else {
            self.session_ttl_short
        }
    }

    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
        }
    }
}
