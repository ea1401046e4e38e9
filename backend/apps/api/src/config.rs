//! Server Configuration
//!
//! Read once at startup from the process environment (after `.env` is
//! loaded). Optional values fall back to defaults; malformed values abort
//! startup.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use ads::AdsConfig;
use anyhow::{Context, bail};
use auth::AuthConfig;
use base64::Engine;
use base64::engine::general_purpose;
use forum::ForumConfig;
use listings::ListingsConfig;
use platform::client::TrustedProxies;
use platform::rate_limit::RateLimitConfig;

const DEFAULT_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub frontend_origins: Vec<String>,
    /// Required in release builds; debug builds generate one per process
    pub session_secret: Option<[u8; 32]>,
    pub password_pepper: Option<Vec<u8>>,
    pub sms_enabled: bool,
    pub check_breached_passwords: bool,
    /// Global per-IP budget
    pub rate_limit: RateLimitConfig,
    /// Proxies appending to `X-Forwarded-For`; 0 keys callers by socket peer
    pub trusted_proxies: TrustedProxies,
    pub ad_sweep_interval: Duration,
    /// Debug builds relax cookies and rate limits
    pub development: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), cfg!(debug_assertions))
    }

    /// Build from any key/value source
    pub fn from_lookup<F>(lookup: F, development: bool) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let session_secret = match var("SESSION_SECRET") {
            Some(raw) => Some(decode_secret(&raw)?),
            None if development => {
                tracing::info!("SESSION_SECRET not set, using a random per-process secret");
                None
            }
            None => bail!("SESSION_SECRET must be set in release builds"),
        };

        let origins = var("FRONTEND_ORIGINS").unwrap_or_else(|| DEFAULT_ORIGINS.to_string());
        let frontend_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        let max_requests = parse_or(&var, "RATE_LIMIT_MAX_REQUESTS", 120u32)?;
        let window_secs = parse_or(&var, "RATE_LIMIT_WINDOW_SECS", 60u64)?;
        if max_requests == 0 || window_secs == 0 {
            bail!("RATE_LIMIT_MAX_REQUESTS and RATE_LIMIT_WINDOW_SECS must be positive");
        }

        let sweep_secs = parse_or(&var, "AD_SWEEP_INTERVAL_SECS", 300u64)?;
        if sweep_secs == 0 {
            bail!("AD_SWEEP_INTERVAL_SECS must be positive");
        }

        Ok(Self {
            database_url,
            bind_addr: parse_or(&var, "BIND_ADDR", default_bind_addr())?,
            db_max_connections: parse_or(&var, "DB_MAX_CONNECTIONS", 5u32)?,
            frontend_origins,
            session_secret,
            password_pepper: var("PASSWORD_PEPPER").map(String::into_bytes),
            sms_enabled: parse_or(&var, "SMS_ENABLED", false)?,
            check_breached_passwords: parse_or(&var, "CHECK_BREACHED_PASSWORDS", false)?,
            rate_limit: RateLimitConfig::new(max_requests, window_secs),
            trusted_proxies: TrustedProxies(parse_or(&var, "TRUSTED_PROXY_HOPS", 0usize)?),
            ad_sweep_interval: Duration::from_secs(sweep_secs),
            development,
        })
    }

    pub fn auth_config(&self) -> AuthConfig {
        let base = if self.development {
            AuthConfig::development()
        } else {
            AuthConfig::default()
        };
        AuthConfig {
            session_secret: self.session_secret.unwrap_or(base.session_secret),
            password_pepper: self.password_pepper.clone(),
            sms_enabled: self.sms_enabled,
            check_breached_passwords: self.check_breached_passwords,
            ..base
        }
    }

    pub fn listings_config(&self) -> ListingsConfig {
        if self.development {
            ListingsConfig::development()
        } else {
            ListingsConfig::default()
        }
    }

    pub fn forum_config(&self) -> ForumConfig {
        if self.development {
            ForumConfig::development()
        } else {
            ForumConfig::default()
        }
    }

    pub fn ads_config(&self) -> AdsConfig {
        if self.development {
            AdsConfig::development()
        } else {
            AdsConfig::default()
        }
    }

    /// Widest window any limiter key can use; older hits are safe to drop
    pub fn limiter_retention(&self) -> Duration {
        let listings = self.listings_config().enquiry_rate_limit.window;
        let otp = self.auth_config().otp_rate_limit.window;
        self.rate_limit.window.max(listings).max(otp)
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 31113))
}

fn parse_or<T, V>(var: &V, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} has an invalid value {raw:?}: {e}")),
        None => {
            tracing::info!(key, default = ?default, "Using default");
            Ok(default)
        }
    }
}

fn decode_secret(raw: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = general_purpose::STANDARD
        .decode(raw)
        .context("SESSION_SECRET must be base64")?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes, got {}", b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")]), true).unwrap();
        assert_eq!(config.bind_addr.to_string(), "0.0.0.0:31113");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.frontend_origins.len(), 2);
        assert_eq!(config.rate_limit.max_requests, 120);
        assert_eq!(config.rate_limit.window, Duration::from_secs(60));
        assert_eq!(config.ad_sweep_interval, Duration::from_secs(300));
        assert!(config.session_secret.is_none());
        assert!(!config.sms_enabled);
        assert_eq!(config.trusted_proxies, TrustedProxies(0));
    }

    #[test]
    fn test_overrides() {
        let secret = general_purpose::STANDARD.encode([7u8; 32]);
        let config = AppConfig::from_lookup(
            lookup(&[
                ("DATABASE_URL", "postgres://db"),
                ("BIND_ADDR", "127.0.0.1:8080"),
                ("FRONTEND_ORIGINS", "https://estate.example, "),
                ("SESSION_SECRET", &secret),
                ("SMS_ENABLED", "true"),
                ("RATE_LIMIT_MAX_REQUESTS", "10"),
                ("AD_SWEEP_INTERVAL_SECS", "30"),
                ("TRUSTED_PROXY_HOPS", "1"),
            ]),
            false,
        )
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.frontend_origins, ["https://estate.example"]);
        assert_eq!(config.session_secret, Some([7u8; 32]));
        assert_eq!(config.rate_limit.max_requests, 10);
        assert_eq!(config.ad_sweep_interval, Duration::from_secs(30));
        assert_eq!(config.trusted_proxies, TrustedProxies(1));

        let auth = config.auth_config();
        assert_eq!(auth.session_secret, [7u8; 32]);
        assert!(auth.sms_enabled);
        assert!(auth.cookie_secure);
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(AppConfig::from_lookup(lookup(&[]), true).is_err());
        assert!(
            AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")]), false).is_err(),
            "release builds need a session secret"
        );
        assert!(
            AppConfig::from_lookup(
                lookup(&[("DATABASE_URL", "postgres://db"), ("SESSION_SECRET", "c2hvcnQ=")]),
                true
            )
            .is_err()
        );
        assert!(
            AppConfig::from_lookup(
                lookup(&[("DATABASE_URL", "postgres://db"), ("DB_MAX_CONNECTIONS", "many")]),
                true
            )
            .is_err()
        );
        assert!(
            AppConfig::from_lookup(
                lookup(&[("DATABASE_URL", "postgres://db"), ("RATE_LIMIT_WINDOW_SECS", "0")]),
                true
            )
            .is_err()
        );
    }

    #[test]
    fn test_limiter_retention_covers_every_window() {
        let config = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db")]), true).unwrap();
        assert_eq!(config.limiter_retention(), Duration::from_secs(3600));
    }
}
