//! Rate Limiting Infrastructure
//!
//! In-memory sliding-window limiter shared by the global middleware,
//! OTP issuance and enquiry submission.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::client::{client_ip, client_key};

/// Rate limit configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    /// When the oldest hit in the window leaves it
    pub reset_at_ms: i64,
    /// 0 when allowed
    pub retry_after_ms: i64,
}

impl RateLimitResult {
    /// `Retry-After` value in whole seconds, at least 1
    pub fn retry_after_secs(&self) -> u64 {
        ((self.retry_after_ms.max(0) as u64).div_ceil(1000)).max(1)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limit store unavailable: {0}")]
    Unavailable(String),
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count a hit for `key` if the window still has room
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

/// Sliding-window counter map: key → hit timestamps (ms, oldest first)
#[derive(Debug, Default)]
pub struct SlidingWindowLimiter {
    hits: Mutex<HashMap<String, VecDeque<i64>>>,
}

impl SlidingWindowLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check at an explicit instant. Denied requests are not recorded.
    pub fn check_at(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> Result<RateLimitResult, RateLimitError> {
        let window_ms = config.window_ms();
        let mut hits = self
            .hits
            .lock()
            .map_err(|e| RateLimitError::Unavailable(e.to_string()))?;
        let entry = hits.entry(key.to_string()).or_default();

        while entry.front().is_some_and(|&ts| ts <= now_ms - window_ms) {
            entry.pop_front();
        }

        let max = config.max_requests as usize;
        if entry.len() < max {
            entry.push_back(now_ms);
            let oldest = entry.front().copied().unwrap_or(now_ms);
            return Ok(RateLimitResult {
                allowed: true,
                remaining: (max - entry.len()) as u32,
                reset_at_ms: oldest + window_ms,
                retry_after_ms: 0,
            });
        }

        // max_requests == 0 leaves the deque empty
        let oldest = entry.front().copied().unwrap_or(now_ms);
        let reset_at_ms = oldest + window_ms;
        Ok(RateLimitResult {
            allowed: false,
            remaining: 0,
            reset_at_ms,
            retry_after_ms: (reset_at_ms - now_ms).max(0),
        })
    }

    /// Drop expired hits and forget keys with nothing left
    pub fn prune(&self, now_ms: i64, window: Duration) -> usize {
        let window_ms = window.as_millis() as i64;
        let Ok(mut hits) = self.hits.lock() else {
            return 0;
        };
        let before = hits.len();
        hits.retain(|_, deque| {
            while deque.front().is_some_and(|&ts| ts <= now_ms - window_ms) {
                deque.pop_front();
            }
            !deque.is_empty()
        });
        before - hits.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.hits.lock().map(|h| h.len()).unwrap_or(0)
    }
}

impl RateLimitStore for SlidingWindowLimiter {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        self.check_at(key, config, chrono::Utc::now().timestamp_millis())
    }
}

/// State for [`rate_limit_middleware`]
#[derive(Clone)]
pub struct RateLimitState {
    pub limiter: Arc<SlidingWindowLimiter>,
    pub config: RateLimitConfig,
}

impl RateLimitState {
    pub fn new(limiter: Arc<SlidingWindowLimiter>, config: RateLimitConfig) -> Self {
        Self { limiter, config }
    }
}

/// Global per-IP limit. Store failures let the request through.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let key = format!("global:{}", client_key(client_ip(request.extensions())));

    let result = match RateLimitStore::check_and_increment(&*state.limiter, &key, &state.config).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Rate limiter unavailable, allowing request");
            return next.run(request).await;
        }
    };

    if !result.allowed {
        tracing::warn!(key = %key, retry_after_ms = result.retry_after_ms, "Rate limit exceeded");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::CONTENT_TYPE, "application/problem+json")],
            r#"{"type":"about:blank","title":"Too Many Requests","status":429,"code":"RATE_LIMITED"}"#,
        )
            .into_response();
        let headers = response.headers_mut();
        headers.insert(header::RETRY_AFTER, HeaderValue::from(result.retry_after_secs()));
        headers.insert("x-ratelimit-limit", HeaderValue::from(state.config.max_requests));
        headers.insert("x-ratelimit-remaining", HeaderValue::from(0u32));
        return response;
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(state.config.max_requests));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(result.remaining));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, middleware, routing::get};
    use tower::ServiceExt;

    fn config(max: u32) -> RateLimitConfig {
        RateLimitConfig::new(max, 60)
    }

    #[test]
    fn test_allows_up_to_max_then_denies() {
        let limiter = SlidingWindowLimiter::new();
        let cfg = config(3);

        for expected_remaining in [2, 1, 0] {
            let r = limiter.check_at("k", &cfg, 1_000).unwrap();
            assert!(r.allowed);
            assert_eq!(r.remaining, expected_remaining);
        }

        let denied = limiter.check_at("k", &cfg, 2_000).unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.reset_at_ms, 61_000);
        assert_eq!(denied.retry_after_ms, 59_000);
    }

    #[test]
    fn test_window_slides() {
        let limiter = SlidingWindowLimiter::new();
        let cfg = config(2);

        assert!(limiter.check_at("k", &cfg, 0).unwrap().allowed);
        assert!(limiter.check_at("k", &cfg, 30_000).unwrap().allowed);
        assert!(!limiter.check_at("k", &cfg, 59_999).unwrap().allowed);

        // First hit leaves the window at exactly t = 60s
        let r = limiter.check_at("k", &cfg, 60_000).unwrap();
        assert!(r.allowed);
        assert_eq!(r.reset_at_ms, 90_000);
    }

    #[test]
    fn test_denied_hits_do_not_extend_lockout() {
        let limiter = SlidingWindowLimiter::new();
        let cfg = config(1);

        assert!(limiter.check_at("k", &cfg, 0).unwrap().allowed);
        for t in [10_000, 20_000, 59_000] {
            assert!(!limiter.check_at("k", &cfg, t).unwrap().allowed);
        }
        assert!(limiter.check_at("k", &cfg, 60_000).unwrap().allowed);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = SlidingWindowLimiter::new();
        let cfg = config(1);

        assert!(limiter.check_at("a", &cfg, 0).unwrap().allowed);
        assert!(limiter.check_at("b", &cfg, 0).unwrap().allowed);
        assert!(!limiter.check_at("a", &cfg, 1).unwrap().allowed);
    }

    #[test]
    fn test_prune_removes_idle_keys() {
        let limiter = SlidingWindowLimiter::new();
        let cfg = config(5);

        limiter.check_at("old", &cfg, 0).unwrap();
        limiter.check_at("fresh", &cfg, 50_000).unwrap();
        assert_eq!(limiter.tracked_keys(), 2);

        assert_eq!(limiter.prune(70_000, cfg.window), 1);
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let r = RateLimitResult {
            allowed: false,
            remaining: 0,
            reset_at_ms: 0,
            retry_after_ms: 1_001,
        };
        assert_eq!(r.retry_after_secs(), 2);
    }

    #[tokio::test]
    async fn test_middleware_returns_429_with_headers() {
        let state = RateLimitState::new(Arc::new(SlidingWindowLimiter::new()), config(1));
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(state, rate_limit_middleware));

        let request = || {
            axum::http::Request::builder()
                .uri("/")
                .header("x-forwarded-for", "198.51.100.7")
                .body(Body::empty())
                .unwrap()
        };

        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()["x-ratelimit-remaining"], "0");

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(second.headers()["x-ratelimit-limit"], "1");
        assert!(second.headers().contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn test_rotating_forwarded_for_does_not_reset_budget() {
        use crate::client::{TrustedProxies, resolve_client_ip};

        let state = RateLimitState::new(Arc::new(SlidingWindowLimiter::new()), config(2));
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(state, rate_limit_middleware))
            .layer(middleware::from_fn_with_state(TrustedProxies(1), resolve_client_ip));

        let request = |forwarded: &str| {
            axum::http::Request::builder()
                .uri("/")
                .header("x-forwarded-for", forwarded)
                .body(Body::empty())
                .unwrap()
        };

        // Same caller behind the proxy, forging a new left-hand entry each time
        for forged in ["192.0.2.1", "192.0.2.2"] {
            let response = app
                .clone()
                .oneshot(request(&format!("{forged}, 203.0.113.9")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        let response = app
            .clone()
            .oneshot(request("192.0.2.3, 203.0.113.9"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        // A different caller still has its own budget
        let response = app.oneshot(request("198.51.100.20")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
