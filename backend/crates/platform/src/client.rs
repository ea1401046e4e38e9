//! Client identification utilities
//!
//! Identify the caller from HTTP headers: User-Agent fingerprint for
//! session binding, client IP for rate-limit keys and enquiry logs.
//!
//! `X-Forwarded-For` is only read when the deployment declares how many
//! proxies append to it. Entries left of those hops are client supplied
//! and never used.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{Extensions, HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use std::net::{IpAddr, SocketAddr};

use crate::crypto::sha256;

/// Client fingerprint derived from request headers
#[derive(Debug, Clone)]
pub struct ClientFingerprint {
    /// SHA-256 of the User-Agent header
    pub hash: [u8; 32],
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl ClientFingerprint {
    pub fn new(hash: [u8; 32], ip: Option<IpAddr>, user_agent: Option<String>) -> Self {
        Self {
            hash,
            ip,
            user_agent,
        }
    }

    pub fn hash_vec(&self) -> Vec<u8> {
        self.hash.to_vec()
    }

    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FingerprintError {
    #[error("Missing required header: {0}")]
    MissingHeader(String),
}

/// Fingerprint = SHA-256(User-Agent); the header is mandatory
pub fn extract_fingerprint(
    headers: &HeaderMap,
    client_ip: Option<IpAddr>,
) -> Result<ClientFingerprint, FingerprintError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|ua| !ua.trim().is_empty())
        .ok_or_else(|| FingerprintError::MissingHeader("User-Agent".to_string()))?;

    Ok(ClientFingerprint::new(
        sha256(user_agent.as_bytes()),
        client_ip,
        Some(user_agent.to_string()),
    ))
}

/// Number of reverse proxies in front of the server that append to
/// `X-Forwarded-For`. Zero means the header is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrustedProxies(pub usize);

/// Caller address resolved once per request by [`resolve_client_ip`]
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

/// The entry written by the outermost trusted proxy, else the peer address.
///
/// With `n` trusted proxies the client address is the `n`-th entry from
/// the right. A header with fewer entries did not pass through all of
/// them and is ignored.
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    proxies: TrustedProxies,
) -> Option<IpAddr> {
    if proxies.0 == 0 {
        return direct_ip;
    }

    let forwarded: Vec<&str> = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .collect();

    forwarded
        .len()
        .checked_sub(proxies.0)
        .and_then(|i| forwarded[i].parse::<IpAddr>().ok())
        .or(direct_ip)
}

/// Resolved address from [`resolve_client_ip`], else the socket peer
pub fn client_ip(extensions: &Extensions) -> Option<IpAddr> {
    match extensions.get::<ClientIp>() {
        Some(ClientIp(ip)) => *ip,
        // No ConnectInfo when the router is driven without a socket
        None => extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip()),
    }
}

/// Stable rate-limit key for a caller
pub fn client_key(ip: Option<IpAddr>) -> String {
    match ip {
        Some(ip) => format!("ip:{ip}"),
        None => "ip:unknown".to_string(),
    }
}

/// Store the caller's address as a [`ClientIp`] extension for every
/// handler and middleware further in.
pub async fn resolve_client_ip(
    State(proxies): State<TrustedProxies>,
    mut request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let ip = extract_client_ip(request.headers(), peer, proxies);
    request.extensions_mut().insert(ClientIp(ip));
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_fingerprint() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("EstateApp/2.1 (Android)"));

        let fp = extract_fingerprint(&headers, None).unwrap();
        assert_eq!(fp.hash, sha256(b"EstateApp/2.1 (Android)"));
        assert_eq!(fp.user_agent.as_deref(), Some("EstateApp/2.1 (Android)"));
    }

    #[test]
    fn test_extract_fingerprint_missing_or_blank_ua() {
        let mut headers = HeaderMap::new();
        assert!(extract_fingerprint(&headers, None).is_err());

        headers.insert(header::USER_AGENT, HeaderValue::from_static("   "));
        assert!(matches!(
            extract_fingerprint(&headers, None),
            Err(FingerprintError::MissingHeader(_))
        ));
    }

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_forwarded_for_ignored_without_proxies() {
        let headers = forwarded("203.0.113.9");
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        assert_eq!(
            extract_client_ip(&headers, Some(direct), TrustedProxies::default()),
            Some(direct)
        );
        assert_eq!(client_key(None), "ip:unknown");
    }

    #[test]
    fn test_spoofed_entries_left_of_proxy_are_skipped() {
        let direct: IpAddr = "10.0.0.1".parse().unwrap();
        let one = TrustedProxies(1);

        // Client sent "198.51.100.1"; our proxy appended the real peer
        let headers = forwarded("198.51.100.1, 203.0.113.9");
        assert_eq!(
            extract_client_ip(&headers, Some(direct), one),
            Some("203.0.113.9".parse().unwrap())
        );

        // Rotating the forged part does not change the key
        let rotated = forwarded("192.0.2.77, 203.0.113.9");
        assert_eq!(
            client_key(extract_client_ip(&rotated, Some(direct), one)),
            client_key(extract_client_ip(&headers, Some(direct), one)),
        );

        let two = TrustedProxies(2);
        let chained = forwarded("198.51.100.1, 203.0.113.9, 10.1.1.1");
        assert_eq!(
            extract_client_ip(&chained, Some(direct), two),
            Some("203.0.113.9".parse().unwrap())
        );
    }

    #[test]
    fn test_short_or_garbled_header_falls_back_to_peer() {
        let direct: IpAddr = "192.0.2.4".parse().unwrap();

        let headers = forwarded("203.0.113.9");
        assert_eq!(extract_client_ip(&headers, Some(direct), TrustedProxies(2)), Some(direct));

        let headers = forwarded("garbage");
        assert_eq!(extract_client_ip(&headers, Some(direct), TrustedProxies(1)), Some(direct));

        assert_eq!(extract_client_ip(&HeaderMap::new(), Some(direct), TrustedProxies(1)), Some(direct));
    }

    #[test]
    fn test_client_ip_prefers_resolved_extension() {
        let mut extensions = Extensions::new();
        assert_eq!(client_ip(&extensions), None);

        extensions.insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 4], 5000))));
        assert_eq!(client_ip(&extensions), Some("192.0.2.4".parse().unwrap()));

        let resolved: IpAddr = "203.0.113.9".parse().unwrap();
        extensions.insert(ClientIp(Some(resolved)));
        assert_eq!(client_ip(&extensions), Some(resolved));
    }
}
