//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC, Base64, numeric OTP codes)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Cookie management
//! - Client identification (IP, User-Agent fingerprint)
//! - In-memory sliding-window rate limiting and its axum middleware

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
