//! Application Configuration
//!
//! Configuration for the Listings application layer.

use platform::rate_limit::RateLimitConfig;

#[derive(Debug, Clone)]
pub struct ListingsConfig {
    /// Enquiries per client
    pub enquiry_rate_limit: RateLimitConfig,
    pub max_amenities: usize,
    /// Retries when a concurrent insert takes the chosen slug
    pub slug_attempts: u32,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            enquiry_rate_limit: RateLimitConfig::new(5, 3600),
            max_amenities: 30,
            slug_attempts: 3,
        }
    }
}

impl ListingsConfig {
    /// Generous enquiry budget for local testing
    pub fn development() -> Self {
        Self {
            enquiry_rate_limit: RateLimitConfig::new(100, 3600),
            ..Default::default()
        }
    }
}
