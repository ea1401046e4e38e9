//! Application Configuration
//!
//! Configuration for the Ads application layer.

use std::time::Duration;

use crate::domain::services::DiscountTier;

#[derive(Debug, Clone)]
pub struct AdsConfig {
    /// Longest single booking
    pub max_days: u32,
    /// How far ahead a booking may start
    pub booking_horizon_days: u32,
    /// Pending ads unpaid for this long are cancelled by the sweep
    pub payment_hold: Duration,
    pub discount_tiers: Vec<DiscountTier>,
}

impl Default for AdsConfig {
    fn default() -> Self {
        Self {
            max_days: 90,
            booking_horizon_days: 180,
            payment_hold: Duration::from_secs(48 * 3600),
            discount_tiers: vec![
                DiscountTier {
                    min_days: 7,
                    percent: 10,
                },
                DiscountTier {
                    min_days: 30,
                    percent: 20,
                },
            ],
        }
    }
}

impl AdsConfig {
    /// Short payment hold so the sweep is observable locally
    pub fn development() -> Self {
        Self {
            payment_hold: Duration::from_secs(15 * 60),
            ..Default::default()
        }
    }

    pub fn payment_hold_chrono(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.payment_hold.as_secs() as i64)
    }
}
