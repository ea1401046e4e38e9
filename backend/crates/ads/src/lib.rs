//! Ads (Advertisement Slots) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Slots, advertisements, pricing and calendar rules
//! - `application/` - Use cases
//! - `infra/` - Database implementation
//! - `presentation/` - HTTP handlers
//!
//! ## Booking Model
//! - Each numbered slot shows at most one ad on any given day
//! - Bookings start Pending and go live when an admin confirms payment
//! - Availability check and insert run under a row lock on the slot
//! - A periodic sweep expires finished ads and drops unpaid bookings

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AdsConfig;
pub use application::{SweepReport, SweepUseCase};
pub use error::{AdsError, AdsResult};
pub use infra::postgres::PgAdsRepository;
pub use presentation::router::ads_router;

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::services::{DiscountTier, Quote};
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}
