//! Listings Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Builders, projects, property listings, agents, enquiries
//! - `application/` - Use cases
//! - `infra/` - Database implementation
//! - `presentation/` - HTTP handlers
//!
//! ## Rules
//! - Builder and project slugs derive from the name; collisions get `-2`, `-3`, …
//! - Public property search only returns Active listings
//! - Sold applies to sale listings, Rented to rentals
//! - Enquiries go to Active listings and are rate limited per client address

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ListingsConfig;
pub use error::{ListingsError, ListingsResult};
pub use infra::postgres::PgListingsRepository;
pub use presentation::router::listings_router;

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::services::PropertySort;
    pub use crate::presentation::dto::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}
