//! Forum Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Categories, posts, replies, reactions and their rules
//! - `application/` - Use cases
//! - `infra/` - Database implementation
//! - `presentation/` - HTTP handlers
//!
//! ## Model
//! - Two-level categories: city → property type
//! - Listing a city includes posts filed under its property types
//! - One reaction per user per post or reply; pressing it again removes it
//! - Reply counts, likes, dislikes and last activity are aggregated in SQL

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ForumConfig;
pub use error::{ForumError, ForumResult};
pub use infra::postgres::PgForumRepository;
pub use presentation::router::forum_router;

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::services::{CategoryNode, PostSort, PostSummary, ReactionTally};
    pub use crate::presentation::dto::*;
}

pub mod router {
    pub use crate::presentation::router::*;
}

#[cfg(test)]
mod tests;
