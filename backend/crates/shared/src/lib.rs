//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of marketplace vocabulary:
//! - Common error types and result aliases
//! - Typed IDs for every domain entity
//! - Pagination primitives used by list endpoints
//! - The authenticated actor (`CurrentUser`) and its `Role`
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains (auth, listings,
//! forum, ads).

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod actor;
pub mod id;
pub mod page;
