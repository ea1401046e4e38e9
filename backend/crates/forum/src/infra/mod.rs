//! Infrastructure Layer
//!
//! PostgreSQL repository implementation.

pub mod postgres;

pub use postgres::PgForumRepository;
