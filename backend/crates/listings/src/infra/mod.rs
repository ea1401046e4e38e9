//! Infrastructure Layer - External dependencies
//!
//! PostgreSQL implementations of the listings repository traits.

pub mod postgres;
