//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Category, Post, Reply, Reaction)
//! - Domain value objects (titles, bodies, category names)
//! - Domain services (reaction toggling, aggregation, category tree)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
