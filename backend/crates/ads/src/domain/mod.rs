//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (AdSlot, Advertisement)
//! - Domain value objects (AdCopy, BookingWindow)
//! - Domain services (pricing, calendar arithmetic)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
