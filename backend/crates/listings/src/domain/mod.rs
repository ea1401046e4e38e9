//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Builder, Project, Property, AgentProfile, Enquiry)
//! - Domain value objects (names, places, contact fields, price bands)
//! - Domain services (slug allocation, search filters)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
