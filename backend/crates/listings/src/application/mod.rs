//! Application Layer - Use cases
//!
//! Orchestrates domain objects and repository calls for the builder and
//! agent directories, projects, property listings and enquiries.

pub mod agents;
pub mod builders;
pub mod config;
pub mod enquiries;
pub mod projects;
pub mod properties;

pub use agents::{AgentInput, AgentUseCase};
pub use builders::{BuilderDetail, BuilderInput, BuilderUseCase};
pub use config::ListingsConfig;
pub use enquiries::{EnquiryInput, EnquiryUseCase};
pub use projects::{CreateProjectInput, ProjectDetail, ProjectQuery, ProjectUseCase};
pub use properties::{CreateListingInput, ListingDetailsInput, PropertyUseCase, SearchInput};
