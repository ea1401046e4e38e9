//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.

pub mod book_ad;
pub mod config;
pub mod manage_ad;
pub mod quote;
pub mod slots;
pub mod sweep;

pub use book_ad::{BookAdInput, BookAdOutput, BookAdUseCase};
pub use config::AdsConfig;
pub use manage_ad::{ActivateAdUseCase, CancelAdUseCase};
pub use quote::QuoteUseCase;
pub use slots::{ListSlotsUseCase, MyAdsUseCase, SlotOccupancy};
pub use sweep::{SweepReport, SweepUseCase};
