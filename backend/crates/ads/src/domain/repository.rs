//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::AdId;
use kernel::page::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::entities::{AdSlot, AdStatus, Advertisement};
use crate::error::AdsResult;

#[trait_variant::make(SlotRepository: Send)]
pub trait LocalSlotRepository {
    /// All slots ordered by number
    async fn list_slots(&self) -> AdsResult<Vec<AdSlot>>;

    async fn find_slot(&self, slot_number: i32) -> AdsResult<Option<AdSlot>>;
}

#[trait_variant::make(AdRepository: Send)]
pub trait LocalAdRepository {
    /// Insert a Pending ad. Fails with `SlotNotFound`, `SlotDisabled` or
    /// `SlotOccupied`; the availability check and the insert are atomic.
    async fn book(&self, ad: &Advertisement) -> AdsResult<()>;

    async fn find_by_id(&self, id: AdId) -> AdsResult<Option<Advertisement>>;

    /// Persist status and timestamps, but only while the stored row is
    /// still in `from`. A row that moved on meanwhile yields
    /// `InvalidTransition` and is left untouched.
    async fn update(&self, ad: &Advertisement, from: AdStatus) -> AdsResult<()>;

    /// Newest first
    async fn list_by_advertiser(
        &self,
        advertiser_id: Uuid,
        page: PageRequest,
    ) -> AdsResult<Page<Advertisement>>;

    /// Pending/Active ads on any slot ending on or after `today`
    async fn list_blocking(&self, today: NaiveDate) -> AdsResult<Vec<Advertisement>>;

    /// Active ad covering `today`
    async fn find_live(&self, slot_number: i32, today: NaiveDate)
    -> AdsResult<Option<Advertisement>>;

    /// Pending/Active ads with `end_date < today` → Expired
    async fn expire_ended(&self, today: NaiveDate) -> AdsResult<u64>;

    /// Pending ads created before `cutoff` → Cancelled
    async fn cancel_unpaid(&self, cutoff: DateTime<Utc>) -> AdsResult<u64>;
}

/// Everything the ads use cases need from storage
pub trait AdsStore: SlotRepository + AdRepository + Send + Sync + 'static {}

impl<T> AdsStore for T where T: SlotRepository + AdRepository + Send + Sync + 'static {}
