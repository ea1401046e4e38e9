//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::AdId;
use serde::{Deserialize, Serialize};

use crate::application::SlotOccupancy;
use crate::domain::entities::{AdStatus, Advertisement, SlotTier};
use crate::domain::services::Quote;

// ============================================================================
// Slots
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    pub slot_number: i32,
    pub name: String,
    pub placement: String,
    pub tier: SlotTier,
    pub price_per_day: i64,
    pub active: bool,
    /// A Pending or Active ad covers today
    pub occupied: bool,
    pub occupied_until: Option<NaiveDate>,
    pub next_free_date: NaiveDate,
}

impl From<SlotOccupancy> for SlotResponse {
    fn from(o: SlotOccupancy) -> Self {
        Self {
            slot_number: o.slot.slot_number,
            name: o.slot.name,
            placement: o.slot.placement,
            tier: o.slot.tier,
            price_per_day: o.slot.price_per_day,
            active: o.slot.active,
            occupied: o.current.is_some(),
            occupied_until: o.current.map(|ad| ad.end_date),
            next_free_date: o.next_free_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteQuery {
    pub days: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub slot_number: i32,
    #[serde(flatten)]
    pub quote: Quote,
}

/// What the page renders; no advertiser details
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveAdResponse {
    pub id: AdId,
    pub slot_number: i32,
    pub title: String,
    pub image_url: String,
    pub target_url: String,
    pub ends_on: NaiveDate,
}

impl From<Advertisement> for LiveAdResponse {
    fn from(ad: Advertisement) -> Self {
        Self {
            id: ad.id,
            slot_number: ad.slot_number,
            title: ad.title,
            image_url: ad.image_url,
            target_url: ad.target_url,
            ends_on: ad.end_date,
        }
    }
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAdRequest {
    pub slot_number: i32,
    pub title: String,
    pub image_url: String,
    pub target_url: String,
    /// `YYYY-MM-DD`
    pub start_date: NaiveDate,
    pub days: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdResponse {
    pub id: AdId,
    pub slot_number: i32,
    pub title: String,
    pub image_url: String,
    pub target_url: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i32,
    pub amount: i64,
    pub status: AdStatus,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
}

impl From<Advertisement> for AdResponse {
    fn from(ad: Advertisement) -> Self {
        Self {
            id: ad.id,
            slot_number: ad.slot_number,
            title: ad.title,
            image_url: ad.image_url,
            target_url: ad.target_url,
            start_date: ad.start_date,
            end_date: ad.end_date,
            days: ad.days,
            amount: ad.amount,
            status: ad.status,
            created_at: ad.created_at,
            activated_at: ad.activated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAdResponse {
    pub ad: AdResponse,
    pub quote: Quote,
}
