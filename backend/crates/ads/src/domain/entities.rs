//! Domain Entities
//!
//! - `AdSlot`: a numbered advertising position with a per-day price
//! - `Advertisement`: a booking of one slot for an inclusive date range

use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use kernel::id::AdId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{AdCopy, BookingWindow};
use crate::error::{AdsError, AdsResult};

/// Visibility tier of a slot (informational; price lives on the slot)
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum SlotTier {
    #[display("premium")]
    Premium = 0,
    #[display("featured")]
    Featured = 1,
    #[display("standard")]
    Standard = 2,
}

impl SlotTier {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Premium),
            1 => Some(Self::Featured),
            2 => Some(Self::Standard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdSlot {
    /// 1-based, unique
    pub slot_number: i32,
    pub name: String,
    /// Where the slot renders, e.g. `home_hero`
    pub placement: String,
    pub tier: SlotTier,
    /// Minor currency units
    pub price_per_day: i64,
    /// Disabled slots accept no new bookings
    pub active: bool,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum AdStatus {
    /// Booked, awaiting payment
    #[display("pending")]
    Pending = 0,
    #[display("active")]
    Active = 1,
    #[display("expired")]
    Expired = 2,
    #[display("cancelled")]
    Cancelled = 3,
}

impl AdStatus {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Pending),
            1 => Some(Self::Active),
            2 => Some(Self::Expired),
            3 => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Pending and Active ads hold their dates
    #[inline]
    pub const fn blocks_slot(&self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }
}

#[derive(Debug, Clone)]
pub struct Advertisement {
    pub id: AdId,
    pub slot_number: i32,
    pub advertiser_id: Uuid,
    pub title: String,
    pub image_url: String,
    pub target_url: String,
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: NaiveDate,
    pub days: i32,
    /// Minor currency units, after discount
    pub amount: i64,
    pub status: AdStatus,
    pub created_at: DateTime<Utc>,
    pub activated_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Advertisement {
    pub fn new(
        slot_number: i32,
        advertiser_id: Uuid,
        copy: AdCopy,
        window: BookingWindow,
        amount: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: AdId::new(),
            slot_number,
            advertiser_id,
            title: copy.title,
            image_url: copy.image_url,
            target_url: copy.target_url,
            start_date: window.start(),
            end_date: window.end(),
            days: window.days() as i32,
            amount,
            status: AdStatus::Pending,
            created_at: now,
            activated_at: None,
            updated_at: now,
        }
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    /// Rendered right now
    pub fn is_live(&self, today: NaiveDate) -> bool {
        self.status == AdStatus::Active && self.covers(today)
    }

    /// Payment confirmed. Only Pending ads that have not already run out
    /// can go live.
    pub fn activate(&mut self, today: NaiveDate) -> AdsResult<()> {
        if self.status != AdStatus::Pending {
            return Err(AdsError::InvalidTransition {
                from: self.status,
                to: AdStatus::Active,
            });
        }
        if self.end_date < today {
            return Err(AdsError::AlreadyEnded(self.end_date));
        }

        let now = Utc::now();
        self.status = AdStatus::Active;
        self.activated_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Advertisers may withdraw a Pending booking; admins may cancel any
    /// ad that still holds the slot.
    pub fn cancel(&mut self, by_admin: bool) -> AdsResult<()> {
        let allowed = match self.status {
            AdStatus::Pending => true,
            AdStatus::Active => by_admin,
            AdStatus::Expired | AdStatus::Cancelled => false,
        };
        if !allowed {
            return Err(AdsError::InvalidTransition {
                from: self.status,
                to: AdStatus::Cancelled,
            });
        }

        self.status = AdStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Still holding the slot after its last day
    pub fn is_ended(&self, today: NaiveDate) -> bool {
        self.status.blocks_slot() && self.end_date < today
    }

    /// Booked before `cutoff` and never paid for
    pub fn is_unpaid_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.status == AdStatus::Pending && self.created_at < cutoff
    }
}
