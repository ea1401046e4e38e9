//! Slot Listing Use Cases
//!
//! Occupancy overview for advertisers and the live-ad lookup used when
//! rendering a slot.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use kernel::actor::CurrentUser;
use kernel::page::{Page, PageRequest};

use crate::domain::entities::{AdSlot, Advertisement};
use crate::domain::repository::{AdRepository, SlotRepository};
use crate::domain::services::next_free_date;
use crate::error::{AdsError, AdsResult};

#[derive(Debug, Clone)]
pub struct SlotOccupancy {
    pub slot: AdSlot,
    /// Pending or Active ad covering today
    pub current: Option<Advertisement>,
    pub next_free_date: NaiveDate,
}

pub struct ListSlotsUseCase<R>
where
    R: SlotRepository + AdRepository,
{
    repo: Arc<R>,
}

impl<R> ListSlotsUseCase<R>
where
    R: SlotRepository + AdRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, today: NaiveDate) -> AdsResult<Vec<SlotOccupancy>> {
        let slots = SlotRepository::list_slots(&*self.repo).await?;
        let blocking = AdRepository::list_blocking(&*self.repo, today).await?;

        let mut by_slot: HashMap<i32, Vec<Advertisement>> = HashMap::new();
        for ad in blocking {
            by_slot.entry(ad.slot_number).or_default().push(ad);
        }

        Ok(slots
            .into_iter()
            .map(|slot| {
                let ads = by_slot.remove(&slot.slot_number).unwrap_or_default();
                let ranges: Vec<_> = ads.iter().map(|a| (a.start_date, a.end_date)).collect();
                let current = ads.into_iter().find(|a| a.covers(today));
                SlotOccupancy {
                    next_free_date: next_free_date(today, &ranges),
                    slot,
                    current,
                }
            })
            .collect())
    }

    /// Active ad to render in the slot today
    pub async fn live(&self, slot_number: i32, today: NaiveDate) -> AdsResult<Option<Advertisement>> {
        SlotRepository::find_slot(&*self.repo, slot_number)
            .await?
            .ok_or(AdsError::SlotNotFound(slot_number))?;

        AdRepository::find_live(&*self.repo, slot_number, today).await
    }
}

pub struct MyAdsUseCase<A>
where
    A: AdRepository,
{
    ad_repo: Arc<A>,
}

impl<A> MyAdsUseCase<A>
where
    A: AdRepository,
{
    pub fn new(ad_repo: Arc<A>) -> Self {
        Self { ad_repo }
    }

    pub async fn execute(
        &self,
        actor: &CurrentUser,
        page: PageRequest,
    ) -> AdsResult<Page<Advertisement>> {
        self.ad_repo
            .list_by_advertiser(actor.user_id, page.normalized())
            .await
    }
}
