//! Book Ad Use Case
//!
//! Reserves a slot for an inclusive date range. The ad starts Pending and
//! goes live once an admin confirms payment.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use kernel::actor::CurrentUser;
use kernel::error::app_error::AppError;

use crate::application::config::AdsConfig;
use crate::application::quote::check_days;
use crate::domain::entities::Advertisement;
use crate::domain::repository::{AdRepository, SlotRepository};
use crate::domain::services::{self, Quote};
use crate::domain::value_objects::{AdCopy, BookingWindow};
use crate::error::{AdsError, AdsResult};

#[derive(Debug, Clone)]
pub struct BookAdInput {
    pub slot_number: i32,
    pub title: String,
    pub image_url: String,
    pub target_url: String,
    pub start_date: NaiveDate,
    pub days: u32,
}

#[derive(Debug, Clone)]
pub struct BookAdOutput {
    pub ad: Advertisement,
    pub quote: Quote,
}

pub struct BookAdUseCase<R>
where
    R: SlotRepository + AdRepository,
{
    repo: Arc<R>,
    config: Arc<AdsConfig>,
}

impl<R> BookAdUseCase<R>
where
    R: SlotRepository + AdRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AdsConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(
        &self,
        actor: &CurrentUser,
        input: BookAdInput,
        today: NaiveDate,
    ) -> AdsResult<BookAdOutput> {
        actor.require_verified()?;
        check_days(input.days, &self.config)?;

        if input.start_date < today {
            return Err(AppError::bad_request("Start date is in the past")
                .with_code("AD_START_IN_PAST")
                .into());
        }
        let horizon = today + Duration::days(self.config.booking_horizon_days as i64);
        if input.start_date > horizon {
            return Err(AppError::bad_request(format!(
                "Bookings can start at most {} days ahead",
                self.config.booking_horizon_days
            ))
            .with_code("AD_START_TOO_FAR")
            .into());
        }

        let copy = AdCopy::new(&input.title, &input.image_url, &input.target_url)?;
        let window = BookingWindow::new(input.start_date, input.days)?;

        // Price comes from the slot as seen now; availability is rechecked
        // under the slot lock inside `book`.
        let slot = SlotRepository::find_slot(&*self.repo, input.slot_number)
            .await?
            .ok_or(AdsError::SlotNotFound(input.slot_number))?;
        if !slot.active {
            return Err(AdsError::SlotDisabled(slot.slot_number));
        }

        let quote = services::quote(slot.price_per_day, input.days, &self.config.discount_tiers);
        let ad = Advertisement::new(slot.slot_number, actor.user_id, copy, window, quote.amount);

        AdRepository::book(&*self.repo, &ad).await?;

        tracing::info!(
            ad_id = %ad.id,
            slot_number = ad.slot_number,
            start = %ad.start_date,
            end = %ad.end_date,
            amount = ad.amount,
            advertiser = %actor.public_id,
            "Ad booked"
        );

        Ok(BookAdOutput { ad, quote })
    }
}
