//! Quote Use Case

use std::sync::Arc;

use kernel::error::app_error::AppError;

use crate::application::config::AdsConfig;
use crate::domain::repository::SlotRepository;
use crate::domain::services::{self, Quote};
use crate::error::{AdsError, AdsResult};

pub struct QuoteUseCase<S>
where
    S: SlotRepository,
{
    slot_repo: Arc<S>,
    config: Arc<AdsConfig>,
}

impl<S> QuoteUseCase<S>
where
    S: SlotRepository,
{
    pub fn new(slot_repo: Arc<S>, config: Arc<AdsConfig>) -> Self {
        Self { slot_repo, config }
    }

    pub async fn execute(&self, slot_number: i32, days: u32) -> AdsResult<Quote> {
        check_days(days, &self.config)?;

        let slot = self
            .slot_repo
            .find_slot(slot_number)
            .await?
            .ok_or(AdsError::SlotNotFound(slot_number))?;

        Ok(services::quote(slot.price_per_day, days, &self.config.discount_tiers))
    }
}

pub(crate) fn check_days(days: u32, config: &AdsConfig) -> Result<(), AppError> {
    if days == 0 || days > config.max_days {
        return Err(AppError::bad_request(format!(
            "Duration must be between 1 and {} days",
            config.max_days
        ))
        .with_code("INVALID_AD_DURATION"));
    }
    Ok(())
}
