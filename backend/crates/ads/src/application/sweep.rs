//! Expiry Sweep Use Case
//!
//! Run periodically by the server and on demand by admins.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::application::config::AdsConfig;
use crate::domain::repository::AdRepository;
use crate::error::AdsResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub expired: u64,
    pub cancelled: u64,
}

pub struct SweepUseCase<A>
where
    A: AdRepository,
{
    ad_repo: Arc<A>,
    config: Arc<AdsConfig>,
}

impl<A> SweepUseCase<A>
where
    A: AdRepository,
{
    pub fn new(ad_repo: Arc<A>, config: Arc<AdsConfig>) -> Self {
        Self { ad_repo, config }
    }

    /// Ended ads expire before unpaid ones are cancelled, so a Pending ad
    /// past its end date is reported as expired.
    pub async fn execute(&self, today: NaiveDate, now: DateTime<Utc>) -> AdsResult<SweepReport> {
        let expired = self.ad_repo.expire_ended(today).await?;
        let cutoff = now - self.config.payment_hold_chrono();
        let cancelled = self.ad_repo.cancel_unpaid(cutoff).await?;

        let report = SweepReport { expired, cancelled };
        if expired > 0 || cancelled > 0 {
            tracing::info!(expired, cancelled, %today, "Ad sweep finished");
        } else {
            tracing::debug!(%today, "Ad sweep found nothing to do");
        }

        Ok(report)
    }
}
