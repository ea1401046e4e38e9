//! Activate / Cancel Use Cases

use std::sync::Arc;

use chrono::NaiveDate;
use kernel::actor::CurrentUser;
use kernel::error::app_error::AppError;
use kernel::id::AdId;

use crate::domain::entities::Advertisement;
use crate::domain::repository::AdRepository;
use crate::error::{AdsError, AdsResult};

pub struct ActivateAdUseCase<A>
where
    A: AdRepository,
{
    ad_repo: Arc<A>,
}

impl<A> ActivateAdUseCase<A>
where
    A: AdRepository,
{
    pub fn new(ad_repo: Arc<A>) -> Self {
        Self { ad_repo }
    }

    /// Payment was received offline
    pub async fn execute(
        &self,
        actor: &CurrentUser,
        id: AdId,
        today: NaiveDate,
    ) -> AdsResult<Advertisement> {
        actor.require_admin()?;

        let mut ad = self.ad_repo.find_by_id(id).await?.ok_or(AdsError::AdNotFound)?;
        let from = ad.status;
        ad.activate(today)?;
        self.ad_repo.update(&ad, from).await?;

        tracing::info!(
            ad_id = %ad.id,
            slot_number = ad.slot_number,
            by = %actor.public_id,
            "Ad activated"
        );

        Ok(ad)
    }
}

pub struct CancelAdUseCase<A>
where
    A: AdRepository,
{
    ad_repo: Arc<A>,
}

impl<A> CancelAdUseCase<A>
where
    A: AdRepository,
{
    pub fn new(ad_repo: Arc<A>) -> Self {
        Self { ad_repo }
    }

    pub async fn execute(&self, actor: &CurrentUser, id: AdId) -> AdsResult<Advertisement> {
        let mut ad = self.ad_repo.find_by_id(id).await?.ok_or(AdsError::AdNotFound)?;

        let by_admin = actor.role.is_admin();
        if !by_admin && ad.advertiser_id != actor.user_id {
            return Err(AppError::forbidden("Only the advertiser can cancel this booking")
                .with_code("NOT_AD_OWNER")
                .into());
        }

        let from = ad.status;
        ad.cancel(by_admin)?;
        self.ad_repo.update(&ad, from).await?;

        tracing::info!(
            ad_id = %ad.id,
            slot_number = ad.slot_number,
            by = %actor.public_id,
            by_admin,
            "Ad cancelled"
        );

        Ok(ad)
    }
}
