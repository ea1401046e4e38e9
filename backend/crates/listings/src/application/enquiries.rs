//! Enquiry Use Cases
//!
//! Visitors contact a listing's owner. Submissions are rate limited per
//! client address.

use std::sync::Arc;

use kernel::actor::CurrentUser;
use kernel::error::app_error::AppError;
use kernel::id::PropertyId;
use kernel::page::{Page, PageRequest};
use platform::rate_limit::SlidingWindowLimiter;

use crate::application::config::ListingsConfig;
use crate::domain::entities::{Enquiry, EnquiryDraft};
use crate::domain::repository::{EnquiryRepository, PropertyRepository};
use crate::domain::value_objects::{
    ContactName, EnquiryMessage, contact_email, contact_phone, optional,
};
use crate::error::{ListingsError, ListingsResult};

#[derive(Debug, Clone)]
pub struct EnquiryInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: String,
}

impl EnquiryInput {
    fn validate(&self) -> ListingsResult<EnquiryDraft> {
        let draft = EnquiryDraft {
            name: ContactName::new(&self.name)?,
            email: optional(self.email.as_deref(), contact_email)?,
            phone: optional(self.phone.as_deref(), contact_phone)?,
            message: EnquiryMessage::new(&self.message)?,
        };
        if draft.email.is_none() && draft.phone.is_none() {
            return Err(AppError::bad_request("Provide an email address or a phone number")
                .with_code("ENQUIRY_CONTACT_REQUIRED")
                .into());
        }
        Ok(draft)
    }
}

pub struct EnquiryUseCase<P, E>
where
    P: PropertyRepository,
    E: EnquiryRepository,
{
    property_repo: Arc<P>,
    enquiry_repo: Arc<E>,
    limiter: Arc<SlidingWindowLimiter>,
    config: Arc<ListingsConfig>,
}

impl<P, E> EnquiryUseCase<P, E>
where
    P: PropertyRepository,
    E: EnquiryRepository,
{
    pub fn new(
        property_repo: Arc<P>,
        enquiry_repo: Arc<E>,
        limiter: Arc<SlidingWindowLimiter>,
        config: Arc<ListingsConfig>,
    ) -> Self {
        Self {
            property_repo,
            enquiry_repo,
            limiter,
            config,
        }
    }

    /// `client_key` identifies the caller's address (see `platform::client::client_key`)
    pub async fn submit(
        &self,
        sender: Option<&CurrentUser>,
        client_key: &str,
        property_id: PropertyId,
        input: EnquiryInput,
        now_ms: i64,
    ) -> ListingsResult<Enquiry> {
        let draft = input.validate()?;

        let property = self
            .property_repo
            .find_by_id(property_id)
            .await?
            .ok_or(ListingsError::PropertyNotFound)?;
        if !property.is_active() {
            return Err(ListingsError::ListingNotActive);
        }

        // Only well-formed enquiries on live listings spend the budget
        let key = format!("enquiry:{client_key}");
        let verdict = self
            .limiter
            .check_at(&key, &self.config.enquiry_rate_limit, now_ms)
            .map_err(|e| ListingsError::Internal(e.to_string()))?;
        if !verdict.allowed {
            return Err(ListingsError::EnquiryRateLimited {
                retry_after_secs: verdict.retry_after_secs(),
            });
        }

        let enquiry = Enquiry::new(property.id, sender.map(|s| s.user_id), draft);
        self.enquiry_repo.create(&enquiry).await?;

        tracing::info!(
            enquiry_id = %enquiry.id,
            property_id = %property.id,
            remaining = verdict.remaining,
            "Enquiry received"
        );
        Ok(enquiry)
    }

    /// Owner of the listing, or moderator+
    pub async fn list_for_property(
        &self,
        actor: &CurrentUser,
        property_id: PropertyId,
        page: PageRequest,
    ) -> ListingsResult<Page<Enquiry>> {
        let property = self
            .property_repo
            .find_by_id(property_id)
            .await?
            .ok_or(ListingsError::PropertyNotFound)?;

        if !actor.can_manage(&property.owner_id) {
            return Err(AppError::forbidden("Only the listing owner can read its enquiries")
                .with_code("NOT_LISTING_OWNER")
                .into());
        }

        self.enquiry_repo
            .list_for_property(property_id, page.normalized())
            .await
    }
}
