//! Property Listing Use Cases

use std::sync::Arc;

use kernel::actor::CurrentUser;
use kernel::error::app_error::AppError;
use kernel::id::{AgentId, PropertyId};
use kernel::page::{Page, PageRequest};

use crate::domain::entities::{
    ListingDetails, ListingDraft, ListingType, Property, PropertyStatus, PropertyType,
};
use crate::domain::repository::{AgentRepository, ProjectRepository, PropertyRepository};
use crate::domain::services::{PropertyFilter, PropertySort};
use crate::domain::value_objects::{Description, ListingTitle, Place, positive, room_count};
use crate::error::{ListingsError, ListingsResult};

/// Editable fields
#[derive(Debug, Clone)]
pub struct ListingDetailsInput {
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub area_sqft: i64,
    pub bedrooms: Option<i16>,
    pub bathrooms: Option<i16>,
}

impl ListingDetailsInput {
    fn validate(&self) -> ListingsResult<ListingDetails> {
        Ok(ListingDetails {
            title: ListingTitle::new(&self.title)?,
            description: Description::new(self.description.as_deref().unwrap_or_default())?,
            price: positive(self.price, "price", "INVALID_PRICE")?,
            area_sqft: positive(self.area_sqft, "areaSqft", "INVALID_AREA")?,
            bedrooms: room_count(self.bedrooms, "bedrooms")?,
            bathrooms: room_count(self.bathrooms, "bathrooms")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CreateListingInput {
    pub details: ListingDetailsInput,
    pub listing_type: ListingType,
    pub property_type: PropertyType,
    pub city: String,
    pub locality: String,
    pub project_slug: Option<String>,
    pub agent_id: Option<AgentId>,
}

/// Public search parameters
#[derive(Debug, Clone, Default)]
pub struct SearchInput {
    pub city: Option<String>,
    pub locality: Option<String>,
    pub listing_type: Option<ListingType>,
    pub property_type: Option<PropertyType>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_bedrooms: Option<i16>,
    pub project_slug: Option<String>,
    pub sort: PropertySort,
}

fn ensure_listing_owner(actor: &CurrentUser, property: &Property) -> ListingsResult<()> {
    if actor.can_manage(&property.owner_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("Only the owner or a moderator can change this listing")
            .with_code("NOT_LISTING_OWNER")
            .into())
    }
}

pub struct PropertyUseCase<J, P, A>
where
    J: ProjectRepository,
    P: PropertyRepository,
    A: AgentRepository,
{
    project_repo: Arc<J>,
    property_repo: Arc<P>,
    agent_repo: Arc<A>,
}

impl<J, P, A> PropertyUseCase<J, P, A>
where
    J: ProjectRepository,
    P: PropertyRepository,
    A: AgentRepository,
{
    pub fn new(project_repo: Arc<J>, property_repo: Arc<P>, agent_repo: Arc<A>) -> Self {
        Self {
            project_repo,
            property_repo,
            agent_repo,
        }
    }

    pub async fn create(&self, actor: &CurrentUser, input: CreateListingInput) -> ListingsResult<Property> {
        actor.require_verified()?;
        let details = input.details.validate()?;
        let city = Place::new(&input.city, "city")?;
        let locality = Place::new(&input.locality, "locality")?;

        let project_id = match input.project_slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => Some(
                self.project_repo
                    .find_by_slug(slug)
                    .await?
                    .ok_or(ListingsError::ProjectNotFound)?
                    .id,
            ),
            _ => None,
        };

        if let Some(agent_id) = input.agent_id {
            self.agent_repo
                .find_by_id(agent_id)
                .await?
                .ok_or(ListingsError::AgentNotFound)?;
        }

        let property = Property::new(
            actor.user_id,
            ListingDraft {
                details,
                listing_type: input.listing_type,
                property_type: input.property_type,
                city,
                locality,
                project_id,
                agent_id: input.agent_id,
            },
        );
        self.property_repo.create(&property).await?;

        tracing::info!(
            property_id = %property.id,
            listing_type = %property.listing_type,
            city = %property.city,
            owner = %actor.public_id,
            "Property listed"
        );
        Ok(property)
    }

    /// Listings that are not Active are visible to their owner and moderators only
    pub async fn get(&self, viewer: Option<&CurrentUser>, id: PropertyId) -> ListingsResult<Property> {
        let property = self.find(id).await?;
        let visible = property.is_active() || viewer.is_some_and(|v| v.can_manage(&property.owner_id));
        if visible {
            Ok(property)
        } else {
            Err(ListingsError::PropertyNotFound)
        }
    }

    pub async fn update(
        &self,
        actor: &CurrentUser,
        id: PropertyId,
        input: ListingDetailsInput,
    ) -> ListingsResult<Property> {
        let mut property = self.find(id).await?;
        ensure_listing_owner(actor, &property)?;

        property.apply(input.validate()?);
        self.property_repo.update(&property).await?;

        tracing::info!(property_id = %id, by = %actor.public_id, "Property updated");
        Ok(property)
    }

    pub async fn set_status(
        &self,
        actor: &CurrentUser,
        id: PropertyId,
        status: PropertyStatus,
    ) -> ListingsResult<Property> {
        let mut property = self.find(id).await?;
        ensure_listing_owner(actor, &property)?;

        if property.set_status(status)? {
            self.property_repo.update(&property).await?;
            tracing::info!(property_id = %id, %status, by = %actor.public_id, "Property status changed");
        }
        Ok(property)
    }

    pub async fn delete(&self, actor: &CurrentUser, id: PropertyId) -> ListingsResult<()> {
        let property = self.find(id).await?;
        ensure_listing_owner(actor, &property)?;

        self.property_repo.delete(id).await?;
        tracing::info!(property_id = %id, by = %actor.public_id, "Property deleted");
        Ok(())
    }

    /// Active listings only. An unknown project slug matches nothing.
    pub async fn search(&self, input: SearchInput, page: PageRequest) -> ListingsResult<Page<Property>> {
        let page = page.normalized();

        let project_id = match input.project_slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => match self.project_repo.find_by_slug(slug).await? {
                Some(project) => Some(project.id),
                None => return Ok(Page::new(Vec::new(), page, 0)),
            },
            _ => None,
        };

        let filter = PropertyFilter {
            city: input.city,
            locality: input.locality,
            listing_type: input.listing_type,
            property_type: input.property_type,
            min_price: input.min_price,
            max_price: input.max_price,
            min_bedrooms: input.min_bedrooms,
            project_id,
            status: Some(PropertyStatus::Active),
        };
        filter.validate()?;

        self.property_repo.search(&filter, input.sort, page).await
    }

    async fn find(&self, id: PropertyId) -> ListingsResult<Property> {
        self.property_repo
            .find_by_id(id)
            .await?
            .ok_or(ListingsError::PropertyNotFound)
    }
}
