//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::{AgentId, BuilderId, ProjectId, PropertyId};
use kernel::page::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::entities::{AgentProfile, Builder, Enquiry, Project, Property};
use crate::domain::services::{AgentFilter, BuilderFilter, ProjectFilter, PropertyFilter, PropertySort};
use crate::error::ListingsResult;

#[trait_variant::make(BuilderRepository: Send)]
pub trait LocalBuilderRepository {
    /// Fails with `SlugTaken` when the slug was claimed concurrently
    async fn create(&self, builder: &Builder) -> ListingsResult<()>;

    async fn update(&self, builder: &Builder) -> ListingsResult<()>;

    async fn find_by_id(&self, id: BuilderId) -> ListingsResult<Option<Builder>>;

    async fn find_by_slug(&self, slug: &str) -> ListingsResult<Option<Builder>>;

    /// Existing slugs equal to `base` or of the form `base-N`
    async fn slugs_like(&self, base: &str) -> ListingsResult<Vec<String>>;

    /// Ordered by name
    async fn list(&self, filter: &BuilderFilter, page: PageRequest) -> ListingsResult<Page<Builder>>;

    async fn project_count(&self, id: BuilderId) -> ListingsResult<u64>;
}

#[trait_variant::make(ProjectRepository: Send)]
pub trait LocalProjectRepository {
    async fn create(&self, project: &Project) -> ListingsResult<()>;

    async fn find_by_id(&self, id: ProjectId) -> ListingsResult<Option<Project>>;

    async fn find_by_slug(&self, slug: &str) -> ListingsResult<Option<Project>>;

    async fn slugs_like(&self, base: &str) -> ListingsResult<Vec<String>>;

    /// Newest first
    async fn list(&self, filter: &ProjectFilter, page: PageRequest) -> ListingsResult<Page<Project>>;

    /// Active listings in the project
    async fn listing_count(&self, id: ProjectId) -> ListingsResult<u64>;
}

#[trait_variant::make(PropertyRepository: Send)]
pub trait LocalPropertyRepository {
    async fn create(&self, property: &Property) -> ListingsResult<()>;

    async fn find_by_id(&self, id: PropertyId) -> ListingsResult<Option<Property>>;

    async fn update(&self, property: &Property) -> ListingsResult<()>;

    /// Removes the listing and its enquiries
    async fn delete(&self, id: PropertyId) -> ListingsResult<()>;

    async fn search(
        &self,
        filter: &PropertyFilter,
        sort: PropertySort,
        page: PageRequest,
    ) -> ListingsResult<Page<Property>>;
}

#[trait_variant::make(AgentRepository: Send)]
pub trait LocalAgentRepository {
    /// Insert or replace the profile keyed by `user_id`
    async fn save(&self, agent: &AgentProfile) -> ListingsResult<()>;

    async fn find_by_id(&self, id: AgentId) -> ListingsResult<Option<AgentProfile>>;

    async fn find_by_user(&self, user_id: Uuid) -> ListingsResult<Option<AgentProfile>>;

    /// Verified first, then by name
    async fn list(&self, filter: &AgentFilter, page: PageRequest) -> ListingsResult<Page<AgentProfile>>;
}

#[trait_variant::make(EnquiryRepository: Send)]
pub trait LocalEnquiryRepository {
    async fn create(&self, enquiry: &Enquiry) -> ListingsResult<()>;

    /// Newest first
    async fn list_for_property(
        &self,
        property_id: PropertyId,
        page: PageRequest,
    ) -> ListingsResult<Page<Enquiry>>;
}

/// Everything the listings use cases need from storage
pub trait ListingsStore:
    BuilderRepository
    + ProjectRepository
    + PropertyRepository
    + AgentRepository
    + EnquiryRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> ListingsStore for T where
    T: BuilderRepository
        + ProjectRepository
        + PropertyRepository
        + AgentRepository
        + EnquiryRepository
        + Send
        + Sync
        + 'static
{
}
