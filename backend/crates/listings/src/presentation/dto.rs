//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::{AgentId, BuilderId, EnquiryId, ProjectId, PropertyId};
use kernel::page::PageRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{
    AgentInput, BuilderDetail, BuilderInput, CreateListingInput, CreateProjectInput, EnquiryInput,
    ListingDetailsInput, ProjectDetail, ProjectQuery, SearchInput,
};
use crate::domain::entities::{
    AgentProfile, Builder, Enquiry, ListingType, Project, ProjectStatus, Property, PropertyStatus,
    PropertyType,
};
use crate::domain::services::{AgentFilter, BuilderFilter, PropertySort};

fn page_request(page: Option<u32>, per_page: Option<u32>) -> PageRequest {
    let default = PageRequest::default();
    PageRequest::new(page.unwrap_or(default.page), per_page.unwrap_or(default.per_page))
}

// ============================================================================
// Builders
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderRequest {
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub city: String,
    pub established_year: Option<i16>,
}

impl From<BuilderRequest> for BuilderInput {
    fn from(r: BuilderRequest) -> Self {
        Self {
            name: r.name,
            description: r.description,
            website: r.website,
            city: r.city,
            established_year: r.established_year,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderListQuery {
    pub city: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub verified_only: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl BuilderListQuery {
    pub fn into_parts(self) -> (BuilderFilter, PageRequest) {
        (
            BuilderFilter {
                city: self.city,
                q: self.q,
                verified_only: self.verified_only,
            },
            page_request(self.page, self.per_page),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderResponse {
    pub id: BuilderId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub city: String,
    pub established_year: Option<i16>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Builder> for BuilderResponse {
    fn from(b: Builder) -> Self {
        Self {
            id: b.id,
            name: b.name,
            slug: b.slug,
            description: b.description,
            website: b.website,
            city: b.city,
            established_year: b.established_year,
            verified: b.verified,
            created_at: b.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderDetailResponse {
    #[serde(flatten)]
    pub builder: BuilderResponse,
    pub project_count: u64,
}

impl From<BuilderDetail> for BuilderDetailResponse {
    fn from(d: BuilderDetail) -> Self {
        Self {
            builder: d.builder.into(),
            project_count: d.project_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyRequest {
    #[serde(default = "default_true")]
    pub verified: bool,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub builder_slug: String,
    pub name: String,
    pub city: String,
    pub locality: String,
    pub status: ProjectStatus,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub possession_date: Option<NaiveDate>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub description: Option<String>,
}

impl From<CreateProjectRequest> for CreateProjectInput {
    fn from(r: CreateProjectRequest) -> Self {
        Self {
            builder_slug: r.builder_slug,
            name: r.name,
            city: r.city,
            locality: r.locality,
            status: r.status,
            price_min: r.price_min,
            price_max: r.price_max,
            possession_date: r.possession_date,
            amenities: r.amenities,
            description: r.description,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    pub builder: Option<String>,
    pub city: Option<String>,
    pub status: Option<ProjectStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ProjectListQuery {
    pub fn into_parts(self) -> (ProjectQuery, PageRequest) {
        (
            ProjectQuery {
                builder_slug: self.builder,
                city: self.city,
                status: self.status,
            },
            page_request(self.page, self.per_page),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: ProjectId,
    pub builder_id: BuilderId,
    pub name: String,
    pub slug: String,
    pub city: String,
    pub locality: String,
    pub status: ProjectStatus,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub possession_date: Option<NaiveDate>,
    pub amenities: Vec<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            builder_id: p.builder_id,
            name: p.name,
            slug: p.slug,
            city: p.city,
            locality: p.locality,
            status: p.status,
            price_min: p.price_min,
            price_max: p.price_max,
            possession_date: p.possession_date,
            amenities: p.amenities,
            description: p.description,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub builder: BuilderResponse,
    pub listing_count: u64,
}

impl From<ProjectDetail> for ProjectDetailResponse {
    fn from(d: ProjectDetail) -> Self {
        Self {
            project: d.project.into(),
            builder: d.builder.into(),
            listing_count: d.listing_count,
        }
    }
}

// ============================================================================
// Properties
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDetailsRequest {
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub area_sqft: i64,
    pub bedrooms: Option<i16>,
    pub bathrooms: Option<i16>,
}

impl From<ListingDetailsRequest> for ListingDetailsInput {
    fn from(r: ListingDetailsRequest) -> Self {
        Self {
            title: r.title,
            description: r.description,
            price: r.price,
            area_sqft: r.area_sqft,
            bedrooms: r.bedrooms,
            bathrooms: r.bathrooms,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    #[serde(flatten)]
    pub details: ListingDetailsRequest,
    pub listing_type: ListingType,
    pub property_type: PropertyType,
    pub city: String,
    pub locality: String,
    pub project_slug: Option<String>,
    pub agent_id: Option<AgentId>,
}

impl From<CreatePropertyRequest> for CreateListingInput {
    fn from(r: CreatePropertyRequest) -> Self {
        Self {
            details: r.details.into(),
            listing_type: r.listing_type,
            property_type: r.property_type,
            city: r.city,
            locality: r.locality,
            project_slug: r.project_slug,
            agent_id: r.agent_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub status: PropertyStatus,
}

/// Query strings arrive as text; enums and numbers parse per field
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySearchQuery {
    pub city: Option<String>,
    pub locality: Option<String>,
    pub listing_type: Option<ListingType>,
    pub property_type: Option<PropertyType>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_bedrooms: Option<i16>,
    pub project: Option<String>,
    #[serde(default)]
    pub sort: PropertySort,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PropertySearchQuery {
    pub fn into_parts(self) -> (SearchInput, PageRequest) {
        (
            SearchInput {
                city: self.city,
                locality: self.locality,
                listing_type: self.listing_type,
                property_type: self.property_type,
                min_price: self.min_price,
                max_price: self.max_price,
                min_bedrooms: self.min_bedrooms,
                project_slug: self.project,
                sort: self.sort,
            },
            page_request(self.page, self.per_page),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    pub id: PropertyId,
    pub project_id: Option<ProjectId>,
    pub agent_id: Option<AgentId>,
    pub title: String,
    pub description: String,
    pub listing_type: ListingType,
    pub property_type: PropertyType,
    pub city: String,
    pub locality: String,
    pub price: i64,
    pub area_sqft: i64,
    pub bedrooms: Option<i16>,
    pub bathrooms: Option<i16>,
    pub status: PropertyStatus,
    /// The viewer owns this listing
    pub mine: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyResponse {
    pub fn new(p: Property, viewer: Option<Uuid>) -> Self {
        Self {
            mine: viewer == Some(p.owner_id),
            id: p.id,
            project_id: p.project_id,
            agent_id: p.agent_id,
            title: p.title,
            description: p.description,
            listing_type: p.listing_type,
            property_type: p.property_type,
            city: p.city,
            locality: p.locality,
            price: p.price,
            area_sqft: p.area_sqft,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            status: p.status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ============================================================================
// Agents
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub display_name: String,
    pub agency: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub city: String,
    pub license_number: Option<String>,
    #[serde(default)]
    pub years_experience: i16,
}

impl From<AgentRequest> for AgentInput {
    fn from(r: AgentRequest) -> Self {
        Self {
            display_name: r.display_name,
            agency: r.agency,
            phone: r.phone,
            email: r.email,
            city: r.city,
            license_number: r.license_number,
            years_experience: r.years_experience,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentListQuery {
    pub city: Option<String>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl AgentListQuery {
    pub fn into_parts(self) -> (AgentFilter, PageRequest) {
        (
            AgentFilter {
                city: self.city,
                q: self.q,
            },
            page_request(self.page, self.per_page),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub id: AgentId,
    pub display_name: String,
    pub agency: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub city: String,
    pub license_number: Option<String>,
    pub years_experience: i16,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AgentProfile> for AgentResponse {
    fn from(a: AgentProfile) -> Self {
        Self {
            id: a.id,
            display_name: a.display_name,
            agency: a.agency,
            phone: a.phone,
            email: a.email,
            city: a.city,
            license_number: a.license_number,
            years_experience: a.years_experience,
            verified: a.verified,
            created_at: a.created_at,
        }
    }
}

// ============================================================================
// Enquiries
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct EnquiryRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: String,
}

impl From<EnquiryRequest> for EnquiryInput {
    fn from(r: EnquiryRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            phone: r.phone,
            message: r.message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryResponse {
    pub id: EnquiryId,
    pub property_id: PropertyId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: String,
    /// Sent while signed in
    pub registered: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Enquiry> for EnquiryResponse {
    fn from(e: Enquiry) -> Self {
        Self {
            id: e.id,
            property_id: e.property_id,
            name: e.name,
            email: e.email,
            phone: e.phone,
            message: e.message,
            registered: e.sender_id.is_some(),
            created_at: e.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquiryReceipt {
    pub id: EnquiryId,
    pub created_at: DateTime<Utc>,
}
