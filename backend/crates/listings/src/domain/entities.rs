//! Domain Entities

use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Display;
use kernel::id::{AgentId, BuilderId, EnquiryId, ProjectId, PropertyId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{
    AgentName, BuilderName, ContactName, Description, EnquiryMessage, ListingTitle, Place,
    PriceRange, ProjectName,
};
use crate::error::{ListingsError, ListingsResult};

// ============================================================================
// Builder
// ============================================================================

/// Validated builder fields
#[derive(Debug, Clone)]
pub struct BuilderDraft {
    pub name: BuilderName,
    pub description: Description,
    pub website: Option<String>,
    pub city: Place,
    pub established_year: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Builder {
    pub id: BuilderId,
    pub owner_id: Uuid,
    pub name: String,
    /// Fixed at creation
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub city: String,
    pub established_year: Option<i16>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Builder {
    pub fn new(owner_id: Uuid, slug: String, draft: BuilderDraft) -> Self {
        let now = Utc::now();
        Self {
            id: BuilderId::new(),
            owner_id,
            name: draft.name.into_inner(),
            slug,
            description: draft.description.into_inner(),
            website: draft.website,
            city: draft.city.into_inner(),
            established_year: draft.established_year,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Renames keep the slug so existing links stay valid
    pub fn apply(&mut self, draft: BuilderDraft) {
        self.name = draft.name.into_inner();
        self.description = draft.description.into_inner();
        self.website = draft.website;
        self.city = draft.city.into_inner();
        self.established_year = draft.established_year;
        self.updated_at = Utc::now();
    }

    pub fn set_verified(&mut self, verified: bool) {
        self.verified = verified;
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Project
// ============================================================================

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum ProjectStatus {
    #[display("upcoming")]
    Upcoming = 0,
    #[display("under_construction")]
    UnderConstruction = 1,
    #[display("ready_to_move")]
    ReadyToMove = 2,
}

impl ProjectStatus {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Upcoming),
            1 => Some(Self::UnderConstruction),
            2 => Some(Self::ReadyToMove),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectDraft {
    pub name: ProjectName,
    pub city: Place,
    pub locality: Place,
    pub status: ProjectStatus,
    pub price: PriceRange,
    pub possession_date: Option<NaiveDate>,
    pub amenities: Vec<String>,
    pub description: Description,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
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
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(builder_id: BuilderId, slug: String, draft: ProjectDraft) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            builder_id,
            name: draft.name.into_inner(),
            slug,
            city: draft.city.into_inner(),
            locality: draft.locality.into_inner(),
            status: draft.status,
            price_min: draft.price.min,
            price_max: draft.price.max,
            possession_date: draft.possession_date,
            amenities: draft.amenities,
            description: draft.description.into_inner(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ============================================================================
// Property listing
// ============================================================================

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum ListingType {
    #[display("sale")]
    Sale = 0,
    #[display("rent")]
    Rent = 1,
}

impl ListingType {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Sale),
            1 => Some(Self::Rent),
            _ => None,
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum PropertyType {
    #[display("apartment")]
    Apartment = 0,
    #[display("villa")]
    Villa = 1,
    #[display("independent_house")]
    IndependentHouse = 2,
    #[display("plot")]
    Plot = 3,
    #[display("commercial")]
    Commercial = 4,
}

impl PropertyType {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Apartment),
            1 => Some(Self::Villa),
            2 => Some(Self::IndependentHouse),
            3 => Some(Self::Plot),
            4 => Some(Self::Commercial),
            _ => None,
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum PropertyStatus {
    #[display("active")]
    Active = 0,
    #[display("sold")]
    Sold = 1,
    #[display("rented")]
    Rented = 2,
    #[display("inactive")]
    Inactive = 3,
}

impl PropertyStatus {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Active),
            1 => Some(Self::Sold),
            2 => Some(Self::Rented),
            3 => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Sold only for sale listings, Rented only for rentals
    pub fn allowed_for(&self, listing_type: ListingType) -> bool {
        match self {
            PropertyStatus::Sold => listing_type == ListingType::Sale,
            PropertyStatus::Rented => listing_type == ListingType::Rent,
            PropertyStatus::Active | PropertyStatus::Inactive => true,
        }
    }
}

/// Fields an owner may edit after publishing
#[derive(Debug, Clone)]
pub struct ListingDetails {
    pub title: ListingTitle,
    pub description: Description,
    pub price: i64,
    pub area_sqft: i64,
    pub bedrooms: Option<i16>,
    pub bathrooms: Option<i16>,
}

#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub details: ListingDetails,
    pub listing_type: ListingType,
    pub property_type: PropertyType,
    pub city: Place,
    pub locality: Place,
    pub project_id: Option<ProjectId>,
    pub agent_id: Option<AgentId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub id: PropertyId,
    pub owner_id: Uuid,
    pub project_id: Option<ProjectId>,
    pub agent_id: Option<AgentId>,
    pub title: String,
    pub description: String,
    pub listing_type: ListingType,
    pub property_type: PropertyType,
    pub city: String,
    pub locality: String,
    /// Minor currency units
    pub price: i64,
    pub area_sqft: i64,
    pub bedrooms: Option<i16>,
    pub bathrooms: Option<i16>,
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn new(owner_id: Uuid, draft: ListingDraft) -> Self {
        let now = Utc::now();
        let d = draft.details;
        Self {
            id: PropertyId::new(),
            owner_id,
            project_id: draft.project_id,
            agent_id: draft.agent_id,
            title: d.title.into_inner(),
            description: d.description.into_inner(),
            listing_type: draft.listing_type,
            property_type: draft.property_type,
            city: draft.city.into_inner(),
            locality: draft.locality.into_inner(),
            price: d.price,
            area_sqft: d.area_sqft,
            bedrooms: d.bedrooms,
            bathrooms: d.bathrooms,
            status: PropertyStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PropertyStatus::Active
    }

    pub fn apply(&mut self, details: ListingDetails) {
        self.title = details.title.into_inner();
        self.description = details.description.into_inner();
        self.price = details.price;
        self.area_sqft = details.area_sqft;
        self.bedrooms = details.bedrooms;
        self.bathrooms = details.bathrooms;
        self.updated_at = Utc::now();
    }

    /// Returns whether anything changed
    pub fn set_status(&mut self, status: PropertyStatus) -> ListingsResult<bool> {
        if !status.allowed_for(self.listing_type) {
            return Err(ListingsError::InvalidStatus {
                listing_type: self.listing_type,
                status,
            });
        }
        if self.status == status {
            return Ok(false);
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(true)
    }
}

// ============================================================================
// Agent
// ============================================================================

#[derive(Debug, Clone)]
pub struct AgentDraft {
    pub display_name: AgentName,
    pub agency: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub city: Place,
    pub license_number: Option<String>,
    pub years_experience: i16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentProfile {
    pub id: AgentId,
    /// One profile per user
    pub user_id: Uuid,
    pub display_name: String,
    pub agency: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub city: String,
    pub license_number: Option<String>,
    pub years_experience: i16,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentProfile {
    pub fn new(user_id: Uuid, draft: AgentDraft) -> Self {
        let now = Utc::now();
        Self {
            id: AgentId::new(),
            user_id,
            display_name: draft.display_name.into_inner(),
            agency: draft.agency,
            phone: draft.phone,
            email: draft.email,
            city: draft.city.into_inner(),
            license_number: draft.license_number,
            years_experience: draft.years_experience,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// A new licence number needs verifying again
    pub fn apply(&mut self, draft: AgentDraft) {
        if draft.license_number != self.license_number {
            self.verified = false;
        }
        self.display_name = draft.display_name.into_inner();
        self.agency = draft.agency;
        self.phone = draft.phone;
        self.email = draft.email;
        self.city = draft.city.into_inner();
        self.license_number = draft.license_number;
        self.years_experience = draft.years_experience;
        self.updated_at = Utc::now();
    }

    pub fn set_verified(&mut self, verified: bool) {
        self.verified = verified;
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// Enquiry
// ============================================================================

#[derive(Debug, Clone)]
pub struct EnquiryDraft {
    pub name: ContactName,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: EnquiryMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enquiry {
    pub id: EnquiryId,
    pub property_id: PropertyId,
    /// Absent for anonymous visitors
    pub sender_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Enquiry {
    pub fn new(property_id: PropertyId, sender_id: Option<Uuid>, draft: EnquiryDraft) -> Self {
        Self {
            id: EnquiryId::new(),
            property_id,
            sender_id,
            name: draft.name.into_inner(),
            email: draft.email,
            phone: draft.phone,
            message: draft.message.into_inner(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(listing_type: ListingType) -> Property {
        Property::new(
            Uuid::new_v4(),
            ListingDraft {
                details: ListingDetails {
                    title: ListingTitle::new("3BHK with garden view").unwrap(),
                    description: Description::new("").unwrap(),
                    price: 12_500_000,
                    area_sqft: 1450,
                    bedrooms: Some(3),
                    bathrooms: Some(2),
                },
                listing_type,
                property_type: PropertyType::Apartment,
                city: Place::new("Pune", "city").unwrap(),
                locality: Place::new("Baner", "locality").unwrap(),
                project_id: None,
                agent_id: None,
            },
        )
    }

    #[test]
    fn test_status_follows_listing_type() {
        let mut sale = listing(ListingType::Sale);
        assert!(sale.is_active());
        assert!(matches!(
            sale.set_status(PropertyStatus::Rented),
            Err(ListingsError::InvalidStatus { .. })
        ));
        assert!(sale.set_status(PropertyStatus::Sold).unwrap());
        assert!(!sale.set_status(PropertyStatus::Sold).unwrap());

        let mut rent = listing(ListingType::Rent);
        assert!(rent.set_status(PropertyStatus::Sold).is_err());
        assert!(rent.set_status(PropertyStatus::Rented).unwrap());
        assert!(rent.set_status(PropertyStatus::Active).unwrap());
        assert!(rent.set_status(PropertyStatus::Inactive).unwrap());
    }

    #[test]
    fn test_agent_licence_change_resets_verification() {
        let draft = |licence: Option<&str>| AgentDraft {
            display_name: AgentName::new("Asha Patil").unwrap(),
            agency: None,
            phone: "+919876543210".to_string(),
            email: None,
            city: Place::new("Pune", "city").unwrap(),
            license_number: licence.map(str::to_string),
            years_experience: 6,
        };

        let mut agent = AgentProfile::new(Uuid::new_v4(), draft(Some("MH-RERA-1")));
        agent.set_verified(true);

        agent.apply(draft(Some("MH-RERA-1")));
        assert!(agent.verified);

        agent.apply(draft(Some("MH-RERA-2")));
        assert!(!agent.verified);
    }

    #[test]
    fn test_enum_ids_round_trip() {
        for status in [
            PropertyStatus::Active,
            PropertyStatus::Sold,
            PropertyStatus::Rented,
            PropertyStatus::Inactive,
        ] {
            assert_eq!(PropertyStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(PropertyType::from_id(9), None);
        assert_eq!(ProjectStatus::ReadyToMove.to_string(), "ready_to_move");
    }
}
