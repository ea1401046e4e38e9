//! Domain Services
//!
//! Slug allocation, search filters and ordering. The PostgreSQL repository
//! expresses the same filters in SQL; these predicates define them.

use std::cmp::Ordering;
use std::collections::HashSet;

use kernel::error::app_error::{AppError, AppResult};
use kernel::id::{BuilderId, ProjectId};
use serde::Deserialize;

use crate::domain::entities::{
    AgentProfile, Builder, ListingType, Project, ProjectStatus, Property, PropertyStatus,
    PropertyType,
};

// ============================================================================
// Slugs
// ============================================================================

/// `base`, else the first of `base-2`, `base-3`, … not in `taken`
pub fn unique_slug(base: &str, taken: &[String]) -> String {
    let taken: HashSet<&str> = taken.iter().map(String::as_str).collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

/// Trimmed, non-empty, case-insensitively unique, first spelling wins
pub fn normalize_amenities(raw: &[String], max: usize) -> AppResult<Vec<String>> {
    let mut seen = HashSet::new();
    let mut amenities = Vec::new();
    for item in raw {
        let item = item.split_whitespace().collect::<Vec<_>>().join(" ");
        if item.is_empty() || !seen.insert(item.to_lowercase()) {
            continue;
        }
        if item.chars().count() > 60 {
            return Err(AppError::bad_request("Amenity names are limited to 60 characters")
                .with_code("INVALID_AMENITY"));
        }
        amenities.push(item);
    }
    if amenities.len() > max {
        return Err(AppError::bad_request(format!("At most {max} amenities are allowed"))
            .with_code("INVALID_AMENITY"));
    }
    Ok(amenities)
}

/// Founding year between 1800 and the current year
pub fn founded_year(year: Option<i16>, current_year: i32) -> AppResult<Option<i16>> {
    match year {
        Some(y) if i32::from(y) < 1800 || i32::from(y) > current_year => {
            Err(AppError::bad_request("establishedYear is out of range")
                .with_code("INVALID_ESTABLISHED_YEAR"))
        }
        other => Ok(other),
    }
}

fn same_place(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

// ============================================================================
// Directory filters
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct BuilderFilter {
    pub city: Option<String>,
    /// Substring of the name
    pub q: Option<String>,
    pub verified_only: bool,
}

impl BuilderFilter {
    pub fn matches(&self, builder: &Builder) -> bool {
        self.city.as_deref().is_none_or(|c| same_place(&builder.city, c))
            && self.q.as_deref().is_none_or(|q| contains_ci(&builder.name, q))
            && (!self.verified_only || builder.verified)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectFilter {
    pub builder_id: Option<BuilderId>,
    pub city: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        self.builder_id.is_none_or(|id| project.builder_id == id)
            && self.city.as_deref().is_none_or(|c| same_place(&project.city, c))
            && self.status.is_none_or(|s| project.status == s)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgentFilter {
    pub city: Option<String>,
    /// Substring of the display name or agency
    pub q: Option<String>,
}

impl AgentFilter {
    pub fn matches(&self, agent: &AgentProfile) -> bool {
        self.city.as_deref().is_none_or(|c| same_place(&agent.city, c))
            && self.q.as_deref().is_none_or(|q| {
                contains_ci(&agent.display_name, q)
                    || agent.agency.as_deref().is_some_and(|a| contains_ci(a, q))
            })
    }
}

// ============================================================================
// Property search
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    pub city: Option<String>,
    pub locality: Option<String>,
    pub listing_type: Option<ListingType>,
    pub property_type: Option<PropertyType>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_bedrooms: Option<i16>,
    pub project_id: Option<ProjectId>,
    /// Public search pins this to Active
    pub status: Option<PropertyStatus>,
}

impl PropertyFilter {
    pub fn validate(&self) -> AppResult<()> {
        if matches!((self.min_price, self.max_price), (Some(lo), Some(hi)) if lo > hi) {
            return Err(AppError::bad_request("minPrice must not exceed maxPrice")
                .with_code("INVALID_PRICE_FILTER"));
        }
        Ok(())
    }

    pub fn matches(&self, p: &Property) -> bool {
        self.city.as_deref().is_none_or(|c| same_place(&p.city, c))
            && self.locality.as_deref().is_none_or(|l| same_place(&p.locality, l))
            && self.listing_type.is_none_or(|t| p.listing_type == t)
            && self.property_type.is_none_or(|t| p.property_type == t)
            && self.min_price.is_none_or(|min| p.price >= min)
            && self.max_price.is_none_or(|max| p.price <= max)
            && self
                .min_bedrooms
                .is_none_or(|min| p.bedrooms.is_some_and(|b| b >= min))
            && self.project_id.is_none_or(|id| p.project_id == Some(id))
            && self.status.is_none_or(|s| p.status == s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertySort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl PropertySort {
    /// Price ties fall back to newest first
    pub fn compare(&self, a: &Property, b: &Property) -> Ordering {
        let newest = b.created_at.cmp(&a.created_at);
        match self {
            PropertySort::Newest => newest,
            PropertySort::PriceAsc => a.price.cmp(&b.price).then(newest),
            PropertySort::PriceDesc => b.price.cmp(&a.price).then(newest),
        }
    }

    pub fn order_by(&self) -> &'static str {
        match self {
            PropertySort::Newest => "created_at DESC",
            PropertySort::PriceAsc => "price ASC, created_at DESC",
            PropertySort::PriceDesc => "price DESC, created_at DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_slug() {
        assert_eq!(unique_slug("acme", &[]), "acme");
        let taken = vec!["acme".to_string(), "acme-2".to_string(), "acme-4".to_string()];
        assert_eq!(unique_slug("acme", &taken), "acme-3");
        assert_eq!(unique_slug("acme-homes", &taken), "acme-homes");
    }

    #[test]
    fn test_amenities() {
        let raw = vec![
            " Gym ".to_string(),
            "gym".to_string(),
            "".to_string(),
            "Swimming   pool".to_string(),
        ];
        assert_eq!(normalize_amenities(&raw, 10).unwrap(), ["Gym", "Swimming pool"]);
        assert!(normalize_amenities(&raw, 1).is_err());
        assert!(normalize_amenities(&["x".repeat(61)], 10).is_err());
    }

    #[test]
    fn test_founded_year() {
        assert_eq!(founded_year(Some(1995), 2026).unwrap(), Some(1995));
        assert!(founded_year(Some(2030), 2026).is_err());
        assert!(founded_year(Some(1700), 2026).is_err());
        assert_eq!(founded_year(None, 2026).unwrap(), None);
    }

    #[test]
    fn test_price_filter_validation() {
        let filter = PropertyFilter {
            min_price: Some(10),
            max_price: Some(5),
            ..Default::default()
        };
        assert_eq!(filter.validate().unwrap_err().code(), Some("INVALID_PRICE_FILTER"));
        assert!(PropertyFilter::default().validate().is_ok());
    }
}
