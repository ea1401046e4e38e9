//! PostgreSQL Repository Implementations

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::{AgentId, BuilderId, EnquiryId, ProjectId, PropertyId};
use kernel::page::{Page, PageRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{
    AgentProfile, Builder, Enquiry, ListingType, Project, ProjectStatus, Property, PropertyStatus,
    PropertyType,
};
use crate::domain::repository::{
    AgentRepository, BuilderRepository, EnquiryRepository, ProjectRepository, PropertyRepository,
};
use crate::domain::services::{AgentFilter, BuilderFilter, ProjectFilter, PropertyFilter, PropertySort};
use crate::error::{ListingsError, ListingsResult};

const BUILDER_COLUMNS: &str = r#"
    builder_id,
    owner_id,
    name,
    slug,
    description,
    website,
    city,
    established_year,
    verified,
    created_at,
    updated_at
"#;

const PROJECT_COLUMNS: &str = r#"
    project_id,
    builder_id,
    name,
    slug,
    city,
    locality,
    project_status,
    price_min,
    price_max,
    possession_date,
    amenities,
    description,
    created_at,
    updated_at
"#;

const PROPERTY_COLUMNS: &str = r#"
    property_id,
    owner_id,
    project_id,
    agent_id,
    title,
    description,
    listing_type,
    property_type,
    city,
    locality,
    price,
    area_sqft,
    bedrooms,
    bathrooms,
    listing_status,
    created_at,
    updated_at
"#;

const AGENT_COLUMNS: &str = r#"
    agent_id,
    user_id,
    display_name,
    agency,
    phone,
    email,
    city,
    license_number,
    years_experience,
    verified,
    created_at,
    updated_at
"#;

const ENQUIRY_COLUMNS: &str =
    "enquiry_id, property_id, sender_id, name, email, phone, message, created_at";

/// NULL parameters disable their condition
const PROPERTY_WHERE: &str = r#"
    ($1::text IS NULL OR lower(city) = lower(trim($1)))
    AND ($2::text IS NULL OR lower(locality) = lower(trim($2)))
    AND ($3::smallint IS NULL OR listing_type = $3)
    AND ($4::smallint IS NULL OR property_type = $4)
    AND ($5::bigint IS NULL OR price >= $5)
    AND ($6::bigint IS NULL OR price <= $6)
    AND ($7::smallint IS NULL OR bedrooms >= $7)
    AND ($8::uuid IS NULL OR project_id = $8)
    AND ($9::smallint IS NULL OR listing_status = $9)
"#;

const BUILDER_WHERE: &str = r#"
    ($1::text IS NULL OR lower(city) = lower(trim($1)))
    AND ($2::text IS NULL OR name ILIKE $2)
    AND (NOT $3 OR verified)
"#;

const PROJECT_WHERE: &str = r#"
    ($1::uuid IS NULL OR builder_id = $1)
    AND ($2::text IS NULL OR lower(city) = lower(trim($2)))
    AND ($3::smallint IS NULL OR project_status = $3)
"#;

const AGENT_WHERE: &str = r#"
    ($1::text IS NULL OR lower(city) = lower(trim($1)))
    AND ($2::text IS NULL OR display_name ILIKE $2 OR agency ILIKE $2)
"#;

/// Binds the nine `PROPERTY_WHERE` parameters in order
macro_rules! bind_property_filter {
    ($query:expr, $filter:expr) => {
        $query
            .bind($filter.city.as_deref())
            .bind($filter.locality.as_deref())
            .bind($filter.listing_type.map(|t| t.id()))
            .bind($filter.property_type.map(|t| t.id()))
            .bind($filter.min_price)
            .bind($filter.max_price)
            .bind($filter.min_bedrooms)
            .bind($filter.project_id.map(|id| id.into_uuid()))
            .bind($filter.status.map(|s| s.id()))
    };
}

/// PostgreSQL-backed listings repository
#[derive(Clone)]
pub struct PgListingsRepository {
    pool: PgPool,
}

impl PgListingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// `%q%` for ILIKE with the wildcards in `q` escaped
fn contains_pattern(q: Option<&str>) -> Option<String> {
    let q = q.map(str::trim).filter(|q| !q.is_empty())?;
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

fn total(count: i64) -> u64 {
    count.max(0) as u64
}

// ============================================================================
// Builders
// ============================================================================

impl BuilderRepository for PgListingsRepository {
    async fn create(&self, builder: &Builder) -> ListingsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO builders (
                builder_id,
                owner_id,
                name,
                slug,
                description,
                website,
                city,
                established_year,
                verified,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(builder.id.into_uuid())
        .bind(builder.owner_id)
        .bind(&builder.name)
        .bind(&builder.slug)
        .bind(&builder.description)
        .bind(&builder.website)
        .bind(&builder.city)
        .bind(builder.established_year)
        .bind(builder.verified)
        .bind(builder.created_at)
        .bind(builder.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ListingsError::SlugTaken(builder.slug.clone())
            } else {
                e.into()
            }
        })?;

        Ok(())
    }

    async fn update(&self, builder: &Builder) -> ListingsResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE builders
            SET name = $2,
                description = $3,
                website = $4,
                city = $5,
                established_year = $6,
                verified = $7,
                updated_at = $8
            WHERE builder_id = $1
            "#,
        )
        .bind(builder.id.into_uuid())
        .bind(&builder.name)
        .bind(&builder.description)
        .bind(&builder.website)
        .bind(&builder.city)
        .bind(builder.established_year)
        .bind(builder.verified)
        .bind(builder.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ListingsError::BuilderNotFound);
        }
        Ok(())
    }

    async fn find_by_id(&self, id: BuilderId) -> ListingsResult<Option<Builder>> {
        let sql = format!("SELECT {BUILDER_COLUMNS} FROM builders WHERE builder_id = $1");
        let row = sqlx::query_as::<_, BuilderRow>(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(BuilderRow::into_builder))
    }

    async fn find_by_slug(&self, slug: &str) -> ListingsResult<Option<Builder>> {
        let sql = format!("SELECT {BUILDER_COLUMNS} FROM builders WHERE slug = $1");
        let row = sqlx::query_as::<_, BuilderRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(BuilderRow::into_builder))
    }

    async fn slugs_like(&self, base: &str) -> ListingsResult<Vec<String>> {
        let slugs = sqlx::query_scalar::<_, String>(
            "SELECT slug FROM builders WHERE slug = $1 OR slug LIKE $1 || '-%'",
        )
        .bind(base)
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs)
    }

    async fn list(&self, filter: &BuilderFilter, page: PageRequest) -> ListingsResult<Page<Builder>> {
        let q = contains_pattern(filter.q.as_deref());

        let count_sql = format!("SELECT COUNT(*) FROM builders WHERE {BUILDER_WHERE}");
        let count = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.city.as_deref())
            .bind(q.as_deref())
            .bind(filter.verified_only)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {BUILDER_COLUMNS} FROM builders WHERE {BUILDER_WHERE} \
             ORDER BY name, created_at LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, BuilderRow>(&sql)
            .bind(filter.city.as_deref())
            .bind(q.as_deref())
            .bind(filter.verified_only)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.into_iter().map(BuilderRow::into_builder).collect();
        Ok(Page::new(items, page, total(count)))
    }

    async fn project_count(&self, id: BuilderId) -> ListingsResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM projects WHERE builder_id = $1")
            .bind(id.into_uuid())
            .fetch_one(&self.pool)
            .await?;

        Ok(total(count))
    }
}

// ============================================================================
// Projects
// ============================================================================

impl ProjectRepository for PgListingsRepository {
    async fn create(&self, project: &Project) -> ListingsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (
                project_id,
                builder_id,
                name,
                slug,
                city,
                locality,
                project_status,
                price_min,
                price_max,
                possession_date,
                amenities,
                description,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(project.id.into_uuid())
        .bind(project.builder_id.into_uuid())
        .bind(&project.name)
        .bind(&project.slug)
        .bind(&project.city)
        .bind(&project.locality)
        .bind(project.status.id())
        .bind(project.price_min)
        .bind(project.price_max)
        .bind(project.possession_date)
        .bind(&project.amenities)
        .bind(&project.description)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ListingsError::SlugTaken(project.slug.clone())
            } else {
                e.into()
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: ProjectId) -> ListingsResult<Option<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE project_id = $1");
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProjectRow::into_project).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> ListingsResult<Option<Project>> {
        let sql = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE slug = $1");
        let row = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProjectRow::into_project).transpose()
    }

    async fn slugs_like(&self, base: &str) -> ListingsResult<Vec<String>> {
        let slugs = sqlx::query_scalar::<_, String>(
            "SELECT slug FROM projects WHERE slug = $1 OR slug LIKE $1 || '-%'",
        )
        .bind(base)
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs)
    }

    async fn list(&self, filter: &ProjectFilter, page: PageRequest) -> ListingsResult<Page<Project>> {
        let builder_id = filter.builder_id.map(|id| id.into_uuid());
        let status = filter.status.map(|s| s.id());

        let count_sql = format!("SELECT COUNT(*) FROM projects WHERE {PROJECT_WHERE}");
        let count = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(builder_id)
            .bind(filter.city.as_deref())
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE {PROJECT_WHERE} \
             ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        );
        let rows = sqlx::query_as::<_, ProjectRow>(&sql)
            .bind(builder_id)
            .bind(filter.city.as_deref())
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(ProjectRow::into_project)
            .collect::<ListingsResult<Vec<_>>>()?;
        Ok(Page::new(items, page, total(count)))
    }

    async fn listing_count(&self, id: ProjectId) -> ListingsResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM properties WHERE project_id = $1 AND listing_status = $2",
        )
        .bind(id.into_uuid())
        .bind(PropertyStatus::Active.id())
        .fetch_one(&self.pool)
        .await?;

        Ok(total(count))
    }
}

// ============================================================================
// Properties
// ============================================================================

impl PropertyRepository for PgListingsRepository {
    async fn create(&self, property: &Property) -> ListingsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO properties (
                property_id,
                owner_id,
                project_id,
                agent_id,
                title,
                description,
                listing_type,
                property_type,
                city,
                locality,
                price,
                area_sqft,
                bedrooms,
                bathrooms,
                listing_status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(property.id.into_uuid())
        .bind(property.owner_id)
        .bind(property.project_id.map(|id| id.into_uuid()))
        .bind(property.agent_id.map(|id| id.into_uuid()))
        .bind(&property.title)
        .bind(&property.description)
        .bind(property.listing_type.id())
        .bind(property.property_type.id())
        .bind(&property.city)
        .bind(&property.locality)
        .bind(property.price)
        .bind(property.area_sqft)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.status.id())
        .bind(property.created_at)
        .bind(property.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: PropertyId) -> ListingsResult<Option<Property>> {
        let sql = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE property_id = $1");
        let row = sqlx::query_as::<_, PropertyRow>(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(PropertyRow::into_property).transpose()
    }

    async fn update(&self, property: &Property) -> ListingsResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE properties
            SET title = $2,
                description = $3,
                price = $4,
                area_sqft = $5,
                bedrooms = $6,
                bathrooms = $7,
                listing_status = $8,
                updated_at = $9
            WHERE property_id = $1
            "#,
        )
        .bind(property.id.into_uuid())
        .bind(&property.title)
        .bind(&property.description)
        .bind(property.price)
        .bind(property.area_sqft)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.status.id())
        .bind(property.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ListingsError::PropertyNotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: PropertyId) -> ListingsResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM enquiries WHERE property_id = $1")
            .bind(id.into_uuid())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM properties WHERE property_id = $1")
            .bind(id.into_uuid())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ListingsError::PropertyNotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    async fn search(
        &self,
        filter: &PropertyFilter,
        sort: PropertySort,
        page: PageRequest,
    ) -> ListingsResult<Page<Property>> {
        let count_sql = format!("SELECT COUNT(*) FROM properties WHERE {PROPERTY_WHERE}");
        let count = bind_property_filter!(sqlx::query_scalar::<_, i64>(&count_sql), filter)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE {PROPERTY_WHERE} \
             ORDER BY {} LIMIT $10 OFFSET $11",
            sort.order_by()
        );
        let rows = bind_property_filter!(sqlx::query_as::<_, PropertyRow>(&sql), filter)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(PropertyRow::into_property)
            .collect::<ListingsResult<Vec<_>>>()?;
        Ok(Page::new(items, page, total(count)))
    }
}

// ============================================================================
// Agents
// ============================================================================

impl AgentRepository for PgListingsRepository {
    async fn save(&self, agent: &AgentProfile) -> ListingsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO agent_profiles (
                agent_id,
                user_id,
                display_name,
                agency,
                phone,
                email,
                city,
                license_number,
                years_experience,
                verified,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (user_id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                agency = EXCLUDED.agency,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                city = EXCLUDED.city,
                license_number = EXCLUDED.license_number,
                years_experience = EXCLUDED.years_experience,
                verified = EXCLUDED.verified,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(agent.id.into_uuid())
        .bind(agent.user_id)
        .bind(&agent.display_name)
        .bind(&agent.agency)
        .bind(&agent.phone)
        .bind(&agent.email)
        .bind(&agent.city)
        .bind(&agent.license_number)
        .bind(agent.years_experience)
        .bind(agent.verified)
        .bind(agent.created_at)
        .bind(agent.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: AgentId) -> ListingsResult<Option<AgentProfile>> {
        let sql = format!("SELECT {AGENT_COLUMNS} FROM agent_profiles WHERE agent_id = $1");
        let row = sqlx::query_as::<_, AgentRow>(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AgentRow::into_agent))
    }

    async fn find_by_user(&self, user_id: Uuid) -> ListingsResult<Option<AgentProfile>> {
        let sql = format!("SELECT {AGENT_COLUMNS} FROM agent_profiles WHERE user_id = $1");
        let row = sqlx::query_as::<_, AgentRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AgentRow::into_agent))
    }

    async fn list(&self, filter: &AgentFilter, page: PageRequest) -> ListingsResult<Page<AgentProfile>> {
        let q = contains_pattern(filter.q.as_deref());

        let count_sql = format!("SELECT COUNT(*) FROM agent_profiles WHERE {AGENT_WHERE}");
        let count = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(filter.city.as_deref())
            .bind(q.as_deref())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {AGENT_COLUMNS} FROM agent_profiles WHERE {AGENT_WHERE} \
             ORDER BY verified DESC, display_name LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query_as::<_, AgentRow>(&sql)
            .bind(filter.city.as_deref())
            .bind(q.as_deref())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.into_iter().map(AgentRow::into_agent).collect();
        Ok(Page::new(items, page, total(count)))
    }
}

// ============================================================================
// Enquiries
// ============================================================================

impl EnquiryRepository for PgListingsRepository {
    async fn create(&self, enquiry: &Enquiry) -> ListingsResult<()> {
        sqlx::query(
            r#"
            INSERT INTO enquiries (
                enquiry_id,
                property_id,
                sender_id,
                name,
                email,
                phone,
                message,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(enquiry.id.into_uuid())
        .bind(enquiry.property_id.into_uuid())
        .bind(enquiry.sender_id)
        .bind(&enquiry.name)
        .bind(&enquiry.email)
        .bind(&enquiry.phone)
        .bind(&enquiry.message)
        .bind(enquiry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_property(
        &self,
        property_id: PropertyId,
        page: PageRequest,
    ) -> ListingsResult<Page<Enquiry>> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enquiries WHERE property_id = $1")
            .bind(property_id.into_uuid())
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {ENQUIRY_COLUMNS} FROM enquiries WHERE property_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, EnquiryRow>(&sql)
            .bind(property_id.into_uuid())
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows.into_iter().map(EnquiryRow::into_enquiry).collect();
        Ok(Page::new(items, page, total(count)))
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct BuilderRow {
    builder_id: Uuid,
    owner_id: Uuid,
    name: String,
    slug: String,
    description: String,
    website: Option<String>,
    city: String,
    established_year: Option<i16>,
    verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BuilderRow {
    fn into_builder(self) -> Builder {
        Builder {
            id: BuilderId::from_uuid(self.builder_id),
            owner_id: self.owner_id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            website: self.website,
            city: self.city,
            established_year: self.established_year,
            verified: self.verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    project_id: Uuid,
    builder_id: Uuid,
    name: String,
    slug: String,
    city: String,
    locality: String,
    project_status: i16,
    price_min: Option<i64>,
    price_max: Option<i64>,
    possession_date: Option<NaiveDate>,
    amenities: Vec<String>,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self) -> ListingsResult<Project> {
        let status = ProjectStatus::from_id(self.project_status).ok_or_else(|| {
            ListingsError::Internal(format!("Unknown project status {}", self.project_status))
        })?;

        Ok(Project {
            id: ProjectId::from_uuid(self.project_id),
            builder_id: BuilderId::from_uuid(self.builder_id),
            name: self.name,
            slug: self.slug,
            city: self.city,
            locality: self.locality,
            status,
            price_min: self.price_min,
            price_max: self.price_max,
            possession_date: self.possession_date,
            amenities: self.amenities,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PropertyRow {
    property_id: Uuid,
    owner_id: Uuid,
    project_id: Option<Uuid>,
    agent_id: Option<Uuid>,
    title: String,
    description: String,
    listing_type: i16,
    property_type: i16,
    city: String,
    locality: String,
    price: i64,
    area_sqft: i64,
    bedrooms: Option<i16>,
    bathrooms: Option<i16>,
    listing_status: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PropertyRow {
    fn into_property(self) -> ListingsResult<Property> {
        let unknown = |what: &str, id: i16| ListingsError::Internal(format!("Unknown {what} {id}"));
        let listing_type = ListingType::from_id(self.listing_type)
            .ok_or_else(|| unknown("listing type", self.listing_type))?;
        let property_type = PropertyType::from_id(self.property_type)
            .ok_or_else(|| unknown("property type", self.property_type))?;
        let status = PropertyStatus::from_id(self.listing_status)
            .ok_or_else(|| unknown("listing status", self.listing_status))?;

        Ok(Property {
            id: PropertyId::from_uuid(self.property_id),
            owner_id: self.owner_id,
            project_id: self.project_id.map(ProjectId::from_uuid),
            agent_id: self.agent_id.map(AgentId::from_uuid),
            title: self.title,
            description: self.description,
            listing_type,
            property_type,
            city: self.city,
            locality: self.locality,
            price: self.price,
            area_sqft: self.area_sqft,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AgentRow {
    agent_id: Uuid,
    user_id: Uuid,
    display_name: String,
    agency: Option<String>,
    phone: String,
    email: Option<String>,
    city: String,
    license_number: Option<String>,
    years_experience: i16,
    verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AgentRow {
    fn into_agent(self) -> AgentProfile {
        AgentProfile {
            id: AgentId::from_uuid(self.agent_id),
            user_id: self.user_id,
            display_name: self.display_name,
            agency: self.agency,
            phone: self.phone,
            email: self.email,
            city: self.city,
            license_number: self.license_number,
            years_experience: self.years_experience,
            verified: self.verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EnquiryRow {
    enquiry_id: Uuid,
    property_id: Uuid,
    sender_id: Option<Uuid>,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    message: String,
    created_at: DateTime<Utc>,
}

impl EnquiryRow {
    fn into_enquiry(self) -> Enquiry {
        Enquiry {
            id: EnquiryId::from_uuid(self.enquiry_id),
            property_id: PropertyId::from_uuid(self.property_id),
            sender_id: self.sender_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            message: self.message,
            created_at: self.created_at,
        }
    }
}
