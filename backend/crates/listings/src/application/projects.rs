//! Project Use Cases

use std::sync::Arc;

use chrono::NaiveDate;
use kernel::actor::CurrentUser;
use kernel::error::app_error::AppError;
use kernel::page::{Page, PageRequest};

use crate::application::builders::ensure_builder_owner;
use crate::application::config::ListingsConfig;
use crate::domain::entities::{Builder, Project, ProjectDraft, ProjectStatus};
use crate::domain::repository::{BuilderRepository, ProjectRepository};
use crate::domain::services::{ProjectFilter, normalize_amenities, unique_slug};
use crate::domain::value_objects::{Description, Place, PriceRange, ProjectName};
use crate::error::{ListingsError, ListingsResult};

#[derive(Debug, Clone)]
pub struct CreateProjectInput {
    pub builder_slug: String,
    pub name: String,
    pub city: String,
    pub locality: String,
    pub status: ProjectStatus,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub possession_date: Option<NaiveDate>,
    pub amenities: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
    pub builder_slug: Option<String>,
    pub city: Option<String>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone)]
pub struct ProjectDetail {
    pub project: Project,
    pub builder: Builder,
    pub listing_count: u64,
}

pub struct ProjectUseCase<B, P>
where
    B: BuilderRepository,
    P: ProjectRepository,
{
    builder_repo: Arc<B>,
    project_repo: Arc<P>,
    config: Arc<ListingsConfig>,
}

impl<B, P> ProjectUseCase<B, P>
where
    B: BuilderRepository,
    P: ProjectRepository,
{
    pub fn new(builder_repo: Arc<B>, project_repo: Arc<P>, config: Arc<ListingsConfig>) -> Self {
        Self {
            builder_repo,
            project_repo,
            config,
        }
    }

    pub async fn create(&self, actor: &CurrentUser, input: CreateProjectInput) -> ListingsResult<Project> {
        actor.require_verified()?;
        let builder = self
            .builder_repo
            .find_by_slug(input.builder_slug.trim())
            .await?
            .ok_or(ListingsError::BuilderNotFound)?;
        ensure_builder_owner(actor, &builder)?;

        let draft = ProjectDraft {
            name: ProjectName::new(&input.name)?,
            city: Place::new(&input.city, "city")?,
            locality: Place::new(&input.locality, "locality")?,
            status: input.status,
            price: PriceRange::new(input.price_min, input.price_max)?,
            possession_date: input.possession_date,
            amenities: normalize_amenities(&input.amenities, self.config.max_amenities)?,
            description: Description::new(input.description.as_deref().unwrap_or_default())?,
        };

        let name_slug = draft.name.slug();
        if name_slug.is_empty() {
            return Err(AppError::bad_request("Project name has no usable characters")
                .with_code("INVALID_PROJECT_NAME")
                .into());
        }
        // Prefixed with the builder slug
        let base = format!("{}-{name_slug}", builder.slug);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let taken = self.project_repo.slugs_like(&base).await?;
            let project = Project::new(builder.id, unique_slug(&base, &taken), draft.clone());

            match self.project_repo.create(&project).await {
                Ok(()) => {
                    tracing::info!(
                        project_id = %project.id,
                        slug = %project.slug,
                        builder = %builder.slug,
                        by = %actor.public_id,
                        "Project created"
                    );
                    return Ok(project);
                }
                Err(ListingsError::SlugTaken(slug)) if attempt < self.config.slug_attempts => {
                    tracing::debug!(%slug, attempt, "Project slug taken, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn get(&self, slug: &str) -> ListingsResult<ProjectDetail> {
        let project = self
            .project_repo
            .find_by_slug(slug)
            .await?
            .ok_or(ListingsError::ProjectNotFound)?;
        let builder = self
            .builder_repo
            .find_by_id(project.builder_id)
            .await?
            .ok_or(ListingsError::BuilderNotFound)?;
        let listing_count = self.project_repo.listing_count(project.id).await?;

        Ok(ProjectDetail {
            project,
            builder,
            listing_count,
        })
    }

    pub async fn list(&self, query: ProjectQuery, page: PageRequest) -> ListingsResult<Page<Project>> {
        let builder_id = match query.builder_slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => Some(
                self.builder_repo
                    .find_by_slug(slug)
                    .await?
                    .ok_or(ListingsError::BuilderNotFound)?
                    .id,
            ),
            _ => None,
        };

        let filter = ProjectFilter {
            builder_id,
            city: query.city,
            status: query.status,
        };
        self.project_repo.list(&filter, page.normalized()).await
    }
}
