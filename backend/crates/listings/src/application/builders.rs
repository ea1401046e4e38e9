//! Builder Directory Use Cases

use std::sync::Arc;

use chrono::{Datelike, Utc};
use kernel::actor::{CurrentUser, Role};
use kernel::error::app_error::AppError;
use kernel::page::{Page, PageRequest};

use crate::application::config::ListingsConfig;
use crate::domain::entities::{Builder, BuilderDraft};
use crate::domain::repository::BuilderRepository;
use crate::domain::services::{BuilderFilter, founded_year, unique_slug};
use crate::domain::value_objects::{BuilderName, Description, Place, optional, website};
use crate::error::{ListingsError, ListingsResult};

#[derive(Debug, Clone)]
pub struct BuilderInput {
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub city: String,
    pub established_year: Option<i16>,
}

impl BuilderInput {
    fn validate(&self) -> ListingsResult<BuilderDraft> {
        Ok(BuilderDraft {
            name: BuilderName::new(&self.name)?,
            description: Description::new(self.description.as_deref().unwrap_or_default())?,
            website: optional(self.website.as_deref(), website)?,
            city: Place::new(&self.city, "city")?,
            established_year: founded_year(self.established_year, Utc::now().year())?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BuilderDetail {
    pub builder: Builder,
    pub project_count: u64,
}

/// The builder's owner or an admin
pub(crate) fn ensure_builder_owner(actor: &CurrentUser, builder: &Builder) -> ListingsResult<()> {
    if actor.user_id == builder.owner_id || actor.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Only the builder's owner can do this")
            .with_code("NOT_BUILDER_OWNER")
            .into())
    }
}

pub struct BuilderUseCase<B>
where
    B: BuilderRepository,
{
    builder_repo: Arc<B>,
    config: Arc<ListingsConfig>,
}

impl<B> BuilderUseCase<B>
where
    B: BuilderRepository,
{
    pub fn new(builder_repo: Arc<B>, config: Arc<ListingsConfig>) -> Self {
        Self {
            builder_repo,
            config,
        }
    }

    pub async fn create(&self, actor: &CurrentUser, input: BuilderInput) -> ListingsResult<Builder> {
        actor.require_role(&[Role::Builder])?;
        actor.require_verified()?;
        let draft = input.validate()?;

        let base = draft.name.slug();
        if base.is_empty() {
            return Err(AppError::bad_request("Builder name has no usable characters")
                .with_code("INVALID_BUILDER_NAME")
                .into());
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let taken = self.builder_repo.slugs_like(&base).await?;
            let builder = Builder::new(actor.user_id, unique_slug(&base, &taken), draft.clone());

            match self.builder_repo.create(&builder).await {
                Ok(()) => {
                    tracing::info!(
                        builder_id = %builder.id,
                        slug = %builder.slug,
                        owner = %actor.public_id,
                        "Builder created"
                    );
                    return Ok(builder);
                }
                Err(ListingsError::SlugTaken(slug)) if attempt < self.config.slug_attempts => {
                    tracing::debug!(%slug, attempt, "Builder slug taken, retrying");
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn update(
        &self,
        actor: &CurrentUser,
        slug: &str,
        input: BuilderInput,
    ) -> ListingsResult<Builder> {
        let mut builder = self.find(slug).await?;
        ensure_builder_owner(actor, &builder)?;

        builder.apply(input.validate()?);
        self.builder_repo.update(&builder).await?;

        tracing::info!(builder_id = %builder.id, by = %actor.public_id, "Builder updated");
        Ok(builder)
    }

    pub async fn get(&self, slug: &str) -> ListingsResult<BuilderDetail> {
        let builder = self.find(slug).await?;
        let project_count = self.builder_repo.project_count(builder.id).await?;
        Ok(BuilderDetail {
            builder,
            project_count,
        })
    }

    pub async fn list(&self, filter: &BuilderFilter, page: PageRequest) -> ListingsResult<Page<Builder>> {
        self.builder_repo.list(filter, page.normalized()).await
    }

    pub async fn set_verified(
        &self,
        actor: &CurrentUser,
        slug: &str,
        verified: bool,
    ) -> ListingsResult<Builder> {
        actor.require_admin()?;
        let mut builder = self.find(slug).await?;

        if builder.verified != verified {
            builder.set_verified(verified);
            self.builder_repo.update(&builder).await?;
            tracing::info!(builder_id = %builder.id, verified, by = %actor.public_id, "Builder verification changed");
        }
        Ok(builder)
    }

    async fn find(&self, slug: &str) -> ListingsResult<Builder> {
        self.builder_repo
            .find_by_slug(slug)
            .await?
            .ok_or(ListingsError::BuilderNotFound)
    }
}
