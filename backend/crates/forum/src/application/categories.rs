//! Category Use Cases

use std::sync::Arc;

use kernel::actor::CurrentUser;

use crate::domain::entities::{Category, CategoryKind};
use crate::domain::repository::CategoryRepository;
use crate::domain::services::{CategoryNode, build_tree};
use crate::domain::value_objects::CategoryName;
use crate::error::{ForumError, ForumResult};

#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    pub name: String,
    pub kind: CategoryKind,
    /// Required for property types
    pub parent_slug: Option<String>,
    pub position: i32,
}

pub struct CreateCategoryUseCase<C>
where
    C: CategoryRepository,
{
    category_repo: Arc<C>,
}

impl<C> CreateCategoryUseCase<C>
where
    C: CategoryRepository,
{
    pub fn new(category_repo: Arc<C>) -> Self {
        Self { category_repo }
    }

    pub async fn execute(
        &self,
        actor: &CurrentUser,
        input: CreateCategoryInput,
    ) -> ForumResult<Category> {
        actor.require_admin()?;
        let name = CategoryName::new(&input.name)?;

        let parent = match input.parent_slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => Some(
                self.category_repo
                    .find_by_slug(slug)
                    .await?
                    .ok_or(ForumError::CategoryNotFound)?,
            ),
            _ => None,
        };

        let category = Category::new(name, input.kind, parent.as_ref(), input.position)?;
        self.category_repo.create(&category).await?;

        tracing::info!(
            slug = %category.slug,
            kind = %category.kind,
            by = %actor.public_id,
            "Forum category created"
        );

        Ok(category)
    }
}

pub struct ListCategoriesUseCase<C>
where
    C: CategoryRepository,
{
    category_repo: Arc<C>,
}

impl<C> ListCategoriesUseCase<C>
where
    C: CategoryRepository,
{
    pub fn new(category_repo: Arc<C>) -> Self {
        Self { category_repo }
    }

    pub async fn execute(&self) -> ForumResult<Vec<CategoryNode>> {
        Ok(build_tree(self.category_repo.list_all().await?))
    }
}

/// The category plus, for a city, its property-type children
pub(crate) async fn resolve_scope<C>(repo: &C, slug: &str) -> ForumResult<(Category, Vec<Category>)>
where
    C: CategoryRepository,
{
    let category = repo
        .find_by_slug(slug)
        .await?
        .ok_or(ForumError::CategoryNotFound)?;

    let children = match category.kind {
        CategoryKind::City => repo.list_children(category.id).await?,
        CategoryKind::PropertyType => Vec::new(),
    };

    Ok((category, children))
}
