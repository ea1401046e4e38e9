//! Post Use Cases

use std::sync::Arc;

use kernel::actor::CurrentUser;
use kernel::error::app_error::AppError;
use kernel::id::PostId;
use kernel::page::{Page, PageRequest};

use crate::application::categories::resolve_scope;
use crate::application::config::ForumConfig;
use crate::domain::entities::{Category, Post, Reply};
use crate::domain::repository::{
    CategoryRepository, PostRepository, ReactionRepository, ReplyRepository,
};
use crate::domain::services::{PostSort, PostSummary, ReactionTally};
use crate::domain::value_objects::{PostBody, PostTitle};
use crate::error::{ForumError, ForumResult};

// ============================================================================
// Create
// ============================================================================

#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub category_slug: String,
    pub title: String,
    pub body: String,
}

pub struct CreatePostUseCase<C, P>
where
    C: CategoryRepository,
    P: PostRepository,
{
    category_repo: Arc<C>,
    post_repo: Arc<P>,
}

impl<C, P> CreatePostUseCase<C, P>
where
    C: CategoryRepository,
    P: PostRepository,
{
    pub fn new(category_repo: Arc<C>, post_repo: Arc<P>) -> Self {
        Self {
            category_repo,
            post_repo,
        }
    }

    pub async fn execute(&self, actor: &CurrentUser, input: CreatePostInput) -> ForumResult<Post> {
        actor.require_verified()?;
        let title = PostTitle::new(&input.title)?;
        let body = PostBody::new(&input.body)?;

        let category = self
            .category_repo
            .find_by_slug(input.category_slug.trim())
            .await?
            .ok_or(ForumError::CategoryNotFound)?;

        let post = Post::new(category.id, actor.user_id, title, body);
        self.post_repo.create(&post).await?;

        tracing::info!(
            post_id = %post.id,
            category = %category.slug,
            author = %actor.public_id,
            "Forum post created"
        );

        Ok(post)
    }
}

// ============================================================================
// List / Detail
// ============================================================================

pub struct ListPostsOutput {
    pub category: Category,
    pub posts: Page<PostSummary>,
}

pub struct ListPostsUseCase<C, P>
where
    C: CategoryRepository,
    P: PostRepository,
{
    category_repo: Arc<C>,
    post_repo: Arc<P>,
}

impl<C, P> ListPostsUseCase<C, P>
where
    C: CategoryRepository,
    P: PostRepository,
{
    pub fn new(category_repo: Arc<C>, post_repo: Arc<P>) -> Self {
        Self {
            category_repo,
            post_repo,
        }
    }

    /// A city lists its own posts and those of its property types
    pub async fn execute(
        &self,
        category_slug: &str,
        sort: PostSort,
        page: PageRequest,
    ) -> ForumResult<ListPostsOutput> {
        let (category, children) = resolve_scope(self.category_repo.as_ref(), category_slug).await?;

        let mut ids = Vec::with_capacity(children.len() + 1);
        ids.push(category.id);
        ids.extend(children.iter().map(|c| c.id));

        let posts = self
            .post_repo
            .list_summaries(&ids, sort, page.normalized())
            .await?;

        Ok(ListPostsOutput { category, posts })
    }
}

#[derive(Debug, Clone)]
pub struct ReplyView {
    pub reply: Reply,
    pub tally: ReactionTally,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub summary: PostSummary,
    pub replies: Vec<ReplyView>,
}

pub struct GetPostUseCase<P, R, X>
where
    P: PostRepository,
    R: ReplyRepository,
    X: ReactionRepository,
{
    post_repo: Arc<P>,
    reply_repo: Arc<R>,
    reaction_repo: Arc<X>,
    config: Arc<ForumConfig>,
}

impl<P, R, X> GetPostUseCase<P, R, X>
where
    P: PostRepository,
    R: ReplyRepository,
    X: ReactionRepository,
{
    pub fn new(
        post_repo: Arc<P>,
        reply_repo: Arc<R>,
        reaction_repo: Arc<X>,
        config: Arc<ForumConfig>,
    ) -> Self {
        Self {
            post_repo,
            reply_repo,
            reaction_repo,
            config,
        }
    }

    pub async fn execute(&self, id: PostId) -> ForumResult<PostDetail> {
        let summary = self
            .post_repo
            .summary(id)
            .await?
            .ok_or(ForumError::PostNotFound)?;

        let replies = self
            .reply_repo
            .list_for_post(id, self.config.max_replies_in_detail)
            .await?;
        let mut tallies = ReactionTally::from_counts(self.reaction_repo.reply_counts(id).await?);

        let replies = replies
            .into_iter()
            .map(|reply| ReplyView {
                tally: tallies.remove(&reply.id).unwrap_or_default(),
                reply,
            })
            .collect();

        Ok(PostDetail { summary, replies })
    }
}

// ============================================================================
// Moderation
// ============================================================================

pub struct ManagePostUseCase<P>
where
    P: PostRepository,
{
    post_repo: Arc<P>,
}

impl<P> ManagePostUseCase<P>
where
    P: PostRepository,
{
    pub fn new(post_repo: Arc<P>) -> Self {
        Self { post_repo }
    }

    /// Author or moderator+
    pub async fn delete(&self, actor: &CurrentUser, id: PostId) -> ForumResult<()> {
        let post = self
            .post_repo
            .find_by_id(id)
            .await?
            .ok_or(ForumError::PostNotFound)?;

        if !actor.can_manage(&post.author_id) {
            return Err(AppError::forbidden("Only the author or a moderator can delete this post")
                .with_code("NOT_POST_AUTHOR")
                .into());
        }

        self.post_repo.delete(id).await?;
        tracing::info!(post_id = %id, by = %actor.public_id, "Forum post deleted");
        Ok(())
    }

    pub async fn set_locked(&self, actor: &CurrentUser, id: PostId, locked: bool) -> ForumResult<Post> {
        actor.require_moderator()?;

        let mut post = self
            .post_repo
            .find_by_id(id)
            .await?
            .ok_or(ForumError::PostNotFound)?;

        if post.locked != locked {
            post.set_locked(locked);
            self.post_repo.update(&post).await?;
            tracing::info!(post_id = %id, locked, by = %actor.public_id, "Forum post lock changed");
        }

        Ok(post)
    }
}
