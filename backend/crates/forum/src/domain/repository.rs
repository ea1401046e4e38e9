//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::{CategoryId, PostId, ReplyId};
use kernel::page::{Page, PageRequest};
use uuid::Uuid;

use crate::domain::entities::{Category, Post, Reaction, ReactionKind, ReactionTarget, Reply};
use crate::domain::services::{PostSort, PostSummary, ReactionTally};
use crate::error::ForumResult;

#[trait_variant::make(CategoryRepository: Send)]
pub trait LocalCategoryRepository {
    /// Fails with `CategoryExists` on a slug clash
    async fn create(&self, category: &Category) -> ForumResult<()>;

    async fn find_by_slug(&self, slug: &str) -> ForumResult<Option<Category>>;

    async fn list_all(&self) -> ForumResult<Vec<Category>>;

    async fn list_children(&self, parent_id: CategoryId) -> ForumResult<Vec<Category>>;
}

#[trait_variant::make(PostRepository: Send)]
pub trait LocalPostRepository {
    async fn create(&self, post: &Post) -> ForumResult<()>;

    async fn find_by_id(&self, id: PostId) -> ForumResult<Option<Post>>;

    /// Persist lock state
    async fn update(&self, post: &Post) -> ForumResult<()>;

    /// Removes replies and reactions too
    async fn delete(&self, id: PostId) -> ForumResult<()>;

    /// Aggregated view of one post
    async fn summary(&self, id: PostId) -> ForumResult<Option<PostSummary>>;

    /// Posts filed under any of `category_ids`
    async fn list_summaries(
        &self,
        category_ids: &[CategoryId],
        sort: PostSort,
        page: PageRequest,
    ) -> ForumResult<Page<PostSummary>>;
}

#[trait_variant::make(ReplyRepository: Send)]
pub trait LocalReplyRepository {
    async fn create(&self, reply: &Reply) -> ForumResult<()>;

    async fn find_by_id(&self, id: ReplyId) -> ForumResult<Option<Reply>>;

    /// Removes its reactions too
    async fn delete(&self, id: ReplyId) -> ForumResult<()>;

    /// Oldest first, at most `limit`
    async fn list_for_post(&self, post_id: PostId, limit: i64) -> ForumResult<Vec<Reply>>;
}

#[trait_variant::make(ReactionRepository: Send)]
pub trait LocalReactionRepository {
    async fn find(&self, target: ReactionTarget, user_id: Uuid) -> ForumResult<Option<Reaction>>;

    /// Insert or change the user's reaction on the target
    async fn upsert(&self, reaction: &Reaction) -> ForumResult<()>;

    async fn delete(&self, target: ReactionTarget, user_id: Uuid) -> ForumResult<()>;

    async fn tally(&self, target: ReactionTarget) -> ForumResult<ReactionTally>;

    /// `(reply, kind, count)` for every reply of the post
    async fn reply_counts(&self, post_id: PostId) -> ForumResult<Vec<(ReplyId, ReactionKind, i64)>>;
}

/// Everything the forum use cases need from storage
pub trait ForumStore:
    CategoryRepository + PostRepository + ReplyRepository + ReactionRepository + Send + Sync + 'static
{
}

impl<T> ForumStore for T where
    T: CategoryRepository
        + PostRepository
        + ReplyRepository
        + ReactionRepository
        + Send
        + Sync
        + 'static
{
}
