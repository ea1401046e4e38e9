//! API DTOs (Data Transfer Objects)
//!
//! Author UUIDs stay internal; responses carry a `mine` flag for the
//! signed-in viewer instead.

use chrono::{DateTime, Utc};
use kernel::id::{CategoryId, PostId, ReplyId};
use kernel::page::PageRequest;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{ReactOutput, ReplyView};
use crate::domain::entities::{Category, CategoryKind, Post, ReactionKind, Reply};
use crate::domain::services::{CategoryNode, PostSort, PostSummary, ReactionTally};

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    pub kind: CategoryKind,
    pub parent_slug: Option<String>,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub kind: CategoryKind,
    pub name: String,
    pub slug: String,
    pub position: i32,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            kind: c.kind,
            name: c.name,
            slug: c.slug,
            position: c.position,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNodeResponse {
    #[serde(flatten)]
    pub category: CategoryResponse,
    pub children: Vec<CategoryResponse>,
}

impl From<CategoryNode> for CategoryNodeResponse {
    fn from(node: CategoryNode) -> Self {
        Self {
            category: node.category.into(),
            children: node.children.into_iter().map(Into::into).collect(),
        }
    }
}

// ============================================================================
// Posts
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default)]
    pub sort: PostSort,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListPostsQuery {
    pub fn page_request(&self) -> PageRequest {
        let default = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(default.page),
            self.per_page.unwrap_or(default.per_page),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub category_slug: String,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: PostId,
    pub category_id: CategoryId,
    pub title: String,
    pub body: String,
    pub locked: bool,
    pub mine: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn new(post: Post, viewer: Option<Uuid>) -> Self {
        Self {
            mine: viewer == Some(post.author_id),
            id: post.id,
            category_id: post.category_id,
            title: post.title,
            body: post.body,
            locked: post.locked,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummaryResponse {
    #[serde(flatten)]
    pub post: PostResponse,
    pub reply_count: u64,
    pub likes: u64,
    pub dislikes: u64,
    pub score: i64,
    pub last_activity_at: DateTime<Utc>,
}

impl PostSummaryResponse {
    pub fn new(summary: PostSummary, viewer: Option<Uuid>) -> Self {
        Self {
            post: PostResponse::new(summary.post, viewer),
            reply_count: summary.reply_count,
            likes: summary.likes,
            dislikes: summary.dislikes,
            score: summary.score,
            last_activity_at: summary.last_activity_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub category: CategoryResponse,
    pub posts: kernel::page::Page<PostSummaryResponse>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub summary: PostSummaryResponse,
    pub replies: Vec<ReplyResponse>,
}

// ============================================================================
// Replies / Reactions
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReplyRequest {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyResponse {
    pub id: ReplyId,
    pub post_id: PostId,
    pub body: String,
    pub mine: bool,
    pub created_at: DateTime<Utc>,
    pub likes: u64,
    pub dislikes: u64,
}

impl ReplyResponse {
    pub fn new(reply: Reply, tally: ReactionTally, viewer: Option<Uuid>) -> Self {
        Self {
            mine: viewer == Some(reply.author_id),
            id: reply.id,
            post_id: reply.post_id,
            body: reply.body,
            created_at: reply.created_at,
            likes: tally.likes,
            dislikes: tally.dislikes,
        }
    }

    pub fn from_view(view: ReplyView, viewer: Option<Uuid>) -> Self {
        Self::new(view.reply, view.tally, viewer)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReactRequest {
    pub kind: ReactionKind,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactResponse {
    /// `null` when the reaction was taken back
    pub reaction: Option<ReactionKind>,
    pub likes: u64,
    pub dislikes: u64,
    pub score: i64,
}

impl From<ReactOutput> for ReactResponse {
    fn from(o: ReactOutput) -> Self {
        Self {
            reaction: o.current,
            likes: o.tally.likes,
            dislikes: o.tally.dislikes,
            score: o.tally.score(),
        }
    }
}
