//! Use-case and router tests against an in-memory repository

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Duration;
use http_body_util::BodyExt;
use kernel::actor::{CurrentUser, Role};
use kernel::id::{CategoryId, PostId, ReplyId};
use kernel::page::{Page, PageRequest};
use tower::ServiceExt;
use uuid::Uuid;

use crate::application::*;
use crate::domain::entities::{
    Category, CategoryKind, Post, Reaction, ReactionKind, ReactionTarget, Reply,
};
use crate::domain::repository::{
    CategoryRepository, PostRepository, ReactionRepository, ReplyRepository,
};
use crate::domain::services::{PostSort, PostSummary, ReactionTally};
use crate::error::{ForumError, ForumResult};
use crate::presentation::handlers::ForumAppState;
use crate::presentation::router::forum_router_generic;

// ============================================================================
// Fake
// ============================================================================

#[derive(Default)]
struct MemoryForum {
    categories: Mutex<Vec<Category>>,
    posts: Mutex<Vec<Post>>,
    replies: Mutex<Vec<Reply>>,
    reactions: Mutex<Vec<Reaction>>,
}

impl MemoryForum {
    fn tally_of(&self, target: ReactionTarget) -> ReactionTally {
        let mut tally = ReactionTally::default();
        for r in self.reactions.lock().unwrap().iter().filter(|r| r.target == target) {
            tally.add(r.kind, 1);
        }
        tally
    }

    fn summarize(&self, post: Post) -> PostSummary {
        let replies = self.replies.lock().unwrap();
        let mine: Vec<_> = replies.iter().filter(|r| r.post_id == post.id).collect();
        let last = mine.iter().map(|r| r.created_at).max();
        let count = mine.len() as u64;
        drop(replies);

        let tally = self.tally_of(ReactionTarget::Post(post.id));
        PostSummary::aggregate(post, count, tally, last)
    }

    fn backdate_post(&self, id: PostId, by: Duration) {
        let mut posts = self.posts.lock().unwrap();
        let post = posts.iter_mut().find(|p| p.id == id).unwrap();
        post.created_at -= by;
    }

    fn reaction_count(&self) -> usize {
        self.reactions.lock().unwrap().len()
    }
}

impl CategoryRepository for MemoryForum {
    async fn create(&self, category: &Category) -> ForumResult<()> {
        let mut categories = self.categories.lock().unwrap();
        if categories.iter().any(|c| c.slug == category.slug) {
            return Err(ForumError::CategoryExists(category.slug.clone()));
        }
        categories.push(category.clone());
        Ok(())
    }

    async fn find_by_slug(&self, slug: &str) -> ForumResult<Option<Category>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list_all(&self) -> ForumResult<Vec<Category>> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn list_children(&self, parent_id: CategoryId) -> ForumResult<Vec<Category>> {
        Ok(self
            .categories
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }
}

impl PostRepository for MemoryForum {
    async fn create(&self, post: &Post) -> ForumResult<()> {
        self.posts.lock().unwrap().push(post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: PostId) -> ForumResult<Option<Post>> {
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn update(&self, post: &Post) -> ForumResult<()> {
        let mut posts = self.posts.lock().unwrap();
        let slot = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(ForumError::PostNotFound)?;
        *slot = post.clone();
        Ok(())
    }

    async fn delete(&self, id: PostId) -> ForumResult<()> {
        let reply_ids: Vec<ReplyId> = {
            let mut replies = self.replies.lock().unwrap();
            let ids = replies.iter().filter(|r| r.post_id == id).map(|r| r.id).collect();
            replies.retain(|r| r.post_id != id);
            ids
        };
        self.reactions.lock().unwrap().retain(|r| match r.target {
            ReactionTarget::Post(p) => p != id,
            ReactionTarget::Reply(reply) => !reply_ids.contains(&reply),
        });

        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Err(ForumError::PostNotFound);
        }
        Ok(())
    }

    async fn summary(&self, id: PostId) -> ForumResult<Option<PostSummary>> {
        let post = self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned();
        Ok(post.map(|p| self.summarize(p)))
    }

    async fn list_summaries(
        &self,
        category_ids: &[CategoryId],
        sort: PostSort,
        page: PageRequest,
    ) -> ForumResult<Page<PostSummary>> {
        let posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| category_ids.contains(&p.category_id))
            .cloned()
            .collect();
        let mut summaries: Vec<_> = posts.into_iter().map(|p| self.summarize(p)).collect();
        summaries.sort_by(|a, b| sort.compare(a, b));

        let total = summaries.len() as u64;
        let items = summaries
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(Page::new(items, page, total))
    }
}

impl ReplyRepository for MemoryForum {
    async fn create(&self, reply: &Reply) -> ForumResult<()> {
        self.replies.lock().unwrap().push(reply.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ReplyId) -> ForumResult<Option<Reply>> {
        Ok(self.replies.lock().unwrap().iter().find(|r| r.id == id).cloned())
    }

    async fn delete(&self, id: ReplyId) -> ForumResult<()> {
        self.reactions
            .lock()
            .unwrap()
            .retain(|r| r.target != ReactionTarget::Reply(id));
        self.replies.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn list_for_post(&self, post_id: PostId, limit: i64) -> ForumResult<Vec<Reply>> {
        let mut replies: Vec<_> = self
            .replies
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.post_id == post_id)
            .cloned()
            .collect();
        replies.sort_by_key(|r| r.created_at);
        replies.truncate(limit as usize);
        Ok(replies)
    }
}

impl ReactionRepository for MemoryForum {
    async fn find(&self, target: ReactionTarget, user_id: Uuid) -> ForumResult<Option<Reaction>> {
        Ok(self
            .reactions
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.target == target && r.user_id == user_id)
            .cloned())
    }

    async fn upsert(&self, reaction: &Reaction) -> ForumResult<()> {
        let mut reactions = self.reactions.lock().unwrap();
        reactions.retain(|r| !(r.target == reaction.target && r.user_id == reaction.user_id));
        reactions.push(reaction.clone());
        Ok(())
    }

    async fn delete(&self, target: ReactionTarget, user_id: Uuid) -> ForumResult<()> {
        self.reactions
            .lock()
            .unwrap()
            .retain(|r| !(r.target == target && r.user_id == user_id));
        Ok(())
    }

    async fn tally(&self, target: ReactionTarget) -> ForumResult<ReactionTally> {
        Ok(self.tally_of(target))
    }

    async fn reply_counts(&self, post_id: PostId) -> ForumResult<Vec<(ReplyId, ReactionKind, i64)>> {
        let reply_ids: Vec<ReplyId> = self
            .replies
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.post_id == post_id)
            .map(|r| r.id)
            .collect();

        // One row per reaction; from_counts folds duplicates
        Ok(self
            .reactions
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| match r.target {
                ReactionTarget::Reply(id) if reply_ids.contains(&id) => Some((id, r.kind, 1)),
                _ => None,
            })
            .collect())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn user(role: Role, verified: bool) -> CurrentUser {
    CurrentUser {
        user_id: Uuid::new_v4(),
        public_id: format!("user-{}", Uuid::new_v4().simple()),
        role,
        verified,
    }
}

struct Harness {
    repo: Arc<MemoryForum>,
    config: Arc<ForumConfig>,
    admin: CurrentUser,
}

impl Harness {
    fn new() -> Self {
        Self {
            repo: Arc::new(MemoryForum::default()),
            config: Arc::new(ForumConfig::default()),
            admin: user(Role::Admin, true),
        }
    }

    async fn category(&self, name: &str, kind: CategoryKind, parent: Option<&str>, position: i32) -> ForumResult<Category> {
        CreateCategoryUseCase::new(self.repo.clone())
            .execute(
                &self.admin,
                CreateCategoryInput {
                    name: name.to_string(),
                    kind,
                    parent_slug: parent.map(str::to_string),
                    position,
                },
            )
            .await
    }

    /// Pune → {Apartments, Villas}, Mumbai
    async fn seeded() -> Self {
        let h = Self::new();
        h.category("Pune", CategoryKind::City, None, 1).await.unwrap();
        h.category("Mumbai", CategoryKind::City, None, 0).await.unwrap();
        h.category("Villas", CategoryKind::PropertyType, Some("pune"), 1)
            .await
            .unwrap();
        h.category("Apartments", CategoryKind::PropertyType, Some("pune"), 0)
            .await
            .unwrap();
        h
    }

    async fn post(&self, author: &CurrentUser, category: &str, title: &str) -> ForumResult<Post> {
        CreatePostUseCase::new(self.repo.clone(), self.repo.clone())
            .execute(
                author,
                CreatePostInput {
                    category_slug: category.to_string(),
                    title: title.to_string(),
                    body: "Looking for advice from residents.".to_string(),
                },
            )
            .await
    }

    fn replies(&self) -> ReplyUseCase<MemoryForum, MemoryForum> {
        ReplyUseCase::new(self.repo.clone(), self.repo.clone())
    }

    fn react(&self) -> ReactUseCase<MemoryForum, MemoryForum, MemoryForum> {
        ReactUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.repo.clone(),
            self.config.clone(),
        )
    }

    fn manage(&self) -> ManagePostUseCase<MemoryForum> {
        ManagePostUseCase::new(self.repo.clone())
    }

    async fn list(&self, slug: &str, sort: PostSort) -> ForumResult<Vec<PostSummary>> {
        Ok(ListPostsUseCase::new(self.repo.clone(), self.repo.clone())
            .execute(slug, sort, PageRequest::default())
            .await?
            .posts
            .items)
    }

    async fn detail(&self, id: PostId) -> ForumResult<PostDetail> {
        GetPostUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.repo.clone(),
            self.config.clone(),
        )
        .execute(id)
        .await
    }
}

// ============================================================================
// Categories
// ============================================================================

#[tokio::test]
async fn test_category_tree() {
    let h = Harness::seeded().await;

    let tree = ListCategoriesUseCase::new(h.repo.clone()).execute().await.unwrap();
    let roots: Vec<_> = tree.iter().map(|n| n.category.slug.as_str()).collect();
    assert_eq!(roots, ["mumbai", "pune"]);
    let children: Vec<_> = tree[1].children.iter().map(|c| c.slug.as_str()).collect();
    assert_eq!(children, ["pune-apartments", "pune-villas"]);
}

#[tokio::test]
async fn test_category_rules() {
    let h = Harness::seeded().await;

    assert!(matches!(
        h.category("Pune", CategoryKind::City, None, 0).await,
        Err(ForumError::CategoryExists(slug)) if slug == "pune"
    ));
    assert!(matches!(
        h.category("Plots", CategoryKind::PropertyType, None, 0).await,
        Err(ForumError::InvalidHierarchy(_))
    ));
    assert!(matches!(
        h.category("Plots", CategoryKind::PropertyType, Some("pune-villas"), 0).await,
        Err(ForumError::InvalidHierarchy(_))
    ));
    assert!(matches!(
        h.category("Plots", CategoryKind::PropertyType, Some("nagpur"), 0).await,
        Err(ForumError::CategoryNotFound)
    ));

    // Same property type under another city gets its own slug
    let mumbai_villas = h
        .category("Villas", CategoryKind::PropertyType, Some("mumbai"), 0)
        .await
        .unwrap();
    assert_eq!(mumbai_villas.slug, "mumbai-villas");

    let err = CreateCategoryUseCase::new(h.repo.clone())
        .execute(
            &user(Role::Moderator, true),
            CreateCategoryInput {
                name: "Delhi".to_string(),
                kind: CategoryKind::City,
                parent_slug: None,
                position: 0,
            },
        )
        .await
        .unwrap_err()
        .into_app_error();
    assert_eq!(err.code(), Some("ROLE_REQUIRED"));
}

// ============================================================================
// Posts
// ============================================================================

#[tokio::test]
async fn test_post_requires_verified_account_and_category() {
    let h = Harness::seeded().await;

    let err = h
        .post(&user(Role::Member, false), "pune", "Water supply in Baner")
        .await
        .unwrap_err()
        .into_app_error();
    assert_eq!(err.code(), Some("ACCOUNT_NOT_VERIFIED"));

    assert!(matches!(
        h.post(&user(Role::Member, true), "nagpur", "Water supply in Baner").await,
        Err(ForumError::CategoryNotFound)
    ));

    let err = h
        .post(&user(Role::Member, true), "pune", "Hi")
        .await
        .unwrap_err()
        .into_app_error();
    assert_eq!(err.code(), Some("INVALID_POST_TITLE"));
}

#[tokio::test]
async fn test_city_listing_includes_children() {
    let h = Harness::seeded().await;
    let author = user(Role::Member, true);

    h.post(&author, "pune", "General Pune question").await.unwrap();
    h.post(&author, "pune-villas", "Villa maintenance costs").await.unwrap();
    h.post(&author, "pune-apartments", "Society rules in Kothrud").await.unwrap();
    h.post(&author, "mumbai", "Mumbai monsoon prep").await.unwrap();

    assert_eq!(h.list("pune", PostSort::Latest).await.unwrap().len(), 3);
    assert_eq!(h.list("pune-villas", PostSort::Latest).await.unwrap().len(), 1);
    assert_eq!(h.list("mumbai", PostSort::Latest).await.unwrap().len(), 1);
    assert!(matches!(
        h.list("delhi", PostSort::Latest).await,
        Err(ForumError::CategoryNotFound)
    ));
}

#[tokio::test]
async fn test_sort_latest_and_top() {
    let h = Harness::seeded().await;
    let author = user(Role::Member, true);
    let voters: Vec<_> = (0..3).map(|_| user(Role::Member, true)).collect();

    let old = h.post(&author, "pune", "Old but popular thread").await.unwrap();
    let mid = h.post(&author, "pune", "Middle aged thread").await.unwrap();
    let new = h.post(&author, "pune", "Brand new thread").await.unwrap();
    h.repo.backdate_post(old.id, Duration::hours(3));
    h.repo.backdate_post(mid.id, Duration::hours(2));

    for voter in &voters {
        h.react()
            .execute(voter, ReactionTarget::Post(old.id), ReactionKind::Like)
            .await
            .unwrap();
    }
    h.react()
        .execute(&voters[0], ReactionTarget::Post(new.id), ReactionKind::Dislike)
        .await
        .unwrap();

    // A reply bumps the middle thread to the top of "latest"
    h.replies().create(&voters[1], mid.id, "Still relevant").await.unwrap();

    let latest: Vec<_> = h
        .list("pune", PostSort::Latest)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.post.id)
        .collect();
    assert_eq!(latest, [mid.id, new.id, old.id]);

    let top = h.list("pune", PostSort::Top).await.unwrap();
    assert_eq!(top[0].post.id, old.id);
    assert_eq!(top[0].score, 3);
    assert_eq!(top[1].post.id, mid.id);
    assert_eq!(top[2].post.id, new.id);
    assert_eq!(top[2].score, -1);
}

#[tokio::test]
async fn test_post_detail_aggregates() {
    let h = Harness::seeded().await;
    let author = user(Role::Member, true);
    let other = user(Role::Agent, true);

    let post = h.post(&author, "pune-villas", "Villa maintenance costs").await.unwrap();
    let first = h.replies().create(&other, post.id, "About 4k a month").await.unwrap();
    let second = h.replies().create(&author, post.id, "Thanks!").await.unwrap();

    h.react()
        .execute(&author, ReactionTarget::Reply(first.id), ReactionKind::Like)
        .await
        .unwrap();
    h.react()
        .execute(&other, ReactionTarget::Reply(first.id), ReactionKind::Like)
        .await
        .unwrap();
    h.react()
        .execute(&other, ReactionTarget::Post(post.id), ReactionKind::Like)
        .await
        .unwrap();

    let detail = h.detail(post.id).await.unwrap();
    assert_eq!(detail.summary.reply_count, 2);
    assert_eq!(detail.summary.likes, 1);
    assert_eq!(detail.summary.last_activity_at, second.created_at);
    assert_eq!(detail.replies.len(), 2);
    assert_eq!(detail.replies[0].reply.id, first.id);
    assert_eq!(detail.replies[0].tally.likes, 2);
    assert_eq!(detail.replies[1].tally, ReactionTally::default());

    assert!(matches!(h.detail(PostId::new()).await, Err(ForumError::PostNotFound)));
}

// ============================================================================
// Replies / locking
// ============================================================================

#[tokio::test]
async fn test_locked_post_rejects_replies() {
    let h = Harness::seeded().await;
    let author = user(Role::Member, true);
    let moderator = user(Role::Moderator, true);
    let post = h.post(&author, "mumbai", "Redevelopment in Dadar").await.unwrap();

    let err = h
        .manage()
        .set_locked(&author, post.id, true)
        .await
        .unwrap_err()
        .into_app_error();
    assert_eq!(err.code(), Some("ROLE_REQUIRED"));

    let locked = h.manage().set_locked(&moderator, post.id, true).await.unwrap();
    assert!(locked.locked);

    let err = h.replies().create(&author, post.id, "Me too").await.unwrap_err();
    assert!(matches!(err, ForumError::PostLocked));
    assert_eq!(err.into_app_error().status_code(), 423);

    h.manage().set_locked(&moderator, post.id, false).await.unwrap();
    h.replies().create(&author, post.id, "Me too").await.unwrap();

    assert!(matches!(
        h.replies().create(&author, PostId::new(), "Hello").await,
        Err(ForumError::PostNotFound)
    ));
}

#[tokio::test]
async fn test_delete_permissions() {
    let h = Harness::seeded().await;
    let author = user(Role::Member, true);
    let stranger = user(Role::Member, true);
    let moderator = user(Role::Moderator, true);

    let post = h.post(&author, "pune", "Property tax deadline").await.unwrap();
    let reply = h.replies().create(&stranger, post.id, "It's June 30").await.unwrap();
    h.react()
        .execute(&author, ReactionTarget::Reply(reply.id), ReactionKind::Like)
        .await
        .unwrap();

    let err = h.replies().delete(&author, reply.id).await.unwrap_err().into_app_error();
    assert_eq!(err.code(), Some("NOT_REPLY_AUTHOR"));
    let err = h.manage().delete(&stranger, post.id).await.unwrap_err().into_app_error();
    assert_eq!(err.code(), Some("NOT_POST_AUTHOR"));

    h.replies().delete(&moderator, reply.id).await.unwrap();
    assert_eq!(h.repo.reaction_count(), 0);

    h.manage().delete(&author, post.id).await.unwrap();
    assert!(matches!(h.detail(post.id).await, Err(ForumError::PostNotFound)));
    assert!(matches!(
        h.replies().delete(&author, reply.id).await,
        Err(ForumError::ReplyNotFound)
    ));
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn test_reaction_toggle() {
    let h = Harness::seeded().await;
    let author = user(Role::Member, true);
    let voter = user(Role::Member, true);
    let post = h.post(&author, "pune", "Best schools near Aundh").await.unwrap();
    let target = ReactionTarget::Post(post.id);

    let out = h.react().execute(&voter, target, ReactionKind::Like).await.unwrap();
    assert_eq!(out.current, Some(ReactionKind::Like));
    assert_eq!(out.tally, ReactionTally { likes: 1, dislikes: 0 });

    let out = h.react().execute(&voter, target, ReactionKind::Dislike).await.unwrap();
    assert_eq!(out.current, Some(ReactionKind::Dislike));
    assert_eq!(out.tally, ReactionTally { likes: 0, dislikes: 1 });

    let out = h.react().execute(&voter, target, ReactionKind::Dislike).await.unwrap();
    assert_eq!(out.current, None);
    assert_eq!(out.tally, ReactionTally::default());

    assert!(matches!(
        h.react()
            .execute(&voter, ReactionTarget::Reply(ReplyId::new()), ReactionKind::Like)
            .await,
        Err(ForumError::ReplyNotFound)
    ));

    let err = h
        .react()
        .execute(&user(Role::Member, false), target, ReactionKind::Like)
        .await
        .unwrap_err()
        .into_app_error();
    assert_eq!(err.code(), Some("ACCOUNT_NOT_VERIFIED"));
}

// ============================================================================
// Router
// ============================================================================

fn request(
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    as_user: Option<&CurrentUser>,
) -> Request<Body> {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();
    if let Some(user) = as_user {
        req.extensions_mut().insert(user.clone());
    }
    req
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_router_thread_flow() {
    let h = Harness::seeded().await;
    let app = forum_router_generic(ForumAppState {
        repo: h.repo.clone(),
        config: h.config.clone(),
    });
    let author = user(Role::Member, true);
    let moderator = user(Role::Moderator, true);

    let response = app
        .clone()
        .oneshot(request("GET", "/categories", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let tree = body_json(response).await;
    assert_eq!(tree[1]["slug"], "pune");
    assert_eq!(tree[1]["children"][0]["slug"], "pune-apartments");

    let post_body = serde_json::json!({
        "categorySlug": "pune-villas",
        "title": "Gated community recommendations",
        "body": "Budget around 2 Cr.",
    });
    let response = app
        .clone()
        .oneshot(request("POST", "/posts", Some(post_body.clone()), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(request("POST", "/posts", Some(post_body), Some(&author)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let post = body_json(response).await;
    let id = post["id"].as_str().unwrap().to_string();
    assert_eq!(post["mine"], true);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/posts/{id}/reactions"),
            Some(serde_json::json!({ "kind": "like" })),
            Some(&moderator),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["score"], 1);

    let response = app
        .clone()
        .oneshot(request("POST", &format!("/posts/{id}/lock"), None, Some(&moderator)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/posts/{id}/replies"),
            Some(serde_json::json!({ "body": "Try Hinjewadi" })),
            Some(&author),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::LOCKED);
    assert_eq!(body_json(response).await["code"], "POST_LOCKED");

    let response = app
        .clone()
        .oneshot(request("GET", "/categories/pune/posts?sort=top", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = body_json(response).await;
    assert_eq!(list["category"]["slug"], "pune");
    assert_eq!(list["posts"]["total"], 1);
    assert_eq!(list["posts"]["items"][0]["likes"], 1);
    assert_eq!(list["posts"]["items"][0]["mine"], false);

    let response = app
        .clone()
        .oneshot(request("GET", &format!("/posts/{id}"), None, Some(&author)))
        .await
        .unwrap();
    let detail = body_json(response).await;
    assert_eq!(detail["locked"], true);
    assert_eq!(detail["mine"], true);
    assert_eq!(detail["replyCount"], 0);

    let response = app
        .oneshot(request("DELETE", &format!("/posts/{id}"), None, Some(&author)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
