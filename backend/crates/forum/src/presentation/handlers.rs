//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::actor::CurrentUser;
use kernel::id::{PostId, ReplyId};
use std::sync::Arc;

use crate::application::{
    CreateCategoryInput, CreateCategoryUseCase, CreatePostInput, CreatePostUseCase,
    ForumConfig, GetPostUseCase, ListCategoriesUseCase, ListPostsUseCase, ManagePostUseCase,
    ReactUseCase, ReplyUseCase,
};
use crate::domain::entities::ReactionTarget;
use crate::domain::repository::ForumStore;
use crate::error::ForumResult;
use crate::presentation::dto::{
    CategoryNodeResponse, CategoryResponse, CreateCategoryRequest, CreatePostRequest,
    CreateReplyRequest, ListPostsQuery, PostDetailResponse, PostListResponse, PostResponse,
    PostSummaryResponse, ReactRequest, ReactResponse, ReplyResponse,
};

/// Shared state for forum handlers
pub struct ForumAppState<R> {
    pub repo: Arc<R>,
    pub config: Arc<ForumConfig>,
}

impl<R> Clone for ForumAppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: ForumStore> ForumAppState<R> {
    fn react_use_case(&self) -> ReactUseCase<R, R, R> {
        ReactUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.repo.clone(),
            self.config.clone(),
        )
    }
}

// ============================================================================
// Categories
// ============================================================================

/// GET /api/forum/categories
pub async fn list_categories<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
) -> ForumResult<Json<Vec<CategoryNodeResponse>>> {
    let tree = ListCategoriesUseCase::new(state.repo.clone()).execute().await?;
    Ok(Json(tree.into_iter().map(Into::into).collect()))
}

/// POST /api/forum/categories
pub async fn create_category<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
    user: CurrentUser,
    Json(req): Json<CreateCategoryRequest>,
) -> ForumResult<impl IntoResponse> {
    let category = CreateCategoryUseCase::new(state.repo.clone())
        .execute(
            &user,
            CreateCategoryInput {
                name: req.name,
                kind: req.kind,
                parent_slug: req.parent_slug,
                position: req.position,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}

/// GET /api/forum/categories/{slug}/posts?sort=latest|top
pub async fn list_posts<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
    viewer: Option<CurrentUser>,
    Path(slug): Path<String>,
    Query(query): Query<ListPostsQuery>,
) -> ForumResult<Json<PostListResponse>> {
    let output = ListPostsUseCase::new(state.repo.clone(), state.repo.clone())
        .execute(&slug, query.sort, query.page_request())
        .await?;

    let viewer = viewer.map(|u| u.user_id);
    Ok(Json(PostListResponse {
        category: output.category.into(),
        posts: output
            .posts
            .map(|summary| PostSummaryResponse::new(summary, viewer)),
    }))
}

// ============================================================================
// Posts
// ============================================================================

/// POST /api/forum/posts
pub async fn create_post<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
    user: CurrentUser,
    Json(req): Json<CreatePostRequest>,
) -> ForumResult<impl IntoResponse> {
    let post = CreatePostUseCase::new(state.repo.clone(), state.repo.clone())
        .execute(
            &user,
            CreatePostInput {
                category_slug: req.category_slug,
                title: req.title,
                body: req.body,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PostResponse::new(post, Some(user.user_id))),
    ))
}

/// GET /api/forum/posts/{id}
pub async fn get_post<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
    viewer: Option<CurrentUser>,
    Path(id): Path<PostId>,
) -> ForumResult<Json<PostDetailResponse>> {
    let detail = GetPostUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    )
    .execute(id)
    .await?;

    let viewer = viewer.map(|u| u.user_id);
    Ok(Json(PostDetailResponse {
        summary: PostSummaryResponse::new(detail.summary, viewer),
        replies: detail
            .replies
            .into_iter()
            .map(|view| ReplyResponse::from_view(view, viewer))
            .collect(),
    }))
}

/// DELETE /api/forum/posts/{id}
pub async fn delete_post<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
    user: CurrentUser,
    Path(id): Path<PostId>,
) -> ForumResult<StatusCode> {
    ManagePostUseCase::new(state.repo.clone())
        .delete(&user, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/forum/posts/{id}/lock
pub async fn lock_post<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
    user: CurrentUser,
    Path(id): Path<PostId>,
) -> ForumResult<Json<PostResponse>> {
    let post = ManagePostUseCase::new(state.repo.clone())
        .set_locked(&user, id, true)
        .await?;
    Ok(Json(PostResponse::new(post, Some(user.user_id))))
}

/// POST /api/forum/posts/{id}/unlock
pub async fn unlock_post<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
    user: CurrentUser,
    Path(id): Path<PostId>,
) -> ForumResult<Json<PostResponse>> {
    let post = ManagePostUseCase::new(state.repo.clone())
        .set_locked(&user, id, false)
        .await?;
    Ok(Json(PostResponse::new(post, Some(user.user_id))))
}

// ============================================================================
// Replies
// ============================================================================

/// POST /api/forum/posts/{id}/replies
pub async fn create_reply<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
    user: CurrentUser,
    Path(id): Path<PostId>,
    Json(req): Json<CreateReplyRequest>,
) -> ForumResult<impl IntoResponse> {
    let reply = ReplyUseCase::new(state.repo.clone(), state.repo.clone())
        .create(&user, id, &req.body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReplyResponse::new(reply, Default::default(), Some(user.user_id))),
    ))
}

/// DELETE /api/forum/replies/{id}
pub async fn delete_reply<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
    user: CurrentUser,
    Path(id): Path<ReplyId>,
) -> ForumResult<StatusCode> {
    ReplyUseCase::new(state.repo.clone(), state.repo.clone())
        .delete(&user, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Reactions
// ============================================================================

/// POST /api/forum/posts/{id}/reactions
pub async fn react_to_post<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
    user: CurrentUser,
    Path(id): Path<PostId>,
    Json(req): Json<ReactRequest>,
) -> ForumResult<Json<ReactResponse>> {
    let output = state
        .react_use_case()
        .execute(&user, ReactionTarget::Post(id), req.kind)
        .await?;
    Ok(Json(output.into()))
}

/// POST /api/forum/replies/{id}/reactions
pub async fn react_to_reply<R: ForumStore>(
    State(state): State<ForumAppState<R>>,
    user: CurrentUser,
    Path(id): Path<ReplyId>,
    Json(req): Json<ReactRequest>,
) -> ForumResult<Json<ReactResponse>> {
    let output = state
        .react_use_case()
        .execute(&user, ReactionTarget::Reply(id), req.kind)
        .await?;
    Ok(Json(output.into()))
}
