//! Forum Router

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::application::config::ForumConfig;
use crate::domain::repository::ForumStore;
use crate::infra::postgres::PgForumRepository;
use crate::presentation::handlers::{self, ForumAppState};

/// Create the Forum router with PostgreSQL repository
pub fn forum_router(repo: Arc<PgForumRepository>, config: Arc<ForumConfig>) -> Router {
    forum_router_generic(ForumAppState { repo, config })
}

/// Create a generic Forum router for any repository
pub fn forum_router_generic<R: ForumStore>(state: ForumAppState<R>) -> Router {
    Router::new()
        .route(
            "/categories",
            get(handlers::list_categories::<R>).post(handlers::create_category::<R>),
        )
        .route("/categories/{slug}/posts", get(handlers::list_posts::<R>))
        .route("/posts", post(handlers::create_post::<R>))
        .route(
            "/posts/{id}",
            get(handlers::get_post::<R>).delete(handlers::delete_post::<R>),
        )
        .route("/posts/{id}/lock", post(handlers::lock_post::<R>))
        .route("/posts/{id}/unlock", post(handlers::unlock_post::<R>))
        .route("/posts/{id}/replies", post(handlers::create_reply::<R>))
        .route("/posts/{id}/reactions", post(handlers::react_to_post::<R>))
        .route("/replies/{id}", delete(handlers::delete_reply::<R>))
        .route("/replies/{id}/reactions", post(handlers::react_to_reply::<R>))
        .with_state(state)
}
