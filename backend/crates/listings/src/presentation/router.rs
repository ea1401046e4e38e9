//! Listings Router
//!
//! One router for the builder and agent directories, projects and
//! property listings; mounted under `/api`.

use axum::{
    Router,
    routing::{get, post, put},
};
use platform::rate_limit::SlidingWindowLimiter;
use std::sync::Arc;

use crate::application::config::ListingsConfig;
use crate::domain::repository::ListingsStore;
use crate::infra::postgres::PgListingsRepository;
use crate::presentation::handlers::{self, ListingsAppState};

/// Create the Listings router with PostgreSQL repository
pub fn listings_router(
    repo: Arc<PgListingsRepository>,
    limiter: Arc<SlidingWindowLimiter>,
    config: Arc<ListingsConfig>,
) -> Router {
    listings_router_generic(ListingsAppState {
        repo,
        limiter,
        config,
    })
}

/// Create a generic Listings router for any repository
pub fn listings_router_generic<R: ListingsStore>(state: ListingsAppState<R>) -> Router {
    Router::new()
        .route(
            "/builders",
            get(handlers::list_builders::<R>).post(handlers::create_builder::<R>),
        )
        .route(
            "/builders/{slug}",
            get(handlers::get_builder::<R>).put(handlers::update_builder::<R>),
        )
        .route("/builders/{slug}/verify", post(handlers::verify_builder::<R>))
        .route(
            "/projects",
            get(handlers::list_projects::<R>).post(handlers::create_project::<R>),
        )
        .route("/projects/{slug}", get(handlers::get_project::<R>))
        .route(
            "/properties",
            get(handlers::search_properties::<R>).post(handlers::create_property::<R>),
        )
        .route(
            "/properties/{id}",
            get(handlers::get_property::<R>)
                .put(handlers::update_property::<R>)
                .delete(handlers::delete_property::<R>),
        )
        .route("/properties/{id}/status", put(handlers::set_property_status::<R>))
        .route(
            "/properties/{id}/enquiries",
            get(handlers::list_enquiries::<R>).post(handlers::submit_enquiry::<R>),
        )
        .route("/agents", get(handlers::list_agents::<R>))
        .route(
            "/agents/me",
            get(handlers::my_agent_profile::<R>).put(handlers::upsert_agent_profile::<R>),
        )
        .route("/agents/{id}", get(handlers::get_agent::<R>))
        .route("/agents/{id}/verify", post(handlers::verify_agent::<R>))
        .with_state(state)
}
