//! Ads Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AdsConfig;
use crate::domain::repository::AdsStore;
use crate::infra::postgres::PgAdsRepository;
use crate::presentation::handlers::{self, AdsAppState};

/// Create the Ads router with PostgreSQL repository
pub fn ads_router(repo: Arc<PgAdsRepository>, config: Arc<AdsConfig>) -> Router {
    ads_router_generic(AdsAppState { repo, config })
}

/// Create a generic Ads router for any repository
pub fn ads_router_generic<R: AdsStore>(state: AdsAppState<R>) -> Router {
    Router::new()
        .route("/slots", get(handlers::list_slots::<R>))
        .route("/slots/{slot_number}/quote", get(handlers::quote::<R>))
        .route("/slots/{slot_number}/live", get(handlers::live_ad::<R>))
        .route("/bookings", post(handlers::book::<R>))
        .route("/mine", get(handlers::my_ads::<R>))
        .route("/{id}/activate", post(handlers::activate::<R>))
        .route("/{id}/cancel", post(handlers::cancel::<R>))
        .route("/sweep", post(handlers::sweep::<R>))
        .with_state(state)
}
