//! Auth Router

use axum::{
    Router,
    routing::{get, post, put},
};
use platform::rate_limit::SlidingWindowLimiter;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::notifier::OtpNotifier;
use crate::domain::repository::AuthStore;
use crate::infra::{notifier::LogNotifier, postgres::PgAuthRepository};
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with PostgreSQL repository and logging notifier
pub fn auth_router(
    repo: Arc<PgAuthRepository>,
    limiter: Arc<SlidingWindowLimiter>,
    config: Arc<AuthConfig>,
) -> Router {
    let notifier = Arc::new(LogNotifier::new(config.sms_enabled));
    auth_router_generic(AuthAppState {
        repo,
        notifier,
        limiter,
        config,
    })
}

/// Create a generic Auth router for any repository / notifier
pub fn auth_router_generic<R, N>(state: AuthAppState<R, N>) -> Router
where
    R: AuthStore,
    N: OtpNotifier + Send + Sync + 'static,
{
    Router::new()
        .route("/signup", post(handlers::sign_up::<R, N>))
        .route("/signin", post(handlers::sign_in::<R, N>))
        .route("/signout", post(handlers::sign_out::<R, N>))
        .route("/status", get(handlers::session_status::<R, N>))
        .route("/me", get(handlers::me::<R, N>))
        .route("/otp/request", post(handlers::request_otp::<R, N>))
        .route("/otp/verify", post(handlers::verify_otp::<R, N>))
        .route("/password/reset", post(handlers::reset_password::<R, N>))
        .route("/users/{public_id}/role", put(handlers::set_role::<R, N>))
        .with_state(state)
}
