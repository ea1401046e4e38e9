//! Auth Middleware
//!
//! Resolves the session cookie into a [`CurrentUser`] request extension.
//! Routes that need a signed-in user extract `CurrentUser` and get a 401
//! when the middleware attached nothing.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use kernel::actor::CurrentUser;
use std::sync::Arc;

use crate::application::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::presentation::handlers::fingerprint_from_parts;

/// Middleware state
pub struct AuthMiddlewareState<R> {
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthMiddlewareState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R> AuthMiddlewareState<R> {
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }
}

/// Attach the signed-in user, if any. Invalid sessions are treated as
/// anonymous requests.
pub async fn attach_current_user<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    R: UserRepository + AuthSessionRepository + Send + Sync + 'static,
{
    let token = platform::cookie::extract_cookie(req.headers(), &state.config.session_cookie_name);
    let fingerprint = fingerprint_from_parts(req.headers(), req.extensions()).ok();

    if let (Some(token), Some(fingerprint)) = (token, fingerprint) {
        if let Some(user) = resolve_current_user(&state, &token, &fingerprint.hash).await {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}

async fn resolve_current_user<R>(
    state: &AuthMiddlewareState<R>,
    token: &str,
    fingerprint_hash: &[u8],
) -> Option<CurrentUser>
where
    R: UserRepository + AuthSessionRepository + Send + Sync + 'static,
{
    let use_case =
        CheckSessionUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    match use_case.resolve(token, fingerprint_hash).await {
        Ok((_, user)) => Some(user.to_current_user()),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring unusable session cookie");
            None
        }
    }
}
