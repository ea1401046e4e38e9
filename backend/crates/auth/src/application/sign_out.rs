//! Sign Out Use Case
//!
//! Invalidates a user session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::repository::AuthSessionRepository;
use crate::error::{AuthError, AuthResult};

pub struct SignOutUseCase<S>
where
    S: AuthSessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SignOutUseCase<S>
where
    S: AuthSessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Sign out from current session
    pub async fn execute(&self, session_token: &str) -> AuthResult<()> {
        let session_id = session_token::verify(&self.config.session_secret, session_token)?;
        self.session_repo.delete(session_id).await?;

        tracing::info!(session_id = %session_id, "User signed out");
        Ok(())
    }

    /// Sign out from all sessions except the current one
    pub async fn execute_all(
        &self,
        session_token: &str,
        fingerprint_hash: &[u8],
    ) -> AuthResult<u64> {
        let session_id = session_token::verify(&self.config.session_secret, session_token)?;

        let session = self
            .session_repo
            .find_by_id(session_id, fingerprint_hash)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        let deleted = self
            .session_repo
            .delete_all_for_user(&session.user_id, Some(session_id))
            .await?;

        tracing::info!(
            public_id = %session.public_id,
            deleted = deleted,
            "User signed out from all other sessions"
        );

        Ok(deleted)
    }
}
