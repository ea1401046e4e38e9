//! Check Session Use Case
//!
//! Verifies the session cookie and resolves the user behind it.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::domain::value_object::{public_id::PublicId, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Session info output
pub struct SessionInfoOutput {
    pub public_id: String,
    pub role: UserRole,
    pub verified: bool,
    pub expires_at_ms: i64,
}

pub struct CheckSessionUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> CheckSessionUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        session_token: &str,
        fingerprint_hash: &[u8],
    ) -> AuthResult<SessionInfoOutput> {
        let (session, user) = self.resolve(session_token, fingerprint_hash).await?;

        Ok(SessionInfoOutput {
            public_id: user.public_id.to_string(),
            role: user.role,
            verified: user.is_verified(),
            expires_at_ms: session.expires_at_ms,
        })
    }

    /// Session plus its (active) user
    pub async fn resolve(
        &self,
        session_token: &str,
        fingerprint_hash: &[u8],
    ) -> AuthResult<(AuthSession, User)> {
        let session = self.get_session(session_token, fingerprint_hash).await?;

        let user = self
            .user_repo
            .find_by_id(&session.user_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        Ok((session, user))
    }

    /// Get session and update last activity
    pub async fn get_session(
        &self,
        session_token: &str,
        fingerprint_hash: &[u8],
    ) -> AuthResult<AuthSession> {
        let session_id = session_token::verify(&self.config.session_secret, session_token)?;

        let mut session = self
            .session_repo
            .find_by_id(session_id, fingerprint_hash)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if session.is_expired() {
            self.session_repo.delete(session_id).await?;
            return Err(AuthError::SessionInvalid);
        }

        session.touch();

        let ttl_long = chrono::Duration::from_std(self.config.session_ttl_long)
            .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))?;
        session.extend_if_needed(ttl_long);

        // Fire and forget
        let session_clone = session.clone();
        let repo = self.session_repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.update(&session_clone).await {
                tracing::warn!(error = %e, "Failed to update session activity");
            }
        });

        Ok(session)
    }
}

/// Public profile of a user
pub struct ProfileOutput {
    pub public_id: String,
    pub display_name: String,
    pub role: UserRole,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<&User> for ProfileOutput {
    fn from(user: &User) -> Self {
        Self {
            public_id: user.public_id.to_string(),
            display_name: user.display_name.as_str().to_string(),
            role: user.role,
            email: user.email.as_ref().map(|e| e.as_str().to_string()),
            phone: user.phone.as_ref().map(|p| p.as_str().to_string()),
            email_verified: user.email_verified,
            phone_verified: user.phone_verified,
            created_at: user.created_at,
        }
    }
}

/// Profile of the signed-in user
pub async fn me<U: UserRepository>(user_repo: &U, public_id: &str) -> AuthResult<ProfileOutput> {
    let public_id = PublicId::parse_str(public_id)?;
    let user = user_repo
        .find_by_public_id(&public_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;
    Ok(ProfileOutput::from(&user))
}
