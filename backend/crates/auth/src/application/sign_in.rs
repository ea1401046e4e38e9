//! Sign In Use Case
//!
//! Authenticates a user by email or phone plus password and creates a
//! session.

use std::sync::Arc;

use platform::client::ClientFingerprint;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::domain::entity::user::User;
use crate::domain::repository::{AuthRepository, AuthSessionRepository, UserRepository};
use crate::domain::value_object::{
    identifier::Identifier,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

pub struct SignInInput {
    /// Email or phone number
    pub identifier: String,
    pub password: String,
    pub remember_me: bool,
}

pub struct SignInOutput {
    /// Signed cookie value
    pub session_token: String,
    pub max_age_secs: u64,
    pub public_id: String,
    pub role: UserRole,
}

pub struct SignInUseCase<U, A, S>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, A, S> SignInUseCase<U, A, S>
where
    U: UserRepository,
    A: AuthRepository,
    S: AuthSessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        auth_repo: Arc<A>,
        session_repo: Arc<S>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            auth_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: SignInInput,
        fingerprint: ClientFingerprint,
    ) -> AuthResult<SignInOutput> {
        // Malformed identifiers look the same as unknown ones
        let identifier = Identifier::parse(&input.identifier, &self.config.default_country_code)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let mut user = find_user(self.user_repo.as_ref(), &identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.can_login() {
            return Err(AuthError::AccountDisabled);
        }

        let mut auth = self
            .auth_repo
            .find_by_user_id(&user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials missing for user".to_string()))?;

        if auth.is_locked() {
            return Err(AuthError::AccountLocked {
                retry_after_secs: auth.lock_remaining_secs(),
            });
        }

        // A password that fails policy can never match a stored hash
        let password_ok = match RawPassword::new(input.password) {
            Ok(raw) => {
                let ok = auth.password_hash.verify(&raw, self.config.pepper());
                if ok && auth.password_hash.needs_rehash() {
                    auth.password_hash = UserPassword::from_raw(&raw, self.config.pepper())?;
                }
                ok
            }
            Err(_) => false,
        };

        if !password_ok {
            auth.record_failure();
            self.auth_repo.update(&auth).await?;
            if auth.is_locked() {
                tracing::warn!(public_id = %user.public_id, "Account locked after repeated failures");
            }
            return Err(AuthError::InvalidCredentials);
        }

        auth.reset_failures();
        self.auth_repo.update(&auth).await?;

        user.record_login();
        self.user_repo.update(&user).await?;

        let session =
            session_token::new_session(&self.config, &user, input.remember_me, &fingerprint)?;
        self.session_repo.create(&session).await?;

        tracing::info!(
            public_id = %user.public_id,
            session_id = %session.session_id,
            remember_me = input.remember_me,
            "User signed in"
        );

        Ok(SignInOutput {
            session_token: session_token::sign(&self.config.session_secret, session.session_id),
            max_age_secs: self.config.session_ttl(input.remember_me).as_secs(),
            public_id: user.public_id.to_string(),
            role: user.role,
        })
    }
}

/// Look a user up by either kind of identifier
pub(crate) async fn find_user<U: UserRepository>(
    repo: &U,
    identifier: &Identifier,
) -> AuthResult<Option<User>> {
    match identifier {
        Identifier::Email(email) => repo.find_by_email(email).await,
        Identifier::Phone(phone) => repo.find_by_phone(phone).await,
    }
}
