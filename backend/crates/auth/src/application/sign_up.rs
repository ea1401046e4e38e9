//! Sign Up Use Case
//!
//! Creates a new user account with email and/or phone.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{auth::Auth, user::User};
use crate::domain::repository::{AuthRepository, UserRepository};
use crate::domain::value_object::{
    display_name::DisplayName,
    email::Email,
    phone_number::PhoneNumber,
    user_password::{RawPassword, UserPassword},
    user_role::AccountType,
};
use crate::error::{AuthError, AuthResult};

pub struct SignUpInput {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_name: String,
    pub password: String,
    /// `member`, `agent` or `builder`
    pub account_type: String,
}

pub struct SignUpOutput {
    pub public_id: String,
}

pub struct SignUpUseCase<U, A>
where
    U: UserRepository,
    A: AuthRepository,
{
    user_repo: Arc<U>,
    auth_repo: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<U, A> SignUpUseCase<U, A>
where
    U: UserRepository,
    A: AuthRepository,
{
    pub fn new(user_repo: Arc<U>, auth_repo: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            auth_repo,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let email = non_blank(input.email).map(Email::new).transpose()?;
        let phone = non_blank(input.phone)
            .map(|p| PhoneNumber::new(&p, &self.config.default_country_code))
            .transpose()?;
        let display_name = DisplayName::new(&input.display_name)?;
        let role = AccountType::parse(&input.account_type)?.role();

        let user = User::new(email, phone, display_name, role)?;

        if let Some(email) = &user.email {
            if self.user_repo.exists_by_email(email).await? {
                return Err(AuthError::EmailTaken);
            }
        }
        if let Some(phone) = &user.phone {
            if self.user_repo.exists_by_phone(phone).await? {
                return Err(AuthError::PhoneTaken);
            }
        }

        let raw_password = RawPassword::new(input.password)?;
        if self.config.check_breached_passwords {
            reject_if_breached(&raw_password).await?;
        }
        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;

        let auth = Auth::new(user.user_id, password_hash);

        self.user_repo.create(&user).await?;
        self.auth_repo.create(&auth).await?;

        tracing::info!(
            public_id = %user.public_id,
            role = %user.role,
            has_email = user.email.is_some(),
            has_phone = user.phone.is_some(),
            "User signed up"
        );

        Ok(SignUpOutput {
            public_id: user.public_id.to_string(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// HIBP outages never block the user
pub(crate) async fn reject_if_breached(password: &RawPassword) -> AuthResult<()> {
    match password.is_compromised().await {
        Ok(true) => Err(AuthError::PasswordCompromised),
        Ok(false) => Ok(()),
        Err(e) => {
            tracing::warn!(error = %e, "Breach check unavailable, continuing");
            Ok(())
        }
    }
}
