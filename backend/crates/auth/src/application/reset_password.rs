//! Reset Password Use Case
//!
//! Redeems a password-reset code, sets the new password and revokes every
//! session of the account.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::sign_up::reject_if_breached;
use crate::application::verify_otp::consume_code;
use crate::domain::repository::{
    AuthRepository, AuthSessionRepository, UserRepository, VerificationCodeRepository,
};
use crate::domain::value_object::{
    otp::{OtpCode, VerificationPurpose},
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

pub struct ResetPasswordInput {
    pub identifier: String,
    pub code: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<R>
where
    R: UserRepository + AuthRepository + AuthSessionRepository + VerificationCodeRepository,
{
    repo: Arc<R>,
    config: Arc<AuthConfig>,
}

impl<R> ResetPasswordUseCase<R>
where
    R: UserRepository + AuthRepository + AuthSessionRepository + VerificationCodeRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AuthConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: ResetPasswordInput) -> AuthResult<()> {
        // Policy errors must not burn the code
        let raw_password = RawPassword::new(input.new_password)?;
        if self.config.check_breached_passwords {
            reject_if_breached(&raw_password).await?;
        }
        let code = OtpCode::parse(&input.code)?;

        let repo = self.repo.as_ref();
        let (user, _) = consume_code(
            repo,
            repo,
            &self.config,
            &input.identifier,
            VerificationPurpose::ResetPassword,
            &code,
        )
        .await?;

        let mut auth = AuthRepository::find_by_user_id(repo, &user.user_id)
            .await?
            .ok_or_else(|| AuthError::Internal("Credentials missing for user".to_string()))?;
        auth.update_password(UserPassword::from_raw(&raw_password, self.config.pepper())?);
        AuthRepository::update(repo, &auth).await?;

        let revoked = AuthSessionRepository::delete_all_for_user(repo, &user.user_id, None).await?;

        tracing::info!(
            public_id = %user.public_id,
            revoked_sessions = revoked,
            "Password reset"
        );
        Ok(())
    }
}
