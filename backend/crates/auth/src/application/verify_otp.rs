//! Verify OTP Use Case
//!
//! Checks a submitted code and applies its purpose.

use std::sync::Arc;

use chrono::Utc;
use kernel::error::app_error::AppError;
use platform::client::ClientFingerprint;

use crate::application::config::AuthConfig;
use crate::application::session_token;
use crate::application::sign_in::find_user;
use crate::domain::entity::{
    user::User,
    verification_code::{CodeRejection, VerificationCode},
};
use crate::domain::repository::{
    AuthSessionRepository, UserRepository, VerificationCodeRepository,
};
use crate::domain::value_object::{
    identifier::Identifier,
    otp::{OtpChannel, OtpCode, VerificationPurpose},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

pub struct VerifyOtpInput {
    pub identifier: String,
    pub purpose: VerificationPurpose,
    pub code: String,
    /// Only used for sign-in
    pub remember_me: bool,
}

pub struct VerifyOtpOutput {
    pub public_id: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub phone_verified: bool,
    /// Present for sign-in codes: (token, max-age seconds)
    pub session: Option<(String, u64)>,
}

pub struct VerifyOtpUseCase<U, V, S>
where
    U: UserRepository,
    V: VerificationCodeRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    code_repo: Arc<V>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, V, S> VerifyOtpUseCase<U, V, S>
where
    U: UserRepository,
    V: VerificationCodeRepository,
    S: AuthSessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        code_repo: Arc<V>,
        session_repo: Arc<S>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            code_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: VerifyOtpInput,
        fingerprint: ClientFingerprint,
    ) -> AuthResult<VerifyOtpOutput> {
        if input.purpose == VerificationPurpose::ResetPassword {
            return Err(AppError::bad_request("Password reset codes are redeemed with a new password")
                .with_code("USE_RESET_ENDPOINT")
                .into());
        }

        let code = OtpCode::parse(&input.code)?;
        let (mut user, verification) = consume_code(
            self.user_repo.as_ref(),
            self.code_repo.as_ref(),
            &self.config,
            &input.identifier,
            input.purpose,
            &code,
        )
        .await?;

        match input.purpose {
            VerificationPurpose::VerifyEmail => user.mark_email_verified(),
            VerificationPurpose::VerifyPhone => user.mark_phone_verified(),
            // Receiving the code proves control of that channel
            VerificationPurpose::SignIn => match verification.channel {
                OtpChannel::Email => user.mark_email_verified(),
                OtpChannel::Sms => user.mark_phone_verified(),
            },
            VerificationPurpose::ResetPassword => {}
        }

        let session = if input.purpose == VerificationPurpose::SignIn {
            user.record_login();
            let session =
                session_token::new_session(&self.config, &user, input.remember_me, &fingerprint)?;
            self.session_repo.create(&session).await?;
            Some((
                session_token::sign(&self.config.session_secret, session.session_id),
                self.config.session_ttl(input.remember_me).as_secs(),
            ))
        } else {
            None
        };

        self.user_repo.update(&user).await?;

        tracing::info!(
            public_id = %user.public_id,
            purpose = %input.purpose,
            "Verification code accepted"
        );

        Ok(VerifyOtpOutput {
            public_id: user.public_id.to_string(),
            role: user.role,
            email_verified: user.email_verified,
            phone_verified: user.phone_verified,
            session,
        })
    }
}

/// Resolve the identifier, check the latest code for `purpose` and
/// consume it. Failed attempts are persisted before returning.
pub(crate) async fn consume_code<U, V>(
    user_repo: &U,
    code_repo: &V,
    config: &AuthConfig,
    raw_identifier: &str,
    purpose: VerificationPurpose,
    code: &OtpCode,
) -> AuthResult<(User, VerificationCode)>
where
    U: UserRepository,
    V: VerificationCodeRepository,
{
    let identifier = Identifier::parse(raw_identifier, &config.default_country_code)
        .map_err(|_| AuthError::OtpInvalid)?;

    let user = find_user(user_repo, &identifier)
        .await?
        .filter(|u| u.can_login())
        .ok_or(AuthError::OtpInvalid)?;

    let mut verification = code_repo
        .find_latest(&user.user_id, purpose)
        .await?
        .ok_or(AuthError::OtpInvalid)?;

    // The loaded row may be stale by the time we write; the store applies
    // each change only if the code is still open.
    let now = Utc::now();
    match verification.attempt(&config.session_secret, code, now) {
        Ok(()) => {
            if !code_repo.consume(verification.code_id, now).await? {
                return Err(AuthError::OtpExpired);
            }
            Ok((user, verification))
        }
        Err(CodeRejection::Consumed | CodeRejection::Expired) => Err(AuthError::OtpExpired),
        Err(rejection @ (CodeRejection::Exhausted | CodeRejection::Mismatch { .. })) => {
            let Some(attempts) = code_repo.record_failure(verification.code_id).await? else {
                return Err(match rejection {
                    CodeRejection::Exhausted => AuthError::OtpExhausted,
                    _ => AuthError::OtpExpired,
                });
            };
            if attempts >= verification.max_attempts {
                return Err(AuthError::OtpExhausted);
            }
            tracing::debug!(
                public_id = %user.public_id,
                remaining = verification.max_attempts - attempts,
                "Wrong verification code"
            );
            Err(AuthError::OtpInvalid)
        }
    }
}
