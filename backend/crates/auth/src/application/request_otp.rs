//! Request OTP Use Case
//!
//! Issues a one-time passcode for email/phone verification, passwordless
//! sign-in or password reset.

use std::sync::Arc;

use platform::rate_limit::SlidingWindowLimiter;

use crate::application::config::AuthConfig;
use crate::application::sign_in::find_user;
use crate::domain::entity::{user::User, verification_code::VerificationCode};
use crate::domain::notifier::OtpNotifier;
use crate::domain::repository::{UserRepository, VerificationCodeRepository};
use crate::domain::value_object::{
    identifier::Identifier,
    otp::{OtpChannel, OtpCode, VerificationPurpose},
};
use crate::error::{AuthError, AuthResult};

pub struct RequestOtpInput {
    pub identifier: String,
    pub purpose: VerificationPurpose,
}

/// Returned even when the identifier is unknown
pub struct RequestOtpOutput {
    pub expires_in_secs: u64,
    pub resend_after_secs: u64,
}

pub struct RequestOtpUseCase<U, V, N>
where
    U: UserRepository,
    V: VerificationCodeRepository,
    N: OtpNotifier,
{
    user_repo: Arc<U>,
    code_repo: Arc<V>,
    notifier: Arc<N>,
    limiter: Arc<SlidingWindowLimiter>,
    config: Arc<AuthConfig>,
}

impl<U, V, N> RequestOtpUseCase<U, V, N>
where
    U: UserRepository,
    V: VerificationCodeRepository,
    N: OtpNotifier,
{
    pub fn new(
        user_repo: Arc<U>,
        code_repo: Arc<V>,
        notifier: Arc<N>,
        limiter: Arc<SlidingWindowLimiter>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            code_repo,
            notifier,
            limiter,
            config,
        }
    }

    pub async fn execute(&self, input: RequestOtpInput) -> AuthResult<RequestOtpOutput> {
        let identifier = Identifier::parse(&input.identifier, &self.config.default_country_code)?;
        let output = RequestOtpOutput {
            expires_in_secs: self.config.otp_ttl.as_secs(),
            resend_after_secs: self.config.otp_resend_cooldown.as_secs(),
        };

        // Budget is spent per identifier, known or not
        let key = format!("otp:{}", identifier.as_str());
        let now_ms = chrono::Utc::now().timestamp_millis();
        let verdict = self
            .limiter
            .check_at(&key, &self.config.otp_rate_limit, now_ms)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        if !verdict.allowed {
            return Err(AuthError::OtpRateLimited {
                retry_after_secs: verdict.retry_after_secs() as i64,
            });
        }

        let Some(user) = find_user(self.user_repo.as_ref(), &identifier).await? else {
            tracing::info!(identifier = %identifier.masked(), "OTP requested for unknown identifier");
            return Ok(output);
        };
        if !user.can_login() {
            tracing::info!(public_id = %user.public_id, "OTP requested for disabled account");
            return Ok(output);
        }

        let now = chrono::Utc::now();
        let cooldown = to_chrono(self.config.otp_resend_cooldown)?;
        if let Some(latest) = self.code_repo.find_latest(&user.user_id, input.purpose).await? {
            let remaining = latest.cooldown_remaining(cooldown, now);
            if remaining > 0 {
                return Err(AuthError::OtpCooldown {
                    retry_after_secs: remaining,
                });
            }
        }

        check_purpose(&user, input.purpose)?;

        let plan = delivery_plan(&user, input.purpose);
        if plan.is_empty() {
            return Err(AuthError::ChannelUnavailable("contact"));
        }

        let code = OtpCode::generate();
        let channel = self.deliver(&plan, input.purpose, &code).await?;

        let verification = VerificationCode::issue(
            user.user_id,
            input.purpose,
            channel,
            &code,
            &self.config.session_secret,
            to_chrono(self.config.otp_ttl)?,
            self.config.otp_max_attempts,
        );

        self.code_repo
            .invalidate_active(&user.user_id, input.purpose)
            .await?;
        self.code_repo.create(&verification).await?;

        tracing::info!(
            public_id = %user.public_id,
            purpose = %input.purpose,
            channel = %channel,
            "Verification code issued"
        );

        Ok(output)
    }

    /// Try each channel in order; the first that succeeds wins
    async fn deliver(
        &self,
        plan: &[(OtpChannel, String)],
        purpose: VerificationPurpose,
        code: &OtpCode,
    ) -> AuthResult<OtpChannel> {
        for (channel, destination) in plan {
            match self
                .notifier
                .send(*channel, destination, purpose, code)
                .await
            {
                Ok(()) => return Ok(*channel),
                Err(e) => {
                    tracing::warn!(channel = %channel, error = %e, "OTP delivery failed, trying next channel");
                }
            }
        }
        Err(AuthError::DeliveryFailed)
    }
}

fn check_purpose(user: &User, purpose: VerificationPurpose) -> AuthResult<()> {
    match purpose {
        VerificationPurpose::VerifyEmail => {
            if user.email.is_none() {
                return Err(AuthError::ChannelUnavailable("email address"));
            }
            if user.email_verified {
                return Err(AuthError::AlreadyVerified("Email address"));
            }
        }
        VerificationPurpose::VerifyPhone => {
            if user.phone.is_none() {
                return Err(AuthError::ChannelUnavailable("phone number"));
            }
            if user.phone_verified {
                return Err(AuthError::AlreadyVerified("Phone number"));
            }
        }
        VerificationPurpose::SignIn | VerificationPurpose::ResetPassword => {}
    }
    Ok(())
}

/// Channels from the purpose's preference list that the user can receive
pub(crate) fn delivery_plan(user: &User, purpose: VerificationPurpose) -> Vec<(OtpChannel, String)> {
    purpose
        .channel_preference()
        .iter()
        .filter_map(|channel| {
            let destination = match channel {
                OtpChannel::Sms => user.phone.as_ref().map(|p| p.as_str().to_string()),
                OtpChannel::Email => user.email.as_ref().map(|e| e.as_str().to_string()),
            }?;
            Some((*channel, destination))
        })
        .collect()
}

pub(crate) fn to_chrono(duration: std::time::Duration) -> AuthResult<chrono::Duration> {
    chrono::Duration::from_std(duration)
        .map_err(|e| AuthError::Internal(format!("Invalid duration: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{
        display_name::DisplayName, email::Email, phone_number::PhoneNumber, user_role::UserRole,
    };

    fn user(email: bool, phone: bool) -> User {
        User::new(
            email.then(|| Email::new("buyer@example.com").unwrap()),
            phone.then(|| PhoneNumber::new("9876543210", "91").unwrap()),
            DisplayName::new("Ravi K").unwrap(),
            UserRole::Member,
        )
        .unwrap()
    }

    #[test]
    fn test_sign_in_prefers_sms_then_email() {
        let plan = delivery_plan(&user(true, true), VerificationPurpose::SignIn);
        let channels: Vec<_> = plan.iter().map(|(c, _)| *c).collect();
        assert_eq!(channels, vec![OtpChannel::Sms, OtpChannel::Email]);
        assert_eq!(plan[0].1, "+919876543210");
    }

    #[test]
    fn test_plan_skips_missing_contacts() {
        let plan = delivery_plan(&user(true, false), VerificationPurpose::ResetPassword);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].0, OtpChannel::Email);

        assert!(delivery_plan(&user(true, false), VerificationPurpose::VerifyPhone).is_empty());
    }

    #[test]
    fn test_check_purpose() {
        let mut u = user(true, false);
        assert!(matches!(
            check_purpose(&u, VerificationPurpose::VerifyPhone),
            Err(AuthError::ChannelUnavailable(_))
        ));
        u.mark_email_verified();
        assert!(matches!(
            check_purpose(&u, VerificationPurpose::VerifyEmail),
            Err(AuthError::AlreadyVerified(_))
        ));
        assert!(check_purpose(&u, VerificationPurpose::SignIn).is_ok());
    }
}
