//! Use-case and router tests against in-memory repositories

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use kernel::actor::CurrentUser;
use platform::client::{ClientFingerprint, extract_fingerprint};
use platform::rate_limit::{RateLimitConfig, SlidingWindowLimiter};
use tower::ServiceExt;
use uuid::Uuid;

use crate::application::*;
use crate::domain::entity::{
    auth::Auth, auth_session::AuthSession, user::User, verification_code::VerificationCode,
};
use crate::domain::notifier::{NotifyError, OtpNotifier};
use crate::domain::repository::{
    AuthRepository, AuthSessionRepository, UserRepository, VerificationCodeRepository,
};
use crate::domain::value_object::{
    email::Email,
    otp::{OtpChannel, OtpCode, VerificationPurpose},
    phone_number::PhoneNumber,
    public_id::PublicId,
    user_id::UserId,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};
use crate::presentation::{AuthAppState, AuthMiddlewareState, attach_current_user, auth_router_generic};

const PASSWORD: &str = "Garden Villa 221";
const UA: &str = "Mozilla/5.0 (X11; Linux x86_64) EstateTest/1.0";

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct MemoryStore {
    users: Mutex<HashMap<Uuid, User>>,
    auths: Mutex<HashMap<Uuid, Auth>>,
    sessions: Mutex<HashMap<Uuid, AuthSession>>,
    codes: Mutex<Vec<VerificationCode>>,
}

impl MemoryStore {
    fn find_user(&self, pred: impl Fn(&User) -> bool) -> Option<User> {
        self.users.lock().unwrap().values().find(|u| pred(u)).cloned()
    }

    fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    fn latest_code(&self, purpose: VerificationPurpose) -> VerificationCode {
        self.codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.purpose == purpose)
            .max_by_key(|c| c.created_at)
            .cloned()
            .unwrap()
    }
}

impl UserRepository for MemoryStore {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.users.lock().unwrap().insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(user_id.as_uuid()).cloned())
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
        Ok(self.find_user(|u| u.public_id.as_str() == public_id.as_str()))
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self.find_user(|u| u.email.as_ref() == Some(email)))
    }

    async fn find_by_phone(&self, phone: &PhoneNumber) -> AuthResult<Option<User>> {
        Ok(self.find_user(|u| u.phone.as_ref() == Some(phone)))
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.find_user(|u| u.email.as_ref() == Some(email)).is_some())
    }

    async fn exists_by_phone(&self, phone: &PhoneNumber) -> AuthResult<bool> {
        Ok(self.find_user(|u| u.phone.as_ref() == Some(phone)).is_some())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        self.users.lock().unwrap().insert(*user.user_id.as_uuid(), user.clone());
        Ok(())
    }
}

impl AuthRepository for MemoryStore {
    async fn create(&self, auth: &Auth) -> AuthResult<()> {
        self.auths.lock().unwrap().insert(*auth.user_id.as_uuid(), auth.clone());
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>> {
        Ok(self.auths.lock().unwrap().get(user_id.as_uuid()).cloned())
    }

    async fn update(&self, auth: &Auth) -> AuthResult<()> {
        self.auths.lock().unwrap().insert(*auth.user_id.as_uuid(), auth.clone());
        Ok(())
    }
}

impl AuthSessionRepository for MemoryStore {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        self.sessions.lock().unwrap().insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let sessions = self.sessions.lock().unwrap();
        match sessions.get(&session_id) {
            Some(s) if s.is_expired() => Ok(None),
            Some(s) if s.client_fingerprint_hash != fingerprint_hash => {
                Err(AuthError::SessionFingerprintMismatch)
            }
            Some(s) => Ok(Some(s.clone())),
            None => Ok(None),
        }
    }

    async fn update(&self, session: &AuthSession) -> AuthResult<()> {
        if let Some(s) = self.sessions.lock().unwrap().get_mut(&session.session_id) {
            s.expires_at_ms = session.expires_at_ms;
            s.last_activity_at = session.last_activity_at;
        }
        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.sessions.lock().unwrap().remove(&session_id);
        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: &UserId, except: Option<Uuid>) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|id, s| s.user_id != *user_id || Some(*id) == except);
        Ok((before - sessions.len()) as u64)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        Ok((before - sessions.len()) as u64)
    }
}

impl VerificationCodeRepository for MemoryStore {
    async fn create(&self, code: &VerificationCode) -> AuthResult<()> {
        self.codes.lock().unwrap().push(code.clone());
        Ok(())
    }

    async fn find_latest(
        &self,
        user_id: &UserId,
        purpose: VerificationPurpose,
    ) -> AuthResult<Option<VerificationCode>> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == *user_id && c.purpose == purpose)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn record_failure(&self, code_id: Uuid) -> AuthResult<Option<u16>> {
        let mut codes = self.codes.lock().unwrap();
        Ok(codes
            .iter_mut()
            .find(|c| c.code_id == code_id && c.consumed_at.is_none() && c.attempts < c.max_attempts)
            .map(|c| {
                c.attempts += 1;
                c.attempts
            }))
    }

    async fn consume(&self, code_id: Uuid, now: DateTime<Utc>) -> AuthResult<bool> {
        let mut codes = self.codes.lock().unwrap();
        let open = codes.iter_mut().find(|c| {
            c.code_id == code_id
                && c.consumed_at.is_none()
                && c.attempts < c.max_attempts
                && c.expires_at > now
        });
        Ok(match open {
            Some(c) => {
                c.consumed_at = Some(now);
                true
            }
            None => false,
        })
    }

    async fn invalidate_active(
        &self,
        user_id: &UserId,
        purpose: VerificationPurpose,
    ) -> AuthResult<u64> {
        let mut n = 0;
        for c in self.codes.lock().unwrap().iter_mut() {
            if c.user_id == *user_id && c.purpose == purpose && c.consumed_at.is_none() {
                c.consumed_at = Some(Utc::now());
                n += 1;
            }
        }
        Ok(n)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = Utc::now();
        let mut codes = self.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|c| c.consumed_at.is_none() && c.expires_at > now);
        Ok((before - codes.len()) as u64)
    }
}

/// Records every delivery; SMS can be made to fail
#[derive(Default)]
struct RecordingNotifier {
    fail_sms: bool,
    sent: Mutex<Vec<(OtpChannel, String, String)>>,
}

impl RecordingNotifier {
    fn failing_sms() -> Self {
        Self {
            fail_sms: true,
            ..Default::default()
        }
    }

    fn last_code(&self) -> String {
        self.sent.lock().unwrap().last().map(|(_, _, c)| c.clone()).unwrap()
    }

    fn deliveries(&self) -> Vec<(OtpChannel, String)> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(ch, dest, _)| (*ch, dest.clone()))
            .collect()
    }
}

impl OtpNotifier for RecordingNotifier {
    async fn send(
        &self,
        channel: OtpChannel,
        destination: &str,
        _purpose: VerificationPurpose,
        code: &OtpCode,
    ) -> Result<(), NotifyError> {
        if channel == OtpChannel::Sms && self.fail_sms {
            return Err(NotifyError::Delivery("gateway timeout".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel, destination.to_string(), code.as_str().to_string()));
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

struct Harness {
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    limiter: Arc<SlidingWindowLimiter>,
    config: Arc<AuthConfig>,
}

impl Harness {
    fn new() -> Self {
        Self::with(AuthConfig::development(), RecordingNotifier::default())
    }

    fn with(config: AuthConfig, notifier: RecordingNotifier) -> Self {
        Self {
            store: Arc::new(MemoryStore::default()),
            notifier: Arc::new(notifier),
            limiter: Arc::new(SlidingWindowLimiter::new()),
            config: Arc::new(config),
        }
    }

    async fn sign_up(&self, email: Option<&str>, phone: Option<&str>, account_type: &str) -> AuthResult<String> {
        SignUpUseCase::new(self.store.clone(), self.store.clone(), self.config.clone())
            .execute(SignUpInput {
                email: email.map(str::to_string),
                phone: phone.map(str::to_string),
                display_name: "Meera Iyer".to_string(),
                password: PASSWORD.to_string(),
                account_type: account_type.to_string(),
            })
            .await
            .map(|o| o.public_id)
    }

    async fn sign_in(&self, identifier: &str, password: &str) -> AuthResult<SignInOutput> {
        SignInUseCase::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.config.clone(),
        )
        .execute(
            SignInInput {
                identifier: identifier.to_string(),
                password: password.to_string(),
                remember_me: false,
            },
            fingerprint(UA),
        )
        .await
    }

    async fn request_otp(&self, identifier: &str, purpose: VerificationPurpose) -> AuthResult<RequestOtpOutput> {
        RequestOtpUseCase::new(
            self.store.clone(),
            self.store.clone(),
            self.notifier.clone(),
            self.limiter.clone(),
            self.config.clone(),
        )
        .execute(RequestOtpInput {
            identifier: identifier.to_string(),
            purpose,
        })
        .await
    }

    async fn verify_otp(
        &self,
        identifier: &str,
        purpose: VerificationPurpose,
        code: &str,
    ) -> AuthResult<VerifyOtpOutput> {
        VerifyOtpUseCase::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.config.clone(),
        )
        .execute(
            VerifyOtpInput {
                identifier: identifier.to_string(),
                purpose,
                code: code.to_string(),
                remember_me: false,
            },
            fingerprint(UA),
        )
        .await
    }

    fn check_session(&self) -> CheckSessionUseCase<MemoryStore, MemoryStore> {
        CheckSessionUseCase::new(self.store.clone(), self.store.clone(), self.config.clone())
    }

    fn user(&self, public_id: &str) -> User {
        self.store.find_user(|u| u.public_id.as_str() == public_id).unwrap()
    }

    fn router(&self) -> Router {
        let state = AuthAppState {
            repo: self.store.clone(),
            notifier: self.notifier.clone(),
            limiter: self.limiter.clone(),
            config: self.config.clone(),
        };
        auth_router_generic(state).layer(axum::middleware::from_fn_with_state(
            AuthMiddlewareState::new(self.store.clone(), self.config.clone()),
            attach_current_user::<MemoryStore>,
        ))
    }
}

fn fingerprint(ua: &str) -> ClientFingerprint {
    let mut headers = axum::http::HeaderMap::new();
    headers.insert(header::USER_AGENT, ua.parse().unwrap());
    extract_fingerprint(&headers, None).unwrap()
}

fn admin(user: &User) -> CurrentUser {
    CurrentUser {
        role: UserRole::Admin,
        ..user.to_current_user()
    }
}

// ============================================================================
// Sign up / sign in
// ============================================================================

#[tokio::test]
async fn test_sign_up_rejects_duplicates_and_bad_input() {
    let h = Harness::new();
    h.sign_up(Some("meera@example.com"), Some("98765 43210"), "agent")
        .await
        .unwrap();

    let dup = h.sign_up(Some("MEERA@example.com"), None, "").await.unwrap_err();
    assert!(matches!(dup, AuthError::EmailTaken));

    let dup = h.sign_up(None, Some("+91 98765-43210"), "").await.unwrap_err();
    assert!(matches!(dup, AuthError::PhoneTaken));

    let err = h.sign_up(Some("x@example.com"), None, "admin").await.unwrap_err();
    assert_eq!(err.code(), Some("INVALID_ACCOUNT_TYPE"));

    let err = h.sign_up(Some(""), Some("  "), "").await.unwrap_err();
    assert_eq!(err.code(), Some("CONTACT_REQUIRED"));
}

#[tokio::test]
async fn test_sign_in_by_email_or_phone() {
    let h = Harness::new();
    let public_id = h
        .sign_up(Some("meera@example.com"), Some("9876543210"), "builder")
        .await
        .unwrap();

    let out = h.sign_in("meera@example.com", PASSWORD).await.unwrap();
    assert_eq!(out.public_id, public_id);
    assert_eq!(out.role, UserRole::Builder);
    assert_eq!(out.max_age_secs, 12 * 3600);

    let out = h.sign_in("+919876543210", PASSWORD).await.unwrap();
    assert_eq!(out.public_id, public_id);
    assert_eq!(h.store.session_count(), 2);
    assert!(h.user(&public_id).last_login_at.is_some());

    let err = h.sign_in("nobody@example.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_lockout_after_repeated_failures() {
    let h = Harness::new();
    h.sign_up(Some("meera@example.com"), None, "").await.unwrap();

    for _ in 0..Auth::MAX_LOGIN_FAILURES {
        let err = h.sign_in("meera@example.com", "Wrong Password 9").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    let err = h.sign_in("meera@example.com", PASSWORD).await.unwrap_err();
    assert!(matches!(err, AuthError::AccountLocked { retry_after_secs } if retry_after_secs > 0));
}

#[tokio::test]
async fn test_session_check_and_sign_out() {
    let h = Harness::new();
    let public_id = h.sign_up(Some("meera@example.com"), None, "").await.unwrap();
    let out = h.sign_in("meera@example.com", PASSWORD).await.unwrap();

    let info = h
        .check_session()
        .execute(&out.session_token, &fingerprint(UA).hash)
        .await
        .unwrap();
    assert_eq!(info.public_id, public_id);
    assert!(!info.verified);

    let err = h
        .check_session()
        .execute(&out.session_token, &fingerprint("curl/8.0").hash)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::SessionFingerprintMismatch));

    SignOutUseCase::new(h.store.clone(), h.config.clone())
        .execute(&out.session_token)
        .await
        .unwrap();
    let err = h
        .check_session()
        .execute(&out.session_token, &fingerprint(UA).hash)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::SessionInvalid));
}

// ============================================================================
// OTP
// ============================================================================

#[tokio::test]
async fn test_unknown_identifier_is_silent() {
    let h = Harness::new();
    let out = h
        .request_otp("ghost@example.com", VerificationPurpose::SignIn)
        .await
        .unwrap();
    assert_eq!(out.expires_in_secs, 600);
    assert!(h.notifier.deliveries().is_empty());
}

#[tokio::test]
async fn test_verify_email_flow() {
    let h = Harness::new();
    let public_id = h.sign_up(Some("meera@example.com"), None, "").await.unwrap();

    h.request_otp("meera@example.com", VerificationPurpose::VerifyEmail)
        .await
        .unwrap();
    assert_eq!(
        h.notifier.deliveries(),
        vec![(OtpChannel::Email, "meera@example.com".to_string())]
    );

    let stored = h.store.latest_code(VerificationPurpose::VerifyEmail);
    assert_ne!(stored.code_hash, h.notifier.last_code().into_bytes());

    let out = h
        .verify_otp("meera@example.com", VerificationPurpose::VerifyEmail, &h.notifier.last_code())
        .await
        .unwrap();
    assert!(out.email_verified);
    assert!(out.session.is_none());
    assert!(h.user(&public_id).is_verified());

    // Already verified: nothing more to send
    let err = h
        .request_otp("meera@example.com", VerificationPurpose::VerifyEmail)
        .await;
    assert!(matches!(err, Err(AuthError::OtpCooldown { .. }) | Err(AuthError::AlreadyVerified(_))));
}

#[tokio::test]
async fn test_sign_in_code_falls_back_to_email() {
    let h = Harness::with(AuthConfig::development(), RecordingNotifier::failing_sms());
    let public_id = h
        .sign_up(Some("meera@example.com"), Some("9876543210"), "")
        .await
        .unwrap();

    h.request_otp("9876543210", VerificationPurpose::SignIn).await.unwrap();
    assert_eq!(h.notifier.deliveries()[0].0, OtpChannel::Email);
    assert_eq!(h.store.latest_code(VerificationPurpose::SignIn).channel, OtpChannel::Email);

    let out = h
        .verify_otp("+919876543210", VerificationPurpose::SignIn, &h.notifier.last_code())
        .await
        .unwrap();
    assert!(out.session.is_some());
    // The code went to the inbox, so that is what got proven
    assert!(out.email_verified);
    assert!(!out.phone_verified);
    assert_eq!(out.public_id, public_id);
    assert_eq!(h.store.session_count(), 1);
}

#[tokio::test]
async fn test_delivery_failure_on_every_channel() {
    let h = Harness::with(AuthConfig::development(), RecordingNotifier::failing_sms());
    h.sign_up(None, Some("9876543210"), "").await.unwrap();

    let err = h
        .request_otp("9876543210", VerificationPurpose::SignIn)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DeliveryFailed));
    assert!(h.store.codes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cooldown_and_rate_limit() {
    let h = Harness::new();
    h.sign_up(Some("meera@example.com"), None, "").await.unwrap();

    h.request_otp("meera@example.com", VerificationPurpose::SignIn).await.unwrap();
    let err = h
        .request_otp("meera@example.com", VerificationPurpose::SignIn)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::OtpCooldown { retry_after_secs } if retry_after_secs > 0));

    let config = AuthConfig {
        otp_resend_cooldown: std::time::Duration::ZERO,
        otp_rate_limit: RateLimitConfig::new(2, 900),
        ..AuthConfig::development()
    };
    let h = Harness::with(config, RecordingNotifier::default());
    h.sign_up(Some("meera@example.com"), None, "").await.unwrap();

    for _ in 0..2 {
        h.request_otp("meera@example.com", VerificationPurpose::SignIn).await.unwrap();
    }
    let err = h
        .request_otp("meera@example.com", VerificationPurpose::SignIn)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::OtpRateLimited { .. }));

    // Only the newest code is live
    let codes = h.store.codes.lock().unwrap();
    assert_eq!(codes.iter().filter(|c| c.consumed_at.is_none()).count(), 1);
}

#[tokio::test]
async fn test_wrong_codes_burn_the_code() {
    let h = Harness::new();
    h.sign_up(Some("meera@example.com"), None, "").await.unwrap();
    h.request_otp("meera@example.com", VerificationPurpose::VerifyEmail)
        .await
        .unwrap();
    let right = h.notifier.last_code();
    let wrong = if right == "000000" { "111111" } else { "000000" };

    for _ in 0..h.config.otp_max_attempts - 1 {
        let err = h
            .verify_otp("meera@example.com", VerificationPurpose::VerifyEmail, wrong)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::OtpInvalid));
    }
    let err = h
        .verify_otp("meera@example.com", VerificationPurpose::VerifyEmail, wrong)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::OtpExhausted));

    let err = h
        .verify_otp("meera@example.com", VerificationPurpose::VerifyEmail, &right)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::OtpExhausted));
}

#[tokio::test]
async fn test_stale_failure_cannot_reopen_used_code() {
    let h = Harness::new();
    h.sign_up(Some("meera@example.com"), None, "").await.unwrap();
    h.request_otp("meera@example.com", VerificationPurpose::SignIn)
        .await
        .unwrap();
    let right = h.notifier.last_code();
    let wrong = if right == "000000" { "111111" } else { "000000" };

    // Two requests load the same open code
    let mut late = h.store.latest_code(VerificationPurpose::SignIn);

    h.verify_otp("meera@example.com", VerificationPurpose::SignIn, &right)
        .await
        .unwrap();

    // The slower one guessed wrong against its stale copy
    let rejection = late.attempt(&h.config.session_secret, &OtpCode::parse(wrong).unwrap(), Utc::now());
    assert!(rejection.is_err());
    assert_eq!(h.store.record_failure(late.code_id).await.unwrap(), None);
    assert!(h.store.latest_code(VerificationPurpose::SignIn).consumed_at.is_some());

    let err = h
        .verify_otp("meera@example.com", VerificationPurpose::SignIn, &right)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::OtpExpired));
    assert_eq!(h.store.session_count(), 1);
}

#[tokio::test]
async fn test_parallel_wrong_guesses_respect_attempt_cap() {
    let h = Harness::new();
    h.sign_up(Some("meera@example.com"), None, "").await.unwrap();
    h.request_otp("meera@example.com", VerificationPurpose::VerifyEmail)
        .await
        .unwrap();
    let code = h.store.latest_code(VerificationPurpose::VerifyEmail);
    let cap = code.max_attempts;

    // Every guess read attempts = 0; the store still counts each one
    let mut counted = Vec::new();
    for _ in 0..cap + 3 {
        counted.push(h.store.record_failure(code.code_id).await.unwrap());
    }
    let expected: Vec<Option<u16>> = (1..=cap)
        .map(Some)
        .chain(std::iter::repeat_n(None, 3))
        .collect();
    assert_eq!(counted, expected);

    assert_eq!(h.store.latest_code(VerificationPurpose::VerifyEmail).attempts, cap);
    assert!(!h.store.consume(code.code_id, Utc::now()).await.unwrap());
}

#[tokio::test]
async fn test_expired_code() {
    let h = Harness::new();
    h.sign_up(Some("meera@example.com"), None, "").await.unwrap();
    h.request_otp("meera@example.com", VerificationPurpose::VerifyEmail)
        .await
        .unwrap();

    for c in h.store.codes.lock().unwrap().iter_mut() {
        c.expires_at = Utc::now() - chrono::Duration::seconds(1);
    }

    let err = h
        .verify_otp("meera@example.com", VerificationPurpose::VerifyEmail, &h.notifier.last_code())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::OtpExpired));
}

#[tokio::test]
async fn test_reset_password_revokes_sessions() {
    let h = Harness::new();
    h.sign_up(Some("meera@example.com"), None, "").await.unwrap();
    h.sign_in("meera@example.com", PASSWORD).await.unwrap();
    assert_eq!(h.store.session_count(), 1);

    h.request_otp("meera@example.com", VerificationPurpose::ResetPassword)
        .await
        .unwrap();
    let code = h.notifier.last_code();

    // Reset codes are not accepted by the generic verify endpoint
    let err = h
        .verify_otp("meera@example.com", VerificationPurpose::ResetPassword, &code)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some("USE_RESET_ENDPOINT"));

    let reset = ResetPasswordUseCase::new(h.store.clone(), h.config.clone());

    // A weak password leaves the code usable
    let err = reset
        .execute(ResetPasswordInput {
            identifier: "meera@example.com".to_string(),
            code: code.clone(),
            new_password: "short".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some("WEAK_PASSWORD"));

    reset
        .execute(ResetPasswordInput {
            identifier: "meera@example.com".to_string(),
            code,
            new_password: "Lakeside Duplex 48".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(h.store.session_count(), 0);
    assert!(h.sign_in("meera@example.com", PASSWORD).await.is_err());
    assert!(h.sign_in("meera@example.com", "Lakeside Duplex 48").await.is_ok());
}

#[tokio::test]
async fn test_set_role_is_admin_only() {
    let h = Harness::new();
    let target = h.sign_up(Some("agent@example.com"), None, "agent").await.unwrap();
    let actor = h.sign_up(Some("ops@example.com"), None, "").await.unwrap();
    let actor = h.user(&actor);

    let use_case = SetRoleUseCase::new(h.store.clone());

    let err = use_case
        .execute(&actor.to_current_user(), &target, "moderator")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), crate::ErrorKind::Forbidden);

    let role = use_case
        .execute(&admin(&actor), &target, "moderator")
        .await
        .unwrap();
    assert_eq!(role, UserRole::Moderator);
    assert_eq!(h.user(&target).role, UserRole::Moderator);

    let err = use_case
        .execute(&admin(&actor), actor.public_id.as_str(), "member")
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some("SELF_ROLE_CHANGE"));

    let err = use_case
        .execute(&admin(&actor), &target, "superuser")
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some("INVALID_ROLE"));
}

// ============================================================================
// Router
// ============================================================================

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, UA)
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_router_sign_up_sign_in_me() {
    let h = Harness::new();
    let app = h.router();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/signup",
            serde_json::json!({
                "email": "meera@example.com",
                "displayName": "Meera Iyer",
                "password": PASSWORD,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let public_id = body_json(response).await["publicId"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/signin",
            serde_json::json!({ "identifier": "meera@example.com", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("estate_session="));
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::USER_AGENT, UA)
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["publicId"], public_id.as_str());
    assert_eq!(me["role"], "member");
    assert_eq!(me["emailVerified"], false);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/me")
                .header(header::USER_AGENT, UA)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_router_status_and_errors() {
    let h = Harness::new();
    let app = h.router();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/status")
                .header(header::COOKIE, "estate_session=forged.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["authenticated"], false);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/signin",
            serde_json::json!({ "identifier": "ghost@example.com", "password": PASSWORD }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "INVALID_CREDENTIALS");

    let response = app
        .oneshot(json_request(
            "POST",
            "/otp/request",
            serde_json::json!({ "identifier": "ghost@example.com", "purpose": "sign_in" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}
