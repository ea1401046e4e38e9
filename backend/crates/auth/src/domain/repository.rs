//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entity::{
    auth::Auth, auth_session::AuthSession, user::User, verification_code::VerificationCode,
};
use crate::domain::value_object::{
    email::Email, otp::VerificationPurpose, phone_number::PhoneNumber, public_id::PublicId,
    user_id::UserId,
};
use crate::error::AuthResult;

#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_by_phone(&self, phone: &PhoneNumber) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn exists_by_phone(&self, phone: &PhoneNumber) -> AuthResult<bool>;

    async fn update(&self, user: &User) -> AuthResult<()>;
}

#[trait_variant::make(AuthRepository: Send)]
pub trait LocalAuthRepository {
    async fn create(&self, auth: &Auth) -> AuthResult<()>;

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>>;

    async fn update(&self, auth: &Auth) -> AuthResult<()>;
}

#[trait_variant::make(AuthSessionRepository: Send)]
pub trait LocalAuthSessionRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()>;

    /// Unexpired session; a fingerprint mismatch is an error, not `None`
    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>>;

    /// Persist expiry and last activity
    async fn update(&self, session: &AuthSession) -> AuthResult<()>;

    async fn delete(&self, session_id: Uuid) -> AuthResult<()>;

    /// Delete every session of a user, optionally keeping one
    async fn delete_all_for_user(&self, user_id: &UserId, except: Option<Uuid>) -> AuthResult<u64>;

    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

#[trait_variant::make(VerificationCodeRepository: Send)]
pub trait LocalVerificationCodeRepository {
    async fn create(&self, code: &VerificationCode) -> AuthResult<()>;

    /// Most recently issued code for the purpose, in any state
    async fn find_latest(
        &self,
        user_id: &UserId,
        purpose: VerificationPurpose,
    ) -> AuthResult<Option<VerificationCode>>;

    /// Count one wrong guess against a code that is still unconsumed and
    /// under its attempt cap. Returns the new attempt count, or `None`
    /// when the code was no longer open.
    async fn record_failure(&self, code_id: Uuid) -> AuthResult<Option<u16>>;

    /// Mark an open, unexpired code as used. `false` means another request
    /// consumed or burned it first.
    async fn consume(&self, code_id: Uuid, now: DateTime<Utc>) -> AuthResult<bool>;

    /// Mark every unconsumed code for the purpose as consumed
    async fn invalidate_active(
        &self,
        user_id: &UserId,
        purpose: VerificationPurpose,
    ) -> AuthResult<u64>;

    /// Delete expired and consumed codes
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}

/// Everything the auth handlers need from storage
pub trait AuthStore:
    UserRepository
    + AuthRepository
    + AuthSessionRepository
    + VerificationCodeRepository
    + Send
    + Sync
    + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository
        + AuthRepository
        + AuthSessionRepository
        + VerificationCodeRepository
        + Send
        + Sync
        + 'static
{
}
