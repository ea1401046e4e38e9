//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    auth::Auth, auth_session::AuthSession, user::User, verification_code::VerificationCode,
};
use crate::domain::repository::{
    AuthRepository, AuthSessionRepository, UserRepository, VerificationCodeRepository,
};
use crate::domain::value_object::{
    display_name::DisplayName,
    email::Email,
    otp::{OtpChannel, VerificationPurpose},
    phone_number::PhoneNumber,
    public_id::PublicId,
    user_id::UserId,
    user_password::UserPassword,
    user_role::UserRole,
    user_status::UserStatus,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    user_id,
    public_id,
    email,
    phone,
    display_name,
    user_role,
    user_status,
    email_verified,
    phone_verified,
    last_login_at,
    created_at,
    updated_at
"#;

const CODE_COLUMNS: &str = r#"
    code_id,
    user_id,
    purpose,
    channel,
    code_hash,
    attempts,
    max_attempts,
    expires_at,
    consumed_at,
    created_at
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete expired sessions and dead verification codes
    pub async fn cleanup_expired(&self) -> AuthResult<(u64, u64)> {
        let sessions = AuthSessionRepository::cleanup_expired(self).await?;
        let codes = VerificationCodeRepository::cleanup_expired(self).await?;

        tracing::info!(
            sessions_deleted = sessions,
            codes_deleted = codes,
            "Cleaned up expired auth state"
        );

        Ok((sessions, codes))
    }

    async fn find_user_where(&self, clause: &str, value: &str) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                public_id,
                email,
                phone,
                display_name,
                user_role,
                user_status,
                email_verified,
                phone_verified,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.public_id.as_str())
        .bind(user.email.as_ref().map(|e| e.as_str()))
        .bind(user.phone.as_ref().map(|p| p.as_str()))
        .bind(user.display_name.as_str())
        .bind(user.role.id())
        .bind(user.status.id())
        .bind(user.email_verified)
        .bind(user.phone_verified)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_public_id(&self, public_id: &PublicId) -> AuthResult<Option<User>> {
        self.find_user_where("public_id", public_id.as_str()).await
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        self.find_user_where("email", email.as_str()).await
    }

    async fn find_by_phone(&self, phone: &PhoneNumber) -> AuthResult<Option<User>> {
        self.find_user_where("phone", phone.as_str()).await
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_phone(&self, phone: &PhoneNumber) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)")
                .bind(phone.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                phone = $3,
                display_name = $4,
                user_role = $5,
                user_status = $6,
                email_verified = $7,
                phone_verified = $8,
                last_login_at = $9,
                updated_at = $10
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_ref().map(|e| e.as_str()))
        .bind(user.phone.as_ref().map(|p| p.as_str()))
        .bind(user.display_name.as_str())
        .bind(user.role.id())
        .bind(user.status.id())
        .bind(user.email_verified)
        .bind(user.phone_verified)
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Auth Repository Implementation
// ============================================================================

impl AuthRepository for PgAuthRepository {
    async fn create(&self, auth: &Auth) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_credentials (
                user_id,
                password_hash,
                login_failed_count,
                last_failed_at,
                locked_until,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(auth.user_id.as_uuid())
        .bind(auth.password_hash.as_phc_string())
        .bind(auth.login_failed_count as i16)
        .bind(auth.last_failed_at)
        .bind(auth.locked_until)
        .bind(auth.created_at)
        .bind(auth.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<Auth>> {
        let row = sqlx::query_as::<_, AuthRow>(
            r#"
            SELECT
                user_id,
                password_hash,
                login_failed_count,
                last_failed_at,
                locked_until,
                created_at,
                updated_at
            FROM auth_credentials
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_auth()).transpose()
    }

    async fn update(&self, auth: &Auth) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_credentials SET
                password_hash = $2,
                login_failed_count = $3,
                last_failed_at = $4,
                locked_until = $5,
                updated_at = $6
            WHERE user_id = $1
            "#,
        )
        .bind(auth.user_id.as_uuid())
        .bind(auth.password_hash.as_phc_string())
        .bind(auth.login_failed_count as i16)
        .bind(auth.last_failed_at)
        .bind(auth.locked_until)
        .bind(auth.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Auth Session Repository Implementation
// ============================================================================

impl AuthSessionRepository for PgAuthRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auth_sessions (
                session_id,
                user_id,
                public_id,
                expires_at_ms,
                remember_me,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session.session_id)
        .bind(session.user_id.as_uuid())
        .bind(session.public_id.as_str())
        .bind(session.expires_at_ms)
        .bind(session.remember_me)
        .bind(&session.client_fingerprint_hash)
        .bind(&session.client_ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        session_id: Uuid,
        fingerprint_hash: &[u8],
    ) -> AuthResult<Option<AuthSession>> {
        let now_ms = Utc::now().timestamp_millis();

        let row = sqlx::query_as::<_, AuthSessionRow>(
            r#"
            SELECT
                session_id,
                user_id,
                public_id,
                expires_at_ms,
                remember_me,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at
            FROM auth_sessions
            WHERE session_id = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(session_id)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => {
                if r.client_fingerprint_hash != fingerprint_hash {
                    return Err(AuthError::SessionFingerprintMismatch);
                }
                Ok(Some(r.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, session: &AuthSession) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE auth_sessions SET
                expires_at_ms = $2,
                last_activity_at = $3
            WHERE session_id = $1
            "#,
        )
        .bind(session.session_id)
        .bind(session.expires_at_ms)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: &UserId, except: Option<Uuid>) -> AuthResult<u64> {
        let deleted = match except {
            Some(except_id) => {
                sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1 AND session_id != $2")
                    .bind(user_id.as_uuid())
                    .bind(except_id)
                    .execute(&self.pool)
                    .await?
                    .rows_affected()
            }
            None => {
                sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
                    .bind(user_id.as_uuid())
                    .execute(&self.pool)
                    .await?
                    .rows_affected()
            }
        };

        Ok(deleted)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM auth_sessions WHERE expires_at_ms < $1")
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Verification Code Repository Implementation
// ============================================================================

impl VerificationCodeRepository for PgAuthRepository {
    async fn create(&self, code: &VerificationCode) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO verification_codes (
                code_id,
                user_id,
                purpose,
                channel,
                code_hash,
                attempts,
                max_attempts,
                expires_at,
                consumed_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(code.code_id)
        .bind(code.user_id.as_uuid())
        .bind(code.purpose.id())
        .bind(code.channel.id())
        .bind(&code.code_hash)
        .bind(code.attempts as i16)
        .bind(code.max_attempts as i16)
        .bind(code.expires_at)
        .bind(code.consumed_at)
        .bind(code.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_latest(
        &self,
        user_id: &UserId,
        purpose: VerificationPurpose,
    ) -> AuthResult<Option<VerificationCode>> {
        let sql = format!(
            "SELECT {CODE_COLUMNS} FROM verification_codes \
             WHERE user_id = $1 AND purpose = $2 \
             ORDER BY created_at DESC LIMIT 1"
        );
        let row = sqlx::query_as::<_, VerificationCodeRow>(&sql)
            .bind(user_id.as_uuid())
            .bind(purpose.id())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_code()).transpose()
    }

    async fn record_failure(&self, code_id: Uuid) -> AuthResult<Option<u16>> {
        let attempts: Option<i16> = sqlx::query_scalar(
            r#"
            UPDATE verification_codes SET attempts = attempts + 1
            WHERE code_id = $1
              AND consumed_at IS NULL
              AND attempts < max_attempts
            RETURNING attempts
            "#,
        )
        .bind(code_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempts.map(|n| n.max(0) as u16))
    }

    async fn consume(&self, code_id: Uuid, now: DateTime<Utc>) -> AuthResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE verification_codes SET consumed_at = $2
            WHERE code_id = $1
              AND consumed_at IS NULL
              AND attempts < max_attempts
              AND expires_at > $2
            "#,
        )
        .bind(code_id)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn invalidate_active(
        &self,
        user_id: &UserId,
        purpose: VerificationPurpose,
    ) -> AuthResult<u64> {
        let updated = sqlx::query(
            r#"
            UPDATE verification_codes SET consumed_at = now()
            WHERE user_id = $1 AND purpose = $2 AND consumed_at IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(purpose.id())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query(
            "DELETE FROM verification_codes WHERE expires_at < now() OR consumed_at IS NOT NULL",
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    public_id: String,
    email: Option<String>,
    phone: Option<String>,
    display_name: String,
    user_role: i16,
    user_status: i16,
    email_verified: bool,
    phone_verified: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let public_id = PublicId::parse_str(&self.public_id)
            .map_err(|e| AuthError::Internal(format!("Invalid public_id: {e}")))?;
        let role = UserRole::from_id(self.user_role)
            .ok_or_else(|| AuthError::Internal(format!("Unknown role id {}", self.user_role)))?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            public_id,
            email: self.email.map(Email::from_db),
            phone: self.phone.map(PhoneNumber::from_db),
            display_name: DisplayName::from_db(self.display_name),
            role,
            status: UserStatus::from_id(self.user_status).unwrap_or_default(),
            email_verified: self.email_verified,
            phone_verified: self.phone_verified,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthRow {
    user_id: Uuid,
    password_hash: String,
    login_failed_count: i16,
    last_failed_at: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AuthRow {
    fn into_auth(self) -> AuthResult<Auth> {
        Ok(Auth {
            user_id: UserId::from_uuid(self.user_id),
            password_hash: UserPassword::from_phc_string(self.password_hash)?,
            login_failed_count: self.login_failed_count.max(0) as u16,
            last_failed_at: self.last_failed_at,
            locked_until: self.locked_until,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthSessionRow {
    session_id: Uuid,
    user_id: Uuid,
    public_id: String,
    expires_at_ms: i64,
    remember_me: bool,
    client_fingerprint_hash: Vec<u8>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl AuthSessionRow {
    fn into_session(self) -> AuthResult<AuthSession> {
        let public_id = PublicId::parse_str(&self.public_id)
            .map_err(|e| AuthError::Internal(format!("Invalid public_id: {e}")))?;

        Ok(AuthSession {
            session_id: self.session_id,
            user_id: UserId::from_uuid(self.user_id),
            public_id,
            expires_at_ms: self.expires_at_ms,
            remember_me: self.remember_me,
            client_fingerprint_hash: self.client_fingerprint_hash,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct VerificationCodeRow {
    code_id: Uuid,
    user_id: Uuid,
    purpose: i16,
    channel: i16,
    code_hash: Vec<u8>,
    attempts: i16,
    max_attempts: i16,
    expires_at: DateTime<Utc>,
    consumed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl VerificationCodeRow {
    fn into_code(self) -> AuthResult<VerificationCode> {
        let purpose = VerificationPurpose::from_id(self.purpose)
            .ok_or_else(|| AuthError::Internal(format!("Unknown purpose id {}", self.purpose)))?;
        let channel = OtpChannel::from_id(self.channel)
            .ok_or_else(|| AuthError::Internal(format!("Unknown channel id {}", self.channel)))?;

        Ok(VerificationCode {
            code_id: self.code_id,
            user_id: UserId::from_uuid(self.user_id),
            purpose,
            channel,
            code_hash: self.code_hash,
            attempts: self.attempts.max(0) as u16,
            max_attempts: self.max_attempts.max(0) as u16,
            expires_at: self.expires_at,
            consumed_at: self.consumed_at,
            created_at: self.created_at,
        })
    }
}
