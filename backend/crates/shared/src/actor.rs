//! Authenticated actor
//!
//! The auth crate resolves the session cookie into a [`CurrentUser`] and
//! stores it in the request extensions; every other domain reads it back
//! through the extractors below without depending on auth itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::app_error::{AppError, AppResult};

/// Marketplace role
///
/// Member, Agent and Builder are chosen at sign-up. Moderator and Admin
/// are only granted by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum Role {
    #[default]
    Member = 0,
    Agent = 1,
    Builder = 2,
    Moderator = 3,
    Admin = 4,
}

impl Role {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Agent => "agent",
            Role::Builder => "builder",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Role::Member),
            1 => Some(Role::Agent),
            2 => Some(Role::Builder),
            3 => Some(Role::Moderator),
            4 => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "member" => Some(Role::Member),
            "agent" => Some(Role::Agent),
            "builder" => Some(Role::Builder),
            "moderator" => Some(Role::Moderator),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_moderator_or_higher(&self) -> bool {
        matches!(self, Role::Moderator | Role::Admin)
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Roles a user may pick for themselves at sign-up
    #[inline]
    pub const fn can_self_assign(&self) -> bool {
        matches!(self, Role::Member | Role::Agent | Role::Builder)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The user behind the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Internal user UUID (foreign key in every domain table)
    pub user_id: Uuid,
    /// Public nanoid shown in API responses
    pub public_id: String,
    pub role: Role,
    /// Email or phone has been confirmed through an OTP
    pub verified: bool,
}

impl CurrentUser {
    /// Reject unverified accounts (posting, listing, booking)
    pub fn require_verified(&self) -> AppResult<()> {
        if self.verified {
            Ok(())
        } else {
            Err(AppError::forbidden("Account is not verified")
                .with_code("ACCOUNT_NOT_VERIFIED")
                .with_action("Verify your email address or phone number first"))
        }
    }

    /// Require one of the given roles (admins always pass)
    pub fn require_role(&self, allowed: &[Role]) -> AppResult<()> {
        if self.role.is_admin() || allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{}' is not allowed to perform this action",
                self.role
            ))
            .with_code("ROLE_REQUIRED"))
        }
    }

    pub fn require_moderator(&self) -> AppResult<()> {
        self.require_role(&[Role::Moderator])
    }

    pub fn require_admin(&self) -> AppResult<()> {
        self.require_role(&[])
    }

    /// Owner of the resource, or moderator+
    pub fn can_manage(&self, owner_id: &Uuid) -> bool {
        &self.user_id == owner_id || self.role.is_moderator_or_higher()
    }
}

#[cfg(feature = "axum")]
mod extract {
    use axum::extract::{FromRequestParts, OptionalFromRequestParts};
    use http::request::Parts;
    use std::convert::Infallible;

    use super::CurrentUser;
    use crate::error::app_error::AppError;

    impl<S> FromRequestParts<S> for CurrentUser
    where
        S: Send + Sync,
    {
        type Rejection = AppError;

        async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
            parts
                .extensions
                .get::<CurrentUser>()
                .cloned()
                .ok_or_else(|| {
                    AppError::unauthorized("Authentication required")
                        .with_code("AUTH_REQUIRED")
                        .with_action("Please sign in")
                })
        }
    }

    impl<S> OptionalFromRequestParts<S> for CurrentUser
    where
        S: Send + Sync,
    {
        type Rejection = Infallible;

        async fn from_request_parts(
            parts: &mut Parts,
            _state: &S,
        ) -> Result<Option<Self>, Self::Rejection> {
            Ok(parts.extensions.get::<CurrentUser>().cloned())
        }
    }
}
