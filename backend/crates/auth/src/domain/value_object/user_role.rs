//! Roles
//!
//! The role vocabulary is shared with every domain through the kernel.
//! Sign-up only offers the self-assignable subset as an account type.

pub use kernel::actor::Role as UserRole;

use kernel::error::app_error::{AppError, AppResult};

/// Account type chosen at sign-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountType {
    #[default]
    Member,
    Agent,
    Builder,
}

impl AccountType {
    pub fn parse(code: &str) -> AppResult<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "" | "member" => Ok(Self::Member),
            "agent" => Ok(Self::Agent),
            "builder" => Ok(Self::Builder),
            other => Err(AppError::bad_request(format!(
                "Unknown account type '{other}' (expected member, agent or builder)"
            ))
            .with_code("INVALID_ACCOUNT_TYPE")),
        }
    }

    pub const fn role(&self) -> UserRole {
        match self {
            Self::Member => UserRole::Member,
            Self::Agent => UserRole::Agent,
            Self::Builder => UserRole::Builder,
        }
    }
}

/// Parse a role code for admin role changes
pub fn parse_role(code: &str) -> AppResult<UserRole> {
    UserRole::from_code(code.trim()).ok_or_else(|| {
        AppError::bad_request(format!("Unknown role '{code}'")).with_code("INVALID_ROLE")
    })
}
