//! User Status
//!
//! Two states only. Temporary lockouts after failed sign-ins live on the
//! `Auth` credentials, not here.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum UserStatus {
    /// Can sign in and use every feature the role allows
    #[default]
    Active = 0,

    /// Disabled by an admin; sessions are no longer honoured
    Disabled = 1,
}

impl UserStatus {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
        }
    }

    #[inline]
    pub const fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Active),
            1 => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
