//! User Entity
//!
//! Profile and contact data. Credentials live in [`super::auth::Auth`].

use chrono::{DateTime, Utc};
use kernel::actor::CurrentUser;
use kernel::error::app_error::{AppError, AppResult};

use crate::domain::value_object::{
    display_name::DisplayName, email::Email, phone_number::PhoneNumber, public_id::PublicId,
    user_id::UserId, user_role::UserRole, user_status::UserStatus,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub public_id: PublicId,
    pub email: Option<Email>,
    pub phone: Option<PhoneNumber>,
    pub display_name: DisplayName,
    pub role: UserRole,
    pub status: UserStatus,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// At least one contact point is required
    pub fn new(
        email: Option<Email>,
        phone: Option<PhoneNumber>,
        display_name: DisplayName,
        role: UserRole,
    ) -> AppResult<Self> {
        if email.is_none() && phone.is_none() {
            return Err(AppError::bad_request("An email address or phone number is required")
                .with_code("CONTACT_REQUIRED"));
        }

        let now = Utc::now();
        Ok(Self {
            user_id: UserId::new(),
            public_id: PublicId::new(),
            email,
            phone,
            display_name,
            role,
            status: UserStatus::default(),
            email_verified: false,
            phone_verified: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Verified means at least one contact point was confirmed by OTP
    pub fn is_verified(&self) -> bool {
        self.email_verified || self.phone_verified
    }

    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_email_verified(&mut self) {
        if self.email.is_some() {
            self.email_verified = true;
            self.updated_at = Utc::now();
        }
    }

    pub fn mark_phone_verified(&mut self) {
        if self.phone.is_some() {
            self.phone_verified = true;
            self.updated_at = Utc::now();
        }
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn set_status(&mut self, status: UserStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// The request-scoped actor other domains see
    pub fn to_current_user(&self) -> CurrentUser {
        CurrentUser {
            user_id: *self.user_id.as_uuid(),
            public_id: self.public_id.to_string(),
            role: self.role,
            verified: self.is_verified(),
        }
    }
}
