//! Set Role Use Case
//!
//! Admin-only role assignment. Moderator and Admin can only be granted
//! here.

use std::sync::Arc;

use kernel::actor::CurrentUser;
use kernel::error::app_error::AppError;

use crate::domain::repository::UserRepository;
use crate::domain::value_object::{public_id::PublicId, user_role::{parse_role, UserRole}};
use crate::error::{AuthError, AuthResult};

pub struct SetRoleUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> SetRoleUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(
        &self,
        actor: &CurrentUser,
        public_id: &str,
        role: &str,
    ) -> AuthResult<UserRole> {
        actor.require_admin()?;
        let role = parse_role(role)?;
        let public_id = PublicId::parse_str(public_id)?;

        let mut user = self
            .user_repo
            .find_by_public_id(&public_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if *user.user_id.as_uuid() == actor.user_id {
            return Err(AppError::forbidden("Admins cannot change their own role")
                .with_code("SELF_ROLE_CHANGE")
                .into());
        }

        let previous = user.role;
        user.set_role(role);
        self.user_repo.update(&user).await?;

        tracing::info!(
            public_id = %user.public_id,
            from = %previous,
            to = %role,
            by = %actor.public_id,
            "Role changed"
        );

        Ok(role)
    }
}
