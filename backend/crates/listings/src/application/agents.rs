//! Agent Directory Use Cases

use std::sync::Arc;

use kernel::actor::{CurrentUser, Role};
use kernel::error::app_error::AppError;
use kernel::id::AgentId;
use kernel::page::{Page, PageRequest};

use crate::domain::entities::{AgentDraft, AgentProfile};
use crate::domain::repository::AgentRepository;
use crate::domain::services::AgentFilter;
use crate::domain::value_objects::{AgentName, Place, contact_email, contact_phone, optional};
use crate::error::{ListingsError, ListingsResult};

#[derive(Debug, Clone)]
pub struct AgentInput {
    pub display_name: String,
    pub agency: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub city: String,
    pub license_number: Option<String>,
    pub years_experience: i16,
}

impl AgentInput {
    fn validate(&self) -> ListingsResult<AgentDraft> {
        if !(0..=70).contains(&self.years_experience) {
            return Err(AppError::bad_request("yearsExperience must be between 0 and 70")
                .with_code("INVALID_EXPERIENCE")
                .into());
        }
        let short_text = |raw: &str| -> Result<String, AppError> {
            if raw.chars().count() > 120 || raw.chars().any(char::is_control) {
                Err(AppError::bad_request("Value is too long or contains invalid characters")
                    .with_code("INVALID_AGENT_FIELD"))
            } else {
                Ok(raw.to_string())
            }
        };

        Ok(AgentDraft {
            display_name: AgentName::new(&self.display_name)?,
            agency: optional(self.agency.as_deref(), short_text)?,
            phone: contact_phone(&self.phone)?,
            email: optional(self.email.as_deref(), contact_email)?,
            city: Place::new(&self.city, "city")?,
            license_number: optional(self.license_number.as_deref(), short_text)?,
            years_experience: self.years_experience,
        })
    }
}

pub struct AgentUseCase<A>
where
    A: AgentRepository,
{
    agent_repo: Arc<A>,
}

impl<A> AgentUseCase<A>
where
    A: AgentRepository,
{
    pub fn new(agent_repo: Arc<A>) -> Self {
        Self { agent_repo }
    }

    /// Create or replace the caller's own profile. Returns whether it was created.
    pub async fn upsert_own(
        &self,
        actor: &CurrentUser,
        input: AgentInput,
    ) -> ListingsResult<(AgentProfile, bool)> {
        actor.require_role(&[Role::Agent])?;
        actor.require_verified()?;
        let draft = input.validate()?;

        let (profile, created) = match self.agent_repo.find_by_user(actor.user_id).await? {
            Some(mut existing) => {
                existing.apply(draft);
                (existing, false)
            }
            None => (AgentProfile::new(actor.user_id, draft), true),
        };
        self.agent_repo.save(&profile).await?;

        tracing::info!(agent_id = %profile.id, created, user = %actor.public_id, "Agent profile saved");
        Ok((profile, created))
    }

    pub async fn get(&self, id: AgentId) -> ListingsResult<AgentProfile> {
        self.agent_repo
            .find_by_id(id)
            .await?
            .ok_or(ListingsError::AgentNotFound)
    }

    pub async fn mine(&self, actor: &CurrentUser) -> ListingsResult<AgentProfile> {
        self.agent_repo
            .find_by_user(actor.user_id)
            .await?
            .ok_or(ListingsError::AgentNotFound)
    }

    pub async fn list(&self, filter: &AgentFilter, page: PageRequest) -> ListingsResult<Page<AgentProfile>> {
        self.agent_repo.list(filter, page.normalized()).await
    }

    pub async fn set_verified(
        &self,
        actor: &CurrentUser,
        id: AgentId,
        verified: bool,
    ) -> ListingsResult<AgentProfile> {
        actor.require_admin()?;
        let mut agent = self.get(id).await?;

        if agent.verified != verified {
            agent.set_verified(verified);
            self.agent_repo.save(&agent).await?;
            tracing::info!(agent_id = %id, verified, by = %actor.public_id, "Agent verification changed");
        }
        Ok(agent)
    }
}
