//! React Use Case
//!
//! Like / dislike on posts and replies. Pressing the same reaction twice
//! takes it back.

use std::sync::Arc;

use kernel::actor::CurrentUser;

use crate::application::config::ForumConfig;
use crate::domain::entities::{Reaction, ReactionKind, ReactionTarget};
use crate::domain::repository::{PostRepository, ReactionRepository, ReplyRepository};
use crate::domain::services::{ReactionChange, ReactionTally, toggle_reaction};
use crate::error::{ForumError, ForumResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactOutput {
    /// The user's reaction after the change
    pub current: Option<ReactionKind>,
    pub tally: ReactionTally,
}

pub struct ReactUseCase<P, R, X>
where
    P: PostRepository,
    R: ReplyRepository,
    X: ReactionRepository,
{
    post_repo: Arc<P>,
    reply_repo: Arc<R>,
    reaction_repo: Arc<X>,
    config: Arc<ForumConfig>,
}

impl<P, R, X> ReactUseCase<P, R, X>
where
    P: PostRepository,
    R: ReplyRepository,
    X: ReactionRepository,
{
    pub fn new(
        post_repo: Arc<P>,
        reply_repo: Arc<R>,
        reaction_repo: Arc<X>,
        config: Arc<ForumConfig>,
    ) -> Self {
        Self {
            post_repo,
            reply_repo,
            reaction_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        actor: &CurrentUser,
        target: ReactionTarget,
        kind: ReactionKind,
    ) -> ForumResult<ReactOutput> {
        if self.config.require_verified_to_react {
            actor.require_verified()?;
        }

        let exists = match target {
            ReactionTarget::Post(id) => self.post_repo.find_by_id(id).await?.is_some(),
            ReactionTarget::Reply(id) => self.reply_repo.find_by_id(id).await?.is_some(),
        };
        if !exists {
            return Err(match target {
                ReactionTarget::Post(_) => ForumError::PostNotFound,
                ReactionTarget::Reply(_) => ForumError::ReplyNotFound,
            });
        }

        let existing = self
            .reaction_repo
            .find(target, actor.user_id)
            .await?
            .map(|r| r.kind);

        let current = match toggle_reaction(existing, kind) {
            ReactionChange::Removed => {
                self.reaction_repo.delete(target, actor.user_id).await?;
                None
            }
            ReactionChange::Added(kind) | ReactionChange::Replaced { to: kind, .. } => {
                self.reaction_repo
                    .upsert(&Reaction::new(target, actor.user_id, kind))
                    .await?;
                Some(kind)
            }
        };

        let tally = self.reaction_repo.tally(target).await?;
        tracing::debug!(?target, ?current, user = %actor.public_id, "Reaction updated");

        Ok(ReactOutput { current, tally })
    }
}
