//! Reply Use Cases

use std::sync::Arc;

use kernel::actor::CurrentUser;
use kernel::error::app_error::AppError;
use kernel::id::{PostId, ReplyId};

use crate::domain::entities::Reply;
use crate::domain::repository::{PostRepository, ReplyRepository};
use crate::domain::value_objects::ReplyBody;
use crate::error::{ForumError, ForumResult};

pub struct ReplyUseCase<P, R>
where
    P: PostRepository,
    R: ReplyRepository,
{
    post_repo: Arc<P>,
    reply_repo: Arc<R>,
}

impl<P, R> ReplyUseCase<P, R>
where
    P: PostRepository,
    R: ReplyRepository,
{
    pub fn new(post_repo: Arc<P>, reply_repo: Arc<R>) -> Self {
        Self {
            post_repo,
            reply_repo,
        }
    }

    pub async fn create(&self, actor: &CurrentUser, post_id: PostId, body: &str) -> ForumResult<Reply> {
        actor.require_verified()?;
        let body = ReplyBody::new(body)?;

        let post = self
            .post_repo
            .find_by_id(post_id)
            .await?
            .ok_or(ForumError::PostNotFound)?;
        post.ensure_open()?;

        let reply = Reply::new(post.id, actor.user_id, body);
        self.reply_repo.create(&reply).await?;

        tracing::info!(
            post_id = %post.id,
            reply_id = %reply.id,
            author = %actor.public_id,
            "Forum reply created"
        );

        Ok(reply)
    }

    /// Author or moderator+
    pub async fn delete(&self, actor: &CurrentUser, id: ReplyId) -> ForumResult<()> {
        let reply = self
            .reply_repo
            .find_by_id(id)
            .await?
            .ok_or(ForumError::ReplyNotFound)?;

        if !actor.can_manage(&reply.author_id) {
            return Err(AppError::forbidden("Only the author or a moderator can delete this reply")
                .with_code("NOT_REPLY_AUTHOR")
                .into());
        }

        self.reply_repo.delete(id).await?;
        tracing::info!(reply_id = %id, by = %actor.public_id, "Forum reply deleted");
        Ok(())
    }
}
