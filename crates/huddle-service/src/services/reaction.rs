//! Reaction service
//!
//! Handles message reactions (add, remove, query).
//!
//! `user_id` on every command is trusted: the transport binds it to the
//! authenticated principal, so a caller can only remove their own reactions.

use huddle_core::{DomainError, DomainEvent, Message, MessageId, UserId};
use tracing::{info, instrument};

use crate::dto::{AddReactionCommand, GetReactionUsersQuery, RemoveReactionCommand};
use crate::request_context::RequestContext;

use super::context::ServiceContext;
use super::error::{RepoResultExt, ServiceResult};
use super::events::publish_best_effort;

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add reaction to a live message
    #[instrument(skip(self, cx, cmd), fields(message_id = %cmd.message_id, user_id = %cmd.user_id))]
    pub async fn add_reaction(
        &self,
        cx: &RequestContext,
        cmd: AddReactionCommand,
    ) -> ServiceResult<Message> {
        cx.check()?;
        cmd.validate_input()?;

        let mut message = self.load(cx, cmd.message_id).await?;
        message.add_reaction(cmd.user_id, &cmd.emoji)?;

        self.ctx
            .message_repo()
            .save(cx, &mut message)
            .await
            .with_operation("save_message")?;

        info!(
            message_id = %message.id(),
            emoji = %cmd.emoji,
            count = message.reaction_count(&cmd.emoji),
            "Reaction added"
        );

        publish_best_effort(
            self.ctx,
            cx,
            DomainEvent::reaction_added(&message, cmd.user_id, &cmd.emoji),
        )
        .await;

        Ok(message)
    }

    /// Remove the caller's own reaction; works on deleted messages too
    #[instrument(skip(self, cx, cmd), fields(message_id = %cmd.message_id, user_id = %cmd.user_id))]
    pub async fn remove_reaction(
        &self,
        cx: &RequestContext,
        cmd: RemoveReactionCommand,
    ) -> ServiceResult<Message> {
        cx.check()?;
        cmd.validate_input()?;

        let mut message = self.load(cx, cmd.message_id).await?;
        message.remove_reaction(cmd.user_id, &cmd.emoji)?;

        self.ctx
            .message_repo()
            .save(cx, &mut message)
            .await
            .with_operation("save_message")?;

        info!(message_id = %message.id(), emoji = %cmd.emoji, "Reaction removed");

        publish_best_effort(
            self.ctx,
            cx,
            DomainEvent::reaction_removed(&message, cmd.user_id, &cmd.emoji),
        )
        .await;

        Ok(message)
    }

    /// Users who reacted with `emoji`, in reaction order
    #[instrument(skip(self, cx, query), fields(message_id = %query.message_id))]
    pub async fn get_reaction_users(
        &self,
        cx: &RequestContext,
        query: GetReactionUsersQuery,
    ) -> ServiceResult<Vec<UserId>> {
        cx.check()?;
        query.validate_input()?;

        // Unknown messages get their own sentinel rather than an empty list
        self.load(cx, query.message_id).await?;

        self.ctx
            .message_repo()
            .find_reaction_users(cx, query.message_id, &query.emoji)
            .await
            .with_operation("find_reaction_users")
    }

    async fn load(&self, cx: &RequestContext, id: MessageId) -> ServiceResult<Message> {
        self.ctx
            .message_repo()
            .find_by_id(cx, id)
            .await
            .or_not_found("find_message", || DomainError::MessageNotFound(id))
    }
}
