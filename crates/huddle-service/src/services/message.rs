//! Message service
//!
//! Handles sending, editing, deleting and reading chat messages and threads.

use huddle_core::{Attachment, DomainError, DomainEvent, Message, MessageId};
use tracing::{debug, info, instrument};

use crate::dto::{
    AddAttachmentCommand, DeleteMessageCommand, EditMessageCommand, GetMessageQuery,
    GetThreadQuery, ListAuthorMessagesQuery, ListMessagesQuery, MessagePage, SearchMessagesQuery,
    SendMessageCommand, ThreadView,
};
use crate::ports::TagJob;
use crate::request_context::RequestContext;

use super::context::ServiceContext;
use super::error::{RepoResultExt, ServiceResult};
use super::events::publish_best_effort;

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Post a message to a chat the author participates in
    ///
    /// Replies must target a parent in the same chat. After the write the
    /// message is handed to the tag pipeline when one is configured.
    #[instrument(skip(self, cx, cmd), fields(chat_id = %cmd.chat_id, author_id = %cmd.author_id))]
    pub async fn send_message(
        &self,
        cx: &RequestContext,
        cmd: SendMessageCommand,
    ) -> ServiceResult<Message> {
        cx.check()?;
        cmd.validate_input()?;

        let chat = self
            .ctx
            .chats()
            .find_chat(cx, cmd.chat_id)
            .await
            .or_not_found("find_chat", || DomainError::ChatNotFound(cmd.chat_id))?;

        if !chat.has_participant(cmd.author_id) {
            return Err(DomainError::NotChatParticipant.into());
        }

        let parent_id = cmd.parent_message_id.filter(|id| !id.is_nil());
        if let Some(parent_id) = parent_id {
            let parent = self
                .ctx
                .message_repo()
                .find_by_id(cx, parent_id)
                .await
                .or_not_found("find_parent", || DomainError::ParentNotFound(parent_id))?;

            if parent.chat_id() != cmd.chat_id {
                return Err(DomainError::ParentInDifferentChat.into());
            }
        }

        let mut message = Message::new(cmd.chat_id, cmd.author_id, cmd.content, parent_id)?;

        self.ctx
            .message_repo()
            .save(cx, &mut message)
            .await
            .with_operation("save_message")?;

        info!(
            message_id = %message.id(),
            chat_id = %message.chat_id(),
            is_reply = message.is_reply(),
            "Message sent"
        );

        publish_best_effort(self.ctx, cx, DomainEvent::message_created(&message)).await;

        if let Some(queue) = self.ctx.tag_queue() {
            if queue.enqueue(TagJob::from(&message)) {
                debug!(message_id = %message.id(), "Queued tag job");
            }
        }

        Ok(message)
    }

    /// Replace the content of a message (author only)
    #[instrument(skip(self, cx, cmd), fields(message_id = %cmd.message_id, editor_id = %cmd.editor_id))]
    pub async fn edit_message(
        &self,
        cx: &RequestContext,
        cmd: EditMessageCommand,
    ) -> ServiceResult<Message> {
        cx.check()?;
        cmd.validate_input()?;

        let mut message = self.load(cx, cmd.message_id).await?;
        message.edit_content(cmd.content, cmd.editor_id)?;

        self.ctx
            .message_repo()
            .save(cx, &mut message)
            .await
            .with_operation("save_message")?;

        info!(message_id = %message.id(), version = message.version(), "Message edited");

        publish_best_effort(
            self.ctx,
            cx,
            DomainEvent::message_edited(&message, cmd.editor_id),
        )
        .await;

        Ok(message)
    }

    /// Soft-delete a message (author only)
    #[instrument(skip(self, cx, cmd), fields(message_id = %cmd.message_id, deleter_id = %cmd.deleter_id))]
    pub async fn delete_message(
        &self,
        cx: &RequestContext,
        cmd: DeleteMessageCommand,
    ) -> ServiceResult<()> {
        cx.check()?;
        cmd.validate_input()?;

        let mut message = self.load(cx, cmd.message_id).await?;
        message.delete(cmd.deleter_id)?;

        self.ctx
            .message_repo()
            .save(cx, &mut message)
            .await
            .with_operation("save_message")?;

        info!(message_id = %message.id(), "Message deleted");

        publish_best_effort(
            self.ctx,
            cx,
            DomainEvent::message_deleted(&message, cmd.deleter_id),
        )
        .await;

        Ok(())
    }

    /// Attach an uploaded file to a message (author only)
    #[instrument(skip(self, cx, cmd), fields(message_id = %cmd.message_id, file_id = %cmd.file_id))]
    pub async fn add_attachment(
        &self,
        cx: &RequestContext,
        cmd: AddAttachmentCommand,
    ) -> ServiceResult<Attachment> {
        cx.check()?;
        cmd.validate_input()?;

        let mut message = self.load(cx, cmd.message_id).await?;
        let attachment = message
            .add_attachment(
                cmd.user_id,
                cmd.file_id,
                cmd.file_name,
                cmd.file_size,
                cmd.mime_type,
            )?
            .clone();

        self.ctx
            .message_repo()
            .save(cx, &mut message)
            .await
            .with_operation("save_message")?;

        info!(
            message_id = %message.id(),
            file_id = %attachment.file_id(),
            file_size = attachment.file_size(),
            "Attachment added"
        );

        publish_best_effort(
            self.ctx,
            cx,
            DomainEvent::attachment_added(&message, cmd.user_id, &attachment),
        )
        .await;

        Ok(attachment)
    }

    #[instrument(skip(self, cx, query), fields(message_id = %query.message_id))]
    pub async fn get_message(
        &self,
        cx: &RequestContext,
        query: GetMessageQuery,
    ) -> ServiceResult<Message> {
        cx.check()?;
        query.validate_input()?;

        self.load(cx, query.message_id).await
    }

    /// Page through a chat, newest first
    #[instrument(skip(self, cx, query), fields(chat_id = %query.chat_id))]
    pub async fn list_messages(
        &self,
        cx: &RequestContext,
        query: ListMessagesQuery,
    ) -> ServiceResult<MessagePage> {
        cx.check()?;
        query.validate_input()?;
        let page = query.pagination();

        let repo = self.ctx.message_repo();
        let messages = repo
            .find_by_chat(cx, query.chat_id, page)
            .await
            .with_operation("list_messages")?;
        let total = repo
            .count_by_chat(cx, query.chat_id)
            .await
            .with_operation("count_messages")?;

        Ok(MessagePage {
            messages,
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    /// A message with its direct replies, oldest reply first
    #[instrument(skip(self, cx, query), fields(parent_id = %query.parent_message_id))]
    pub async fn get_thread(
        &self,
        cx: &RequestContext,
        query: GetThreadQuery,
    ) -> ServiceResult<ThreadView> {
        cx.check()?;
        query.validate_input()?;

        let parent = self.load(cx, query.parent_message_id).await?;

        let repo = self.ctx.message_repo();
        let replies = repo
            .find_thread(cx, parent.id())
            .await
            .with_operation("find_thread")?;
        let reply_count = repo
            .count_thread_replies(cx, parent.id())
            .await
            .with_operation("count_thread_replies")?;

        Ok(ThreadView {
            parent,
            replies,
            reply_count,
        })
    }

    /// Text search within one chat, newest first
    #[instrument(skip(self, cx, query), fields(chat_id = %query.chat_id))]
    pub async fn search_messages(
        &self,
        cx: &RequestContext,
        query: SearchMessagesQuery,
    ) -> ServiceResult<Vec<Message>> {
        cx.check()?;
        query.validate_input()?;

        self.ctx
            .message_repo()
            .search_in_chat(cx, query.chat_id, query.query.trim(), query.pagination())
            .await
            .with_operation("search_messages")
    }

    /// Messages a user wrote across all chats, newest first
    #[instrument(skip(self, cx, query), fields(author_id = %query.author_id))]
    pub async fn list_author_messages(
        &self,
        cx: &RequestContext,
        query: ListAuthorMessagesQuery,
    ) -> ServiceResult<Vec<Message>> {
        cx.check()?;
        query.validate_input()?;

        self.ctx
            .message_repo()
            .find_by_author(cx, query.author_id, query.pagination())
            .await
            .with_operation("list_author_messages")
    }

    async fn load(&self, cx: &RequestContext, id: MessageId) -> ServiceResult<Message> {
        self.ctx
            .message_repo()
            .find_by_id(cx, id)
            .await
            .or_not_found("find_message", || DomainError::MessageNotFound(id))
    }
}
