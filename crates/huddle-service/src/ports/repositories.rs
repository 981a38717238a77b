//! Repository traits (ports) - define the interface for aggregate storage
//!
//! Each aggregate has a Command side (mutations) and a Query side (reads),
//! combined into one trait for convenience. Aggregates are saved whole.
//!
//! # Contract
//!
//! - every method is cancellation-aware and receives the request context
//! - a missing record is reported as [`RepositoryError::NotFound`], never as
//!   an empty success
//! - `save` is a compare-and-swap on the aggregate version: the stored
//!   version must equal the one the aggregate was loaded at (its
//!   `persisted_version`, 0 for an aggregate never stored), otherwise the
//!   write fails with [`RepositoryError::Conflict`]
//! - a successful `save` marks the aggregate persisted at its current
//!   version, so the caller may keep mutating and saving it

use async_trait::async_trait;
use huddle_core::{
    ChatId, Invite, InviteId, Member, Message, MessageId, Pagination, UserId, Workspace,
    WorkspaceId,
};

use crate::request_context::{ContextError, RequestContext};

/// Repository failure
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,

    #[error("stale write: stored version {stored}, loaded at {expected}")]
    Conflict { stored: u64, expected: u64 },

    #[error(transparent)]
    Cancelled(#[from] ContextError),

    #[error("storage backend failure: {0}")]
    Backend(#[source] anyhow::Error),
}

impl RepositoryError {
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepositoryError>;

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageCommandRepository: Send + Sync {
    /// Insert or replace a message with all its reactions and attachments
    async fn save(&self, cx: &RequestContext, message: &mut Message) -> RepoResult<()>;

    /// Physically remove a message (not used by the soft-delete flow)
    async fn delete(&self, cx: &RequestContext, id: MessageId) -> RepoResult<()>;
}

#[async_trait]
pub trait MessageQueryRepository: Send + Sync {
    async fn find_by_id(&self, cx: &RequestContext, id: MessageId) -> RepoResult<Message>;

    /// Messages of a chat, newest first
    async fn find_by_chat(
        &self,
        cx: &RequestContext,
        chat_id: ChatId,
        page: Pagination,
    ) -> RepoResult<Vec<Message>>;

    /// Direct replies to a message, oldest first
    async fn find_thread(&self, cx: &RequestContext, parent_id: MessageId)
        -> RepoResult<Vec<Message>>;

    async fn count_by_chat(&self, cx: &RequestContext, chat_id: ChatId) -> RepoResult<u64>;

    async fn count_thread_replies(&self, cx: &RequestContext, parent_id: MessageId)
        -> RepoResult<u64>;

    /// Users who reacted to a message with `emoji`, in reaction order
    async fn find_reaction_users(
        &self,
        cx: &RequestContext,
        message_id: MessageId,
        emoji: &str,
    ) -> RepoResult<Vec<UserId>>;

    /// Text search within one chat, newest first
    async fn search_in_chat(
        &self,
        cx: &RequestContext,
        chat_id: ChatId,
        query: &str,
        page: Pagination,
    ) -> RepoResult<Vec<Message>>;

    /// Messages written by a user across chats, newest first
    async fn find_by_author(
        &self,
        cx: &RequestContext,
        author_id: UserId,
        page: Pagination,
    ) -> RepoResult<Vec<Message>>;
}

pub trait MessageRepository: MessageCommandRepository + MessageQueryRepository {}

impl<T> MessageRepository for T where T: MessageCommandRepository + MessageQueryRepository + ?Sized {}

// ============================================================================
// Workspace Repository
// ============================================================================

#[async_trait]
pub trait WorkspaceCommandRepository: Send + Sync {
    /// Insert or replace a workspace with its invites and members
    async fn save(&self, cx: &RequestContext, workspace: &mut Workspace) -> RepoResult<()>;

    async fn delete(&self, cx: &RequestContext, id: WorkspaceId) -> RepoResult<()>;
}

#[async_trait]
pub trait WorkspaceQueryRepository: Send + Sync {
    async fn find_by_id(&self, cx: &RequestContext, id: WorkspaceId) -> RepoResult<Workspace>;

    async fn find_by_keycloak_group_id(
        &self,
        cx: &RequestContext,
        group_id: &str,
    ) -> RepoResult<Workspace>;

    /// All workspaces, oldest first
    async fn list(&self, cx: &RequestContext, page: Pagination) -> RepoResult<Vec<Workspace>>;

    async fn count(&self, cx: &RequestContext) -> RepoResult<u64>;

    /// Global token lookup across workspaces
    async fn find_invite_by_token(&self, cx: &RequestContext, token: &str) -> RepoResult<Invite>;

    /// Workspace owning the invite with `invite_id`
    async fn find_workspace_by_invite_id(
        &self,
        cx: &RequestContext,
        invite_id: InviteId,
    ) -> RepoResult<Workspace>;

    /// Workspaces the user is a member of, oldest first
    async fn list_by_user(
        &self,
        cx: &RequestContext,
        user_id: UserId,
        page: Pagination,
    ) -> RepoResult<Vec<Workspace>>;

    async fn count_by_user(&self, cx: &RequestContext, user_id: UserId) -> RepoResult<u64>;

    async fn find_member(
        &self,
        cx: &RequestContext,
        workspace_id: WorkspaceId,
        user_id: UserId,
    ) -> RepoResult<Member>;
}

pub trait WorkspaceRepository: WorkspaceCommandRepository + WorkspaceQueryRepository {}

impl<T> WorkspaceRepository for T where
    T: WorkspaceCommandRepository + WorkspaceQueryRepository + ?Sized
{
}
