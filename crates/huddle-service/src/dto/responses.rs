//! Use-case results and their serializable views
//!
//! Use-cases return domain objects; the `*Response` types are the flat
//! JSON shapes a transport hands to clients.

use chrono::{DateTime, Utc};
use huddle_core::{
    Attachment, ChatId, FileId, Invite, InviteId, InviteStatus, Message, MessageId,
    ReactionCount, Role, UserId, Workspace, WorkspaceId,
};
use serde::Serialize;

// ============================================================================
// Use-case Results
// ============================================================================

/// One page of a chat, newest first
#[derive(Debug, Clone)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    /// Total messages in the chat
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl MessagePage {
    pub fn has_more(&self) -> bool {
        u64::from(self.offset) + (self.messages.len() as u64) < self.total
    }
}

/// A message and its direct replies, oldest reply first
#[derive(Debug, Clone)]
pub struct ThreadView {
    pub parent: Message,
    pub replies: Vec<Message>,
    pub reply_count: u64,
}

#[derive(Debug, Clone)]
pub struct WorkspacePage {
    pub workspaces: Vec<Workspace>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

impl WorkspacePage {
    pub fn has_more(&self) -> bool {
        u64::from(self.offset) + (self.workspaces.len() as u64) < self.total
    }
}

/// Outcome of redeeming an invite
#[derive(Debug, Clone)]
pub struct AcceptedInvite {
    pub workspace: Workspace,
    /// Invite state after this use
    pub invite: Invite,
    /// `false` when the user already was a member
    pub joined: bool,
}

// ============================================================================
// Serializable Views
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentResponse {
    pub file_id: FileId,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
}

impl From<&Attachment> for AttachmentResponse {
    fn from(attachment: &Attachment) -> Self {
        Self {
            file_id: attachment.file_id(),
            file_name: attachment.file_name().to_owned(),
            file_size: attachment.file_size(),
            mime_type: attachment.mime_type().to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub author_id: UserId,
    /// Empty once the message is deleted
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_message_id: Option<MessageId>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub attachments: Vec<AttachmentResponse>,
    pub reactions: Vec<ReactionCount>,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        let content = if message.is_deleted() {
            String::new()
        } else {
            message.content().to_owned()
        };
        Self {
            id: message.id(),
            chat_id: message.chat_id(),
            author_id: message.author_id(),
            content,
            parent_message_id: message.parent_message_id(),
            created_at: message.created_at(),
            edited_at: message.edited_at(),
            is_deleted: message.is_deleted(),
            attachments: message.attachments().iter().map(Into::into).collect(),
            reactions: message.reaction_counts(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub user_id: UserId,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceResponse {
    pub id: WorkspaceId,
    pub name: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub members: Vec<MemberResponse>,
}

impl From<&Workspace> for WorkspaceResponse {
    fn from(workspace: &Workspace) -> Self {
        Self {
            id: workspace.id(),
            name: workspace.name().to_owned(),
            created_by: workspace.created_by(),
            created_at: workspace.created_at(),
            updated_at: workspace.updated_at(),
            members: workspace
                .members()
                .iter()
                .map(|m| MemberResponse {
                    user_id: m.user_id,
                    role: m.role,
                    joined_at: m.joined_at,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteResponse {
    pub id: InviteId,
    pub workspace_id: WorkspaceId,
    pub token: String,
    pub created_by: UserId,
    pub expires_at: DateTime<Utc>,
    pub max_uses: i32,
    pub used_count: i32,
    pub status: InviteStatus,
}

impl From<&Invite> for InviteResponse {
    fn from(invite: &Invite) -> Self {
        Self {
            id: invite.id(),
            workspace_id: invite.workspace_id(),
            token: invite.token().to_owned(),
            created_by: invite.created_by(),
            expires_at: invite.expires_at(),
            max_uses: invite.max_uses(),
            used_count: invite.used_count(),
            status: invite.status_at(Utc::now()),
        }
    }
}
