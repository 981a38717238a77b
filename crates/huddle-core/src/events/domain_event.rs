//! Domain events - emitted after a use-case persists an aggregate change
//!
//! Every event shares one envelope (`aggregate_id`, `aggregate_kind`,
//! `version`, `metadata`) with the payload flattened next to it and tagged by
//! its stable wire name under `type`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Attachment, Invite, Message, Workspace};
use crate::value_objects::{ChatId, FileId, InviteId, MessageId, UserId, WorkspaceId};

/// Which aggregate an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateKind {
    Message,
    Workspace,
}

/// Who caused the event, and when
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub user_id: UserId,
    pub timestamp: DateTime<Utc>,
}

impl EventMetadata {
    pub fn now(user_id: UserId) -> Self {
        Self {
            user_id,
            timestamp: Utc::now(),
        }
    }
}

/// Event-specific fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventPayload {
    // =========================================================================
    // Message Events
    // =========================================================================
    #[serde(rename = "message.created")]
    MessageCreated {
        message_id: MessageId,
        chat_id: ChatId,
        author_id: UserId,
        parent_message_id: Option<MessageId>,
        content: String,
    },
    #[serde(rename = "message.edited")]
    MessageEdited {
        message_id: MessageId,
        chat_id: ChatId,
        content: String,
    },
    #[serde(rename = "message.deleted")]
    MessageDeleted { message_id: MessageId, chat_id: ChatId },
    #[serde(rename = "message.reaction.added")]
    ReactionAdded {
        message_id: MessageId,
        chat_id: ChatId,
        emoji: String,
    },
    #[serde(rename = "message.reaction.removed")]
    ReactionRemoved {
        message_id: MessageId,
        chat_id: ChatId,
        emoji: String,
    },
    #[serde(rename = "message.attachment.added")]
    AttachmentAdded {
        message_id: MessageId,
        chat_id: ChatId,
        file_id: FileId,
        file_name: String,
        file_size: i64,
        mime_type: String,
    },

    // =========================================================================
    // Workspace Events
    // =========================================================================
    #[serde(rename = "workspace.created")]
    WorkspaceCreated {
        workspace_id: WorkspaceId,
        name: String,
        keycloak_group_id: String,
    },
    #[serde(rename = "workspace.updated")]
    WorkspaceUpdated { workspace_id: WorkspaceId, name: String },
    #[serde(rename = "workspace.deleted")]
    WorkspaceDeleted { workspace_id: WorkspaceId },
    #[serde(rename = "workspace.invite.created")]
    InviteCreated {
        workspace_id: WorkspaceId,
        invite_id: InviteId,
        expires_at: DateTime<Utc>,
        max_uses: i32,
    },
    #[serde(rename = "workspace.invite.used")]
    InviteUsed {
        workspace_id: WorkspaceId,
        invite_id: InviteId,
        used_count: i32,
    },
    #[serde(rename = "workspace.invite.revoked")]
    InviteRevoked {
        workspace_id: WorkspaceId,
        invite_id: InviteId,
    },
}

impl EventPayload {
    /// Stable wire name of the event
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MessageCreated { .. } => "message.created",
            Self::MessageEdited { .. } => "message.edited",
            Self::MessageDeleted { .. } => "message.deleted",
            Self::ReactionAdded { .. } => "message.reaction.added",
            Self::ReactionRemoved { .. } => "message.reaction.removed",
            Self::AttachmentAdded { .. } => "message.attachment.added",
            Self::WorkspaceCreated { .. } => "workspace.created",
            Self::WorkspaceUpdated { .. } => "workspace.updated",
            Self::WorkspaceDeleted { .. } => "workspace.deleted",
            Self::InviteCreated { .. } => "workspace.invite.created",
            Self::InviteUsed { .. } => "workspace.invite.used",
            Self::InviteRevoked { .. } => "workspace.invite.revoked",
        }
    }

    pub fn aggregate_kind(&self) -> AggregateKind {
        match self {
            Self::MessageCreated { .. }
            | Self::MessageEdited { .. }
            | Self::MessageDeleted { .. }
            | Self::ReactionAdded { .. }
            | Self::ReactionRemoved { .. }
            | Self::AttachmentAdded { .. } => AggregateKind::Message,
            Self::WorkspaceCreated { .. }
            | Self::WorkspaceUpdated { .. }
            | Self::WorkspaceDeleted { .. }
            | Self::InviteCreated { .. }
            | Self::InviteUsed { .. }
            | Self::InviteRevoked { .. } => AggregateKind::Workspace,
        }
    }
}

/// Event envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub aggregate_id: Uuid,
    pub aggregate_kind: AggregateKind,
    /// Aggregate version after the change that produced this event
    pub version: u64,
    pub metadata: EventMetadata,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl DomainEvent {
    pub fn new(aggregate_id: Uuid, version: u64, user_id: UserId, payload: EventPayload) -> Self {
        Self {
            aggregate_id,
            aggregate_kind: payload.aggregate_kind(),
            version,
            metadata: EventMetadata::now(user_id),
            payload,
        }
    }

    #[inline]
    pub fn event_type(&self) -> &'static str {
        self.payload.event_type()
    }

    #[inline]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.metadata.timestamp
    }

    fn for_message(message: &Message, user_id: UserId, payload: EventPayload) -> Self {
        Self::new(message.id().into_inner(), message.version(), user_id, payload)
    }

    fn for_workspace(workspace: &Workspace, user_id: UserId, payload: EventPayload) -> Self {
        Self::new(
            workspace.id().into_inner(),
            workspace.version(),
            user_id,
            payload,
        )
    }

    // =========================================================================
    // Message Events
    // =========================================================================

    pub fn message_created(message: &Message) -> Self {
        Self::for_message(
            message,
            message.author_id(),
            EventPayload::MessageCreated {
                message_id: message.id(),
                chat_id: message.chat_id(),
                author_id: message.author_id(),
                parent_message_id: message.parent_message_id(),
                content: message.content().to_owned(),
            },
        )
    }

    pub fn message_edited(message: &Message, editor_id: UserId) -> Self {
        Self::for_message(
            message,
            editor_id,
            EventPayload::MessageEdited {
                message_id: message.id(),
                chat_id: message.chat_id(),
                content: message.content().to_owned(),
            },
        )
    }

    pub fn message_deleted(message: &Message, deleter_id: UserId) -> Self {
        Self::for_message(
            message,
            deleter_id,
            EventPayload::MessageDeleted {
                message_id: message.id(),
                chat_id: message.chat_id(),
            },
        )
    }

    pub fn reaction_added(message: &Message, user_id: UserId, emoji: &str) -> Self {
        Self::for_message(
            message,
            user_id,
            EventPayload::ReactionAdded {
                message_id: message.id(),
                chat_id: message.chat_id(),
                emoji: emoji.to_owned(),
            },
        )
    }

    pub fn reaction_removed(message: &Message, user_id: UserId, emoji: &str) -> Self {
        Self::for_message(
            message,
            user_id,
            EventPayload::ReactionRemoved {
                message_id: message.id(),
                chat_id: message.chat_id(),
                emoji: emoji.to_owned(),
            },
        )
    }

    pub fn attachment_added(message: &Message, user_id: UserId, attachment: &Attachment) -> Self {
        Self::for_message(
            message,
            user_id,
            EventPayload::AttachmentAdded {
                message_id: message.id(),
                chat_id: message.chat_id(),
                file_id: attachment.file_id(),
                file_name: attachment.file_name().to_owned(),
                file_size: attachment.file_size(),
                mime_type: attachment.mime_type().to_owned(),
            },
        )
    }

    // =========================================================================
    // Workspace Events
    // =========================================================================

    pub fn workspace_created(workspace: &Workspace) -> Self {
        Self::for_workspace(
            workspace,
            workspace.created_by(),
            EventPayload::WorkspaceCreated {
                workspace_id: workspace.id(),
                name: workspace.name().to_owned(),
                keycloak_group_id: workspace.keycloak_group_id().to_owned(),
            },
        )
    }

    pub fn workspace_updated(workspace: &Workspace, user_id: UserId) -> Self {
        Self::for_workspace(
            workspace,
            user_id,
            EventPayload::WorkspaceUpdated {
                workspace_id: workspace.id(),
                name: workspace.name().to_owned(),
            },
        )
    }

    /// Deletion is the aggregate's last change, one past its stored version
    pub fn workspace_deleted(workspace: &Workspace, user_id: UserId) -> Self {
        Self::new(
            workspace.id().into_inner(),
            workspace.version() + 1,
            user_id,
            EventPayload::WorkspaceDeleted {
                workspace_id: workspace.id(),
            },
        )
    }

    pub fn invite_created(workspace: &Workspace, invite: &Invite) -> Self {
        Self::for_workspace(
            workspace,
            invite.created_by(),
            EventPayload::InviteCreated {
                workspace_id: workspace.id(),
                invite_id: invite.id(),
                expires_at: invite.expires_at(),
                max_uses: invite.max_uses(),
            },
        )
    }

    pub fn invite_used(workspace: &Workspace, invite: &Invite, user_id: UserId) -> Self {
        Self::for_workspace(
            workspace,
            user_id,
            EventPayload::InviteUsed {
                workspace_id: workspace.id(),
                invite_id: invite.id(),
                used_count: invite.used_count(),
            },
        )
    }

    pub fn invite_revoked(workspace: &Workspace, invite_id: InviteId, user_id: UserId) -> Self {
        Self::for_workspace(
            workspace,
            user_id,
            EventPayload::InviteRevoked {
                workspace_id: workspace.id(),
                invite_id,
            },
        )
    }
}
