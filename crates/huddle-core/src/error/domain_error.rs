//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::validation::ValidationError;
use crate::value_objects::{ChatId, MessageId, WorkspaceId};

/// Coarse classification used by the transport layer to pick a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Forbidden,
    InvalidState,
    AlreadyExists,
    Conflict,
    External,
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Message content cannot be empty")]
    EmptyContent,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Invalid emoji")]
    InvalidEmoji,

    #[error("Invalid file name")]
    InvalidFileName,

    #[error("Invalid mime type")]
    InvalidMimeType,

    #[error("Invalid file size: must be between 1 and {max} bytes")]
    InvalidFileSize { max: i64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    #[error("Chat not found: {0}")]
    ChatNotFound(ChatId),

    #[error("Parent message not found: {0}")]
    ParentNotFound(MessageId),

    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(WorkspaceId),

    #[error("Invite not found")]
    InviteNotFound,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not message author")]
    NotAuthor,

    #[error("Not a participant of this chat")]
    NotChatParticipant,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // =========================================================================
    // State Errors
    // =========================================================================
    #[error("Message has been deleted")]
    MessageDeleted,

    #[error("Reaction already exists")]
    ReactionAlreadyExists,

    #[error("Reaction not found")]
    ReactionNotFound,

    #[error("Invite has expired")]
    InviteExpired,

    #[error("Invite has been revoked")]
    InviteRevoked,

    #[error("Invite has reached maximum uses")]
    InviteMaxUsesReached,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    // =========================================================================
    // Cross-aggregate Errors
    // =========================================================================
    #[error("Parent message belongs to a different chat")]
    ParentInDifferentChat,

    // =========================================================================
    // Concurrency Errors
    // =========================================================================
    #[error("Aggregate was modified concurrently, retry the operation")]
    ConcurrencyConflict,

    // =========================================================================
    // External Errors
    // =========================================================================
    #[error("Failed to create identity group")]
    KeycloakGroupCreationFailed,

    #[error("Failed to delete identity group")]
    KeycloakGroupDeletionFailed,

    #[error("Failed to add user to identity group")]
    KeycloakUserAddFailed,
}

impl DomainError {
    /// Shorthand for a generic forbidden error
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    /// Shorthand for a generic invalid state error
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Validation
            Self::EmptyContent => "EMPTY_CONTENT",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::InvalidEmoji => "INVALID_EMOJI",
            Self::InvalidFileName => "INVALID_FILE_NAME",
            Self::InvalidMimeType => "INVALID_MIME_TYPE",
            Self::InvalidFileSize { .. } => "INVALID_FILE_SIZE",
            Self::Validation(_) => "VALIDATION_ERROR",

            // Not Found
            Self::MessageNotFound(_) => "MESSAGE_NOT_FOUND",
            Self::ChatNotFound(_) => "CHAT_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::WorkspaceNotFound(_) => "WORKSPACE_NOT_FOUND",
            Self::InviteNotFound => "INVITE_NOT_FOUND",

            // Authorization
            Self::NotAuthor => "NOT_AUTHOR",
            Self::NotChatParticipant => "NOT_CHAT_PARTICIPANT",
            Self::Forbidden(_) => "FORBIDDEN",

            // State
            Self::MessageDeleted => "MESSAGE_DELETED",
            Self::ReactionAlreadyExists => "REACTION_ALREADY_EXISTS",
            Self::ReactionNotFound => "REACTION_NOT_FOUND",
            Self::InviteExpired => "INVITE_EXPIRED",
            Self::InviteRevoked => "INVITE_REVOKED",
            Self::InviteMaxUsesReached => "INVITE_MAX_USES_REACHED",
            Self::InvalidState(_) => "INVALID_STATE",

            // Cross-aggregate
            Self::ParentInDifferentChat => "PARENT_IN_DIFFERENT_CHAT",

            // Concurrency
            Self::ConcurrencyConflict => "CONCURRENCY_CONFLICT",

            // External
            Self::KeycloakGroupCreationFailed => "KEYCLOAK_GROUP_CREATION_FAILED",
            Self::KeycloakGroupDeletionFailed => "KEYCLOAK_GROUP_DELETION_FAILED",
            Self::KeycloakUserAddFailed => "KEYCLOAK_USER_ADD_FAILED",
        }
    }

    /// Classify the error into its family
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyContent
            | Self::ContentTooLong { .. }
            | Self::InvalidEmoji
            | Self::InvalidFileName
            | Self::InvalidMimeType
            | Self::InvalidFileSize { .. }
            | Self::Validation(_)
            | Self::ParentInDifferentChat => ErrorKind::InvalidInput,

            Self::MessageNotFound(_)
            | Self::ChatNotFound(_)
            | Self::ParentNotFound(_)
            | Self::WorkspaceNotFound(_)
            | Self::InviteNotFound
            | Self::ReactionNotFound => ErrorKind::NotFound,

            Self::NotAuthor | Self::NotChatParticipant | Self::Forbidden(_) => ErrorKind::Forbidden,

            Self::MessageDeleted
            | Self::InviteExpired
            | Self::InviteRevoked
            | Self::InviteMaxUsesReached
            | Self::InvalidState(_) => ErrorKind::InvalidState,

            Self::ReactionAlreadyExists => ErrorKind::AlreadyExists,

            Self::ConcurrencyConflict => ErrorKind::Conflict,

            Self::KeycloakGroupCreationFailed
            | Self::KeycloakGroupDeletionFailed
            | Self::KeycloakUserAddFailed => ErrorKind::External,
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        self.kind() == ErrorKind::Forbidden
    }

    /// Check if this is a state-rule violation
    pub fn is_state(&self) -> bool {
        self.kind() == ErrorKind::InvalidState
    }

    /// Check if this is a conflict error (duplicates and stale writes)
    pub fn is_conflict(&self) -> bool {
        matches!(self.kind(), ErrorKind::AlreadyExists | ErrorKind::Conflict)
    }
}
