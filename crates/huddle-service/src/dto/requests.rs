//! Command and query DTOs for the use-cases
//!
//! Every command exposes `validate_input()`, which runs the `validator`
//! derive rules and the field primitives from `huddle_core::validation`
//! before any I/O happens. Message content, emoji and attachment rules are
//! left to the aggregate so their dedicated errors reach the caller.

use chrono::{DateTime, Utc};
use huddle_core::validation::{self, ValidationError, ValidationResult};
use huddle_core::{ChatId, FileId, InviteId, MessageId, Pagination, UserId, WorkspaceId};
use serde::Deserialize;
use validator::Validate;

/// Convert `validator` output into the uniform field error.
///
/// Reports the alphabetically first failing field so the result is stable.
fn from_validator(errors: &validator::ValidationErrors) -> ValidationError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields
        .first()
        .and_then(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map_or_else(|| e.code.to_string(), ToString::to_string);
                ValidationError::invalid(field.to_string(), message)
            })
        })
        .unwrap_or_else(|| ValidationError::invalid("request", errors.to_string()))
}

fn derive_rules<T: Validate>(value: &T) -> ValidationResult {
    value.validate().map_err(|e| from_validator(&e))
}

// ============================================================================
// Message Requests
// ============================================================================

/// Post a message, or a thread reply when `parent_message_id` is set
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageCommand {
    pub chat_id: ChatId,
    pub author_id: UserId,
    pub content: String,
    pub parent_message_id: Option<MessageId>,
}

impl SendMessageCommand {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("chat_id", self.chat_id)?;
        validation::uuid_non_zero("author_id", self.author_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditMessageCommand {
    pub message_id: MessageId,
    pub editor_id: UserId,
    pub content: String,
}

impl EditMessageCommand {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("message_id", self.message_id)?;
        validation::uuid_non_zero("editor_id", self.editor_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteMessageCommand {
    pub message_id: MessageId,
    pub deleter_id: UserId,
}

impl DeleteMessageCommand {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("message_id", self.message_id)?;
        validation::uuid_non_zero("deleter_id", self.deleter_id)
    }
}

/// Attach an already uploaded file to a message
#[derive(Debug, Clone, Deserialize)]
pub struct AddAttachmentCommand {
    pub message_id: MessageId,
    pub user_id: UserId,
    pub file_id: FileId,
    pub file_name: String,
    pub file_size: i64,
    pub mime_type: String,
}

impl AddAttachmentCommand {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("message_id", self.message_id)?;
        validation::uuid_non_zero("user_id", self.user_id)?;
        validation::uuid_non_zero("file_id", self.file_id)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GetMessageQuery {
    pub message_id: MessageId,
}

impl GetMessageQuery {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("message_id", self.message_id)
    }
}

/// Page through a chat, newest first. Limits are clamped, never rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListMessagesQuery {
    pub chat_id: ChatId,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListMessagesQuery {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("chat_id", self.chat_id)
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::clamped(self.limit, self.offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GetThreadQuery {
    pub parent_message_id: MessageId,
}

impl GetThreadQuery {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("parent_message_id", self.parent_message_id)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SearchMessagesQuery {
    pub chat_id: ChatId,
    #[validate(length(min = 1, max = 200, message = "Search query must be 1-200 characters"))]
    pub query: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchMessagesQuery {
    pub fn validate_input(&self) -> ValidationResult {
        derive_rules(self)?;
        validation::uuid_non_zero("chat_id", self.chat_id)?;
        validation::required("query", &self.query)
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::clamped(self.limit, self.offset)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListAuthorMessagesQuery {
    pub author_id: UserId,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListAuthorMessagesQuery {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("author_id", self.author_id)
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::clamped(self.limit, self.offset)
    }
}

// ============================================================================
// Reaction Requests
// ============================================================================

/// Add a reaction
#[derive(Debug, Clone, Deserialize)]
pub struct AddReactionCommand {
    pub message_id: MessageId,
    pub user_id: UserId,
    pub emoji: String,
}

impl AddReactionCommand {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("message_id", self.message_id)?;
        validation::uuid_non_zero("user_id", self.user_id)
    }
}

/// Remove the reaction `user_id` left with `emoji`.
///
/// The transport binds `user_id` to the authenticated principal; the
/// service trusts it.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoveReactionCommand {
    pub message_id: MessageId,
    pub user_id: UserId,
    pub emoji: String,
}

impl RemoveReactionCommand {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("message_id", self.message_id)?;
        validation::uuid_non_zero("user_id", self.user_id)?;
        validation::required("emoji", &self.emoji)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetReactionUsersQuery {
    pub message_id: MessageId,
    pub emoji: String,
}

impl GetReactionUsersQuery {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("message_id", self.message_id)?;
        validation::required("emoji", &self.emoji)
    }
}

// ============================================================================
// Workspace Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkspaceCommand {
    #[validate(length(min = 1, max = 100, message = "Workspace name must be 1-100 characters"))]
    pub name: String,
    pub created_by: UserId,
}

impl CreateWorkspaceCommand {
    pub fn validate_input(&self) -> ValidationResult {
        derive_rules(self)?;
        validation::required("name", &self.name)?;
        validation::uuid_non_zero("created_by", self.created_by)
    }
}

/// Rename a workspace; `user_id` must be an admin of it
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWorkspaceCommand {
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    #[validate(length(min = 1, max = 100, message = "Workspace name must be 1-100 characters"))]
    pub name: String,
}

impl UpdateWorkspaceCommand {
    pub fn validate_input(&self) -> ValidationResult {
        derive_rules(self)?;
        validation::uuid_non_zero("workspace_id", self.workspace_id)?;
        validation::uuid_non_zero("user_id", self.user_id)?;
        validation::required("name", &self.name)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GetWorkspaceQuery {
    pub workspace_id: WorkspaceId,
}

impl GetWorkspaceQuery {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("workspace_id", self.workspace_id)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListUserWorkspacesQuery {
    pub user_id: UserId,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListUserWorkspacesQuery {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("user_id", self.user_id)
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::clamped(self.limit, self.offset)
    }
}

/// Delete a workspace and release its identity group; owner only
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeleteWorkspaceCommand {
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
}

impl DeleteWorkspaceCommand {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("workspace_id", self.workspace_id)?;
        validation::uuid_non_zero("user_id", self.user_id)
    }
}

// ============================================================================
// Invite Requests
// ============================================================================

/// Create an invite. Unset fields take the configured defaults.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInviteCommand {
    pub workspace_id: WorkspaceId,
    pub created_by: UserId,
    pub expires_at: Option<DateTime<Utc>>,
    /// 0 = unlimited
    #[validate(range(min = 0, message = "max_uses must not be negative"))]
    pub max_uses: Option<i32>,
}

impl CreateInviteCommand {
    pub fn validate_input(&self) -> ValidationResult {
        derive_rules(self)?;
        validation::uuid_non_zero("workspace_id", self.workspace_id)?;
        validation::uuid_non_zero("created_by", self.created_by)?;
        if let Some(expires_at) = self.expires_at {
            validation::date_not_past("expires_at", expires_at, Utc::now())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AcceptInviteCommand {
    pub token: String,
    pub user_id: UserId,
}

impl AcceptInviteCommand {
    pub fn validate_input(&self) -> ValidationResult {
        validation::required("token", &self.token)?;
        validation::uuid_non_zero("user_id", self.user_id)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RevokeInviteCommand {
    pub invite_id: InviteId,
    pub user_id: UserId,
}

impl RevokeInviteCommand {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("invite_id", self.invite_id)?;
        validation::uuid_non_zero("user_id", self.user_id)
    }
}

/// List a workspace's invites; admins only
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListInvitesQuery {
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    /// Also return revoked, exhausted and expired invites
    #[serde(default)]
    pub include_inactive: bool,
}

impl ListInvitesQuery {
    pub fn validate_input(&self) -> ValidationResult {
        validation::uuid_non_zero("workspace_id", self.workspace_id)?;
        validation::uuid_non_zero("user_id", self.user_id)
    }
}
