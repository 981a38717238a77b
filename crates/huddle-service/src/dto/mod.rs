//! Data transfer objects for use-case inputs and outputs
//!
//! This module provides:
//! - Command and query DTOs with input validation
//! - Use-case result types and serializable response views

pub mod requests;
pub mod responses;

pub use requests::{
    AcceptInviteCommand, AddAttachmentCommand, AddReactionCommand, CreateInviteCommand,
    CreateWorkspaceCommand, DeleteMessageCommand, DeleteWorkspaceCommand, EditMessageCommand,
    GetMessageQuery, GetReactionUsersQuery, GetThreadQuery, GetWorkspaceQuery,
    ListAuthorMessagesQuery, ListInvitesQuery, ListMessagesQuery, ListUserWorkspacesQuery,
    RemoveReactionCommand, RevokeInviteCommand, SearchMessagesQuery, SendMessageCommand,
    UpdateWorkspaceCommand,
};

pub use responses::{
    AcceptedInvite, AttachmentResponse, InviteResponse, MemberResponse, MessagePage,
    MessageResponse, ThreadView, WorkspacePage, WorkspaceResponse,
};
