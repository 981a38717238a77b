//! Domain entities - aggregates and the value objects they own

mod attachment;
mod chat;
mod invite;
mod member;
mod message;
mod reaction;
mod role;
mod workspace;

pub use attachment::{Attachment, MAX_FILE_NAME_LENGTH, MAX_FILE_SIZE};
pub use chat::ChatView;
pub use invite::{
    default_invite_expiry, generate_invite_token, Invite, InviteSnapshot, InviteStatus,
    DEFAULT_INVITE_TTL_HOURS, UNLIMITED_USES,
};
pub use member::Member;
pub use message::{Message, MessageSnapshot, MAX_CONTENT_LENGTH};
pub use reaction::{Reaction, ReactionCount, MAX_EMOJI_LENGTH};
pub use role::Role;
pub use workspace::{Workspace, WorkspaceSnapshot, MAX_WORKSPACE_NAME_LENGTH};
