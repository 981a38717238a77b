//! # huddle-core
//!
//! Domain layer containing typed ids, validation primitives, the Message and
//! Workspace aggregates, domain errors, and domain events.
//! This crate has zero dependencies on infrastructure (storage, transport, identity provider).

pub mod entities;
pub mod error;
pub mod events;
pub mod validation;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Attachment, ChatView, Invite, InviteSnapshot, InviteStatus, Member, Message, MessageSnapshot,
    Reaction, ReactionCount, Role, Workspace, WorkspaceSnapshot,
};
pub use error::{DomainError, ErrorKind};
pub use events::{AggregateKind, DomainEvent, EventMetadata, EventPayload};
pub use validation::{ValidationError, ValidationReason, ValidationResult};
pub use value_objects::{
    ChatId, FileId, IdParseError, InviteId, MessageId, Pagination, UserId, WorkspaceId,
};
