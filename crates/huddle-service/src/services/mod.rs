//! Use-case services
//!
//! Every use-case follows the same skeleton: check the request context,
//! validate input, load, mutate the aggregate, save once, then publish the
//! matching event on a best-effort basis.

pub mod context;
pub mod error;
mod events;
pub mod invite;
pub mod message;
pub mod reaction;
pub mod tags;
pub mod workspace;

// Re-export all services for convenience
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use invite::InviteService;
pub use message::MessageService;
pub use reaction::ReactionService;
pub use tags::{tag_pipeline, TagQueue, TagWorker};
pub use workspace::WorkspaceService;
