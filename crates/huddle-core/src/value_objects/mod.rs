//! Value objects - immutable types that represent domain concepts

mod ids;
mod pagination;

pub use ids::{ChatId, FileId, IdParseError, InviteId, MessageId, UserId, WorkspaceId};
pub use pagination::{Pagination, DEFAULT_LIMIT, MAX_LIMIT};
