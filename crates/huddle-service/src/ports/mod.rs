//! Outbound ports - the contracts adapters implement for the service layer

mod chat;
mod identity;
mod publisher;
mod repositories;
mod tags;

pub use chat::ChatReadModel;
pub use identity::{IdentityError, IdentityProvider};
pub use publisher::{EventPublisher, PublishError};
pub use repositories::{
    MessageCommandRepository, MessageQueryRepository, MessageRepository, RepoResult,
    RepositoryError, WorkspaceCommandRepository, WorkspaceQueryRepository, WorkspaceRepository,
};
pub use tags::{TagJob, TagProcessor};
