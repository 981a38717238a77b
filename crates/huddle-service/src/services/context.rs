//! Service context - dependency container for services
//!
//! Holds every port the use-cases talk to plus the application config.

use std::sync::Arc;

use huddle_common::AppConfig;
use huddle_core::{ValidationError, ValidationReason};

use super::error::{ServiceError, ServiceResult};
use super::tags::TagQueue;
use crate::ports::{
    ChatReadModel, EventPublisher, IdentityProvider, MessageRepository, WorkspaceRepository,
};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Message and workspace repositories
/// - The chat read-model
/// - The identity provider (Keycloak groups)
/// - The event publisher
/// - The optional post-send tag queue
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    message_repo: Arc<dyn MessageRepository>,
    workspace_repo: Arc<dyn WorkspaceRepository>,
    chats: Arc<dyn ChatReadModel>,

    // External systems
    identity: Arc<dyn IdentityProvider>,
    publisher: Arc<dyn EventPublisher>,
    tag_queue: Option<TagQueue>,

    config: Arc<AppConfig>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn workspace_repo(&self) -> &dyn WorkspaceRepository {
        self.workspace_repo.as_ref()
    }

    pub fn chats(&self) -> &dyn ChatReadModel {
        self.chats.as_ref()
    }

    // === External Systems ===

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.identity.as_ref()
    }

    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    /// `None` when tag processing is disabled
    pub fn tag_queue(&self) -> Option<&TagQueue> {
        self.tag_queue.as_ref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("identity", &"IdentityProvider")
            .field("publisher", &"EventPublisher")
            .field("tags_enabled", &self.tag_queue.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
#[derive(Default)]
pub struct ServiceContextBuilder {
    message_repo: Option<Arc<dyn MessageRepository>>,
    workspace_repo: Option<Arc<dyn WorkspaceRepository>>,
    chats: Option<Arc<dyn ChatReadModel>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    tag_queue: Option<TagQueue>,
    config: Option<AppConfig>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn workspace_repo(mut self, repo: Arc<dyn WorkspaceRepository>) -> Self {
        self.workspace_repo = Some(repo);
        self
    }

    pub fn chats(mut self, chats: Arc<dyn ChatReadModel>) -> Self {
        self.chats = Some(chats);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn tag_queue(mut self, queue: TagQueue) -> Self {
        self.tag_queue = Some(queue);
        self
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            message_repo: self.message_repo.ok_or_else(|| missing("message_repo"))?,
            workspace_repo: self.workspace_repo.ok_or_else(|| missing("workspace_repo"))?,
            chats: self.chats.ok_or_else(|| missing("chats"))?,
            identity: self.identity.ok_or_else(|| missing("identity"))?,
            publisher: self.publisher.ok_or_else(|| missing("publisher"))?,
            tag_queue: self.tag_queue,
            config: Arc::new(self.config.unwrap_or_default()),
        })
    }
}

fn missing(dependency: &'static str) -> ServiceError {
    ServiceError::Validation(ValidationError::new(dependency, ValidationReason::Required))
}
