//! Event bus port

use async_trait::async_trait;
use huddle_core::DomainEvent;

use crate::request_context::RequestContext;

#[derive(Debug, thiserror::Error)]
#[error("event publish failed: {0}")]
pub struct PublishError(#[source] pub anyhow::Error);

impl PublishError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self(err.into())
    }
}

/// One-way delivery of domain events to downstream subscribers
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, cx: &RequestContext, event: &DomainEvent) -> Result<(), PublishError>;
}
