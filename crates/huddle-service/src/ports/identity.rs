//! Identity-provider client port (Keycloak groups)

use async_trait::async_trait;
use huddle_core::UserId;

use crate::request_context::RequestContext;

/// Opaque identity-provider failure
#[derive(Debug, thiserror::Error)]
#[error("identity provider error: {0}")]
pub struct IdentityError(#[source] pub anyhow::Error);

impl IdentityError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self(err.into())
    }
}

/// Group management on the external identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a group and return its provider-side id
    async fn create_group(&self, cx: &RequestContext, name: &str) -> Result<String, IdentityError>;

    async fn delete_group(&self, cx: &RequestContext, group_id: &str) -> Result<(), IdentityError>;

    async fn add_user_to_group(
        &self,
        cx: &RequestContext,
        user_id: UserId,
        group_id: &str,
    ) -> Result<(), IdentityError>;

    async fn remove_user_from_group(
        &self,
        cx: &RequestContext,
        user_id: UserId,
        group_id: &str,
    ) -> Result<(), IdentityError>;
}
