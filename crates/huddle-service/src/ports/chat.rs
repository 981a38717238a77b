//! Chat read-model port

use async_trait::async_trait;
use huddle_core::{ChatId, ChatView};

use super::repositories::RepoResult;
use crate::request_context::RequestContext;

#[async_trait]
pub trait ChatReadModel: Send + Sync {
    /// Chat projection with its participants; `NotFound` if unknown
    async fn find_chat(&self, cx: &RequestContext, chat_id: ChatId) -> RepoResult<ChatView>;
}
