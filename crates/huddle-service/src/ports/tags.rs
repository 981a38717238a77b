//! Tag processing port - parses tags out of sent messages and runs their commands

use async_trait::async_trait;
use huddle_core::{ChatId, Message, MessageId, UserId};

use crate::request_context::RequestContext;

/// Post-send work item. Carries a copy of everything the processor needs,
/// never the aggregate itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagJob {
    pub message_id: MessageId,
    pub chat_id: ChatId,
    pub author_id: UserId,
    pub content: String,
}

impl From<&Message> for TagJob {
    fn from(message: &Message) -> Self {
        Self {
            message_id: message.id(),
            chat_id: message.chat_id(),
            author_id: message.author_id(),
            content: message.content().to_owned(),
        }
    }
}

#[async_trait]
pub trait TagProcessor: Send + Sync {
    async fn process(&self, cx: &RequestContext, job: &TagJob) -> anyhow::Result<()>;
}
