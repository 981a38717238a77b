//! Chat read-model consumed when sending messages

use serde::{Deserialize, Serialize};

use crate::value_objects::{ChatId, UserId};

/// Projection of a chat: its id and who may post in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatView {
    pub id: ChatId,
    pub participants: Vec<UserId>,
}

impl ChatView {
    pub fn new(id: ChatId, participants: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            id,
            participants: participants.into_iter().collect(),
        }
    }

    #[inline]
    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.participants.contains(&user_id)
    }
}
