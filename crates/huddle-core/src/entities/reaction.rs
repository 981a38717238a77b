//! Reaction - an emoji reaction left on a message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::UserId;

/// Longest emoji code accepted (covers shortcodes and ZWJ sequences)
pub const MAX_EMOJI_LENGTH: usize = 64;

/// Reaction value object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    user_id: UserId,
    emoji_code: String,
    added_at: DateTime<Utc>,
}

impl Reaction {
    /// Create a new Reaction added now
    pub fn new(user_id: UserId, emoji_code: impl Into<String>) -> Result<Self, DomainError> {
        let emoji_code = emoji_code.into();
        if emoji_code.trim().is_empty() || emoji_code.chars().count() > MAX_EMOJI_LENGTH {
            return Err(DomainError::InvalidEmoji);
        }

        Ok(Self {
            user_id,
            emoji_code,
            added_at: Utc::now(),
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn emoji_code(&self) -> &str {
        &self.emoji_code
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Check if reaction uses a specific emoji
    #[inline]
    pub fn is_emoji(&self, emoji: &str) -> bool {
        self.emoji_code == emoji
    }

    /// Check if this is the given user's reaction with the given emoji
    #[inline]
    pub fn matches(&self, user_id: UserId, emoji: &str) -> bool {
        self.user_id == user_id && self.is_emoji(emoji)
    }
}

/// Aggregated reaction count for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCount {
    pub emoji: String,
    pub count: usize,
}
