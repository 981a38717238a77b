//! Message aggregate - a chat message with its reactions and attachments
//!
//! # Invariants
//!
//! - `chat_id`, `author_id` are non-nil and `content` is non-empty with at
//!   most [`MAX_CONTENT_LENGTH`] characters
//! - only the author may edit, delete, or attach files, and never once the
//!   message is deleted
//! - `(user_id, emoji_code)` is unique across reactions
//! - `edited_at` is set iff the message was edited, `deleted_at` iff deleted
//! - `version` starts at 1 and grows by one per successful mutation
//! - `persisted_version` is the version last loaded or saved (0 if never
//!   stored); repositories compare it against the stored record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::attachment::Attachment;
use super::reaction::{Reaction, ReactionCount};
use crate::error::DomainError;
use crate::validation;
use crate::value_objects::{ChatId, FileId, MessageId, UserId};

/// Longest message body accepted, in characters
pub const MAX_CONTENT_LENGTH: usize = 10_000;

/// Full persisted state of a message, used to rebuild it from storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSnapshot {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub author_id: UserId,
    pub content: String,
    pub parent_message_id: Option<MessageId>,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub attachments: Vec<Attachment>,
    pub reactions: Vec<Reaction>,
    pub version: u64,
}

/// Message aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: MessageId,
    chat_id: ChatId,
    author_id: UserId,
    content: String,
    parent_message_id: Option<MessageId>,
    created_at: DateTime<Utc>,
    edited_at: Option<DateTime<Utc>>,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    attachments: Vec<Attachment>,
    reactions: Vec<Reaction>,
    version: u64,
    persisted_version: u64,
}

impl Message {
    /// Create a new message, or a thread reply when `parent_message_id` is set
    ///
    /// # Errors
    ///
    /// - `Validation` if `chat_id` or `author_id` is nil
    /// - `EmptyContent` / `ContentTooLong` if the body is out of bounds
    pub fn new(
        chat_id: ChatId,
        author_id: UserId,
        content: impl Into<String>,
        parent_message_id: Option<MessageId>,
    ) -> Result<Self, DomainError> {
        validation::uuid_non_zero("chat_id", chat_id)?;
        validation::uuid_non_zero("author_id", author_id)?;
        let content = content.into();
        Self::validate_content(&content)?;

        Ok(Self {
            id: MessageId::new(),
            chat_id,
            author_id,
            content,
            parent_message_id: parent_message_id.filter(|p| !p.is_nil()),
            created_at: Utc::now(),
            edited_at: None,
            is_deleted: false,
            deleted_at: None,
            attachments: Vec::new(),
            reactions: Vec::new(),
            version: 1,
            persisted_version: 0,
        })
    }

    /// Rebuild a message from persistence (no validation). The result
    /// counts as persisted at `snapshot.version`.
    pub fn reconstruct(snapshot: MessageSnapshot) -> Self {
        Self {
            id: snapshot.id,
            chat_id: snapshot.chat_id,
            author_id: snapshot.author_id,
            content: snapshot.content,
            parent_message_id: snapshot.parent_message_id,
            created_at: snapshot.created_at,
            edited_at: snapshot.edited_at,
            is_deleted: snapshot.is_deleted,
            deleted_at: snapshot.deleted_at,
            attachments: snapshot.attachments,
            reactions: snapshot.reactions,
            version: snapshot.version,
            persisted_version: snapshot.version,
        }
    }

    /// Export the full state for persistence
    pub fn snapshot(&self) -> MessageSnapshot {
        MessageSnapshot {
            id: self.id,
            chat_id: self.chat_id,
            author_id: self.author_id,
            content: self.content.clone(),
            parent_message_id: self.parent_message_id,
            created_at: self.created_at,
            edited_at: self.edited_at,
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at,
            attachments: self.attachments.clone(),
            reactions: self.reactions.clone(),
            version: self.version,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn parent_message_id(&self) -> Option<MessageId> {
        self.parent_message_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        self.edited_at
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Attachments in the order they were added
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Reactions in the order they were added
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Version of the stored record this copy was loaded from or saved as
    pub fn persisted_version(&self) -> u64 {
        self.persisted_version
    }

    /// Record that the current state is now stored. Called by repositories
    /// after a successful save.
    pub fn mark_persisted(&mut self) {
        self.persisted_version = self.version;
    }

    // -------------------------------------------------------------------------
    // Predicates
    // -------------------------------------------------------------------------

    /// Check if message has been edited
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Check if message is a thread reply
    #[inline]
    pub fn is_reply(&self) -> bool {
        self.parent_message_id.is_some()
    }

    #[inline]
    pub fn can_be_edited_by(&self, user_id: UserId) -> bool {
        self.author_id == user_id
    }

    pub fn has_reaction(&self, user_id: UserId, emoji: &str) -> bool {
        self.reactions.iter().any(|r| r.matches(user_id, emoji))
    }

    /// Number of distinct users who reacted with `emoji`
    pub fn reaction_count(&self, emoji: &str) -> usize {
        self.reactions.iter().filter(|r| r.is_emoji(emoji)).count()
    }

    /// Per-emoji counts, ordered by first appearance
    pub fn reaction_counts(&self) -> Vec<ReactionCount> {
        let mut counts: Vec<ReactionCount> = Vec::new();
        for reaction in &self.reactions {
            match counts.iter_mut().find(|c| c.emoji == reaction.emoji_code()) {
                Some(count) => count.count += 1,
                None => counts.push(ReactionCount {
                    emoji: reaction.emoji_code().to_string(),
                    count: 1,
                }),
            }
        }
        counts
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Replace the message body
    ///
    /// # Errors
    ///
    /// - `MessageDeleted` if the message was deleted
    /// - `EmptyContent` / `ContentTooLong` if the new body is out of bounds
    /// - `NotAuthor` if `editor_id` did not write the message
    pub fn edit_content(
        &mut self,
        new_content: impl Into<String>,
        editor_id: UserId,
    ) -> Result<(), DomainError> {
        self.ensure_not_deleted()?;
        let new_content = new_content.into();
        Self::validate_content(&new_content)?;
        self.ensure_author(editor_id)?;

        self.content = new_content;
        self.edited_at = Some(Utc::now());
        self.bump_version();
        Ok(())
    }

    /// Soft-delete the message; a second call fails
    pub fn delete(&mut self, deleter_id: UserId) -> Result<(), DomainError> {
        self.ensure_not_deleted()?;
        self.ensure_author(deleter_id)?;

        self.is_deleted = true;
        self.deleted_at = Some(Utc::now());
        self.bump_version();
        Ok(())
    }

    /// Add a reaction; any user may react to a live message
    pub fn add_reaction(&mut self, user_id: UserId, emoji: &str) -> Result<(), DomainError> {
        self.ensure_not_deleted()?;
        let reaction = Reaction::new(user_id, emoji)?;
        if self.has_reaction(user_id, emoji) {
            return Err(DomainError::ReactionAlreadyExists);
        }

        self.reactions.push(reaction);
        self.bump_version();
        Ok(())
    }

    /// Remove exactly the `(user_id, emoji)` reaction.
    ///
    /// Allowed on deleted messages so users can always retract their own
    /// reactions.
    pub fn remove_reaction(&mut self, user_id: UserId, emoji: &str) -> Result<(), DomainError> {
        let position = self
            .reactions
            .iter()
            .position(|r| r.matches(user_id, emoji))
            .ok_or(DomainError::ReactionNotFound)?;

        // Vec::remove keeps the relative order of the survivors
        self.reactions.remove(position);
        self.bump_version();
        Ok(())
    }

    /// Attach a file; only the author may do so on a live message
    pub fn add_attachment(
        &mut self,
        user_id: UserId,
        file_id: FileId,
        file_name: impl Into<String>,
        file_size: i64,
        mime_type: impl Into<String>,
    ) -> Result<&Attachment, DomainError> {
        self.ensure_not_deleted()?;
        self.ensure_author(user_id)?;
        let attachment = Attachment::new(file_id, file_name, file_size, mime_type)?;

        self.attachments.push(attachment);
        self.bump_version();
        Ok(&self.attachments[self.attachments.len() - 1])
    }

    // -------------------------------------------------------------------------
    // Internal
    // -------------------------------------------------------------------------

    fn validate_content(content: &str) -> Result<(), DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::EmptyContent);
        }
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(DomainError::ContentTooLong {
                max: MAX_CONTENT_LENGTH,
            });
        }
        Ok(())
    }

    fn ensure_not_deleted(&self) -> Result<(), DomainError> {
        if self.is_deleted {
            return Err(DomainError::MessageDeleted);
        }
        Ok(())
    }

    fn ensure_author(&self, user_id: UserId) -> Result<(), DomainError> {
        if !self.can_be_edited_by(user_id) {
            return Err(DomainError::NotAuthor);
        }
        Ok(())
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }
}
