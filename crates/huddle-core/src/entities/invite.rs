//! Invite entity - a redeemable token admitting users to a workspace
//!
//! Invites are owned by their [`Workspace`](super::Workspace) and only change
//! through it. An invite is `Active` until it is revoked (terminal), runs
//! out of uses, or passes its expiry.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{InviteId, UserId, WorkspaceId};

/// Invite lifetime used when the caller does not choose one
pub const DEFAULT_INVITE_TTL_HOURS: i64 = 7 * 24;

/// `max_uses` value meaning "no limit"
pub const UNLIMITED_USES: i32 = 0;

const TOKEN_BYTES: usize = 32;

/// Default expiry for an invite created at `now`
pub fn default_invite_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::hours(DEFAULT_INVITE_TTL_HOURS)
}

/// Generate an unguessable, URL-safe invite token (256 bits of entropy)
pub fn generate_invite_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Lifecycle state of an invite at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Active,
    Revoked,
    Exhausted,
    Expired,
}

/// Full persisted state of an invite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteSnapshot {
    pub id: InviteId,
    pub workspace_id: WorkspaceId,
    pub token: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub max_uses: i32,
    pub used_count: i32,
    pub is_revoked: bool,
}

/// Invite entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    id: InviteId,
    workspace_id: WorkspaceId,
    token: String,
    created_by: UserId,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    max_uses: i32,
    used_count: i32,
    is_revoked: bool,
}

impl Invite {
    /// Create a fresh active invite. Inputs are validated by the workspace.
    pub(crate) fn new(
        workspace_id: WorkspaceId,
        created_by: UserId,
        expires_at: DateTime<Utc>,
        max_uses: i32,
    ) -> Self {
        Self {
            id: InviteId::new(),
            workspace_id,
            token: generate_invite_token(),
            created_by,
            created_at: Utc::now(),
            expires_at,
            max_uses,
            used_count: 0,
            is_revoked: false,
        }
    }

    /// Rebuild an invite from persistence (no validation)
    pub fn reconstruct(snapshot: InviteSnapshot) -> Self {
        Self {
            id: snapshot.id,
            workspace_id: snapshot.workspace_id,
            token: snapshot.token,
            created_by: snapshot.created_by,
            created_at: snapshot.created_at,
            expires_at: snapshot.expires_at,
            max_uses: snapshot.max_uses,
            used_count: snapshot.used_count,
            is_revoked: snapshot.is_revoked,
        }
    }

    pub fn snapshot(&self) -> InviteSnapshot {
        InviteSnapshot {
            id: self.id,
            workspace_id: self.workspace_id,
            token: self.token.clone(),
            created_by: self.created_by,
            created_at: self.created_at,
            expires_at: self.expires_at,
            max_uses: self.max_uses,
            used_count: self.used_count,
            is_revoked: self.is_revoked,
        }
    }

    pub fn id(&self) -> InviteId {
        self.id
    }

    pub fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn max_uses(&self) -> i32 {
        self.max_uses
    }

    pub fn used_count(&self) -> i32 {
        self.used_count
    }

    pub fn is_revoked(&self) -> bool {
        self.is_revoked
    }

    /// Check if invite is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check if invite has reached max uses
    pub fn is_exhausted(&self) -> bool {
        self.max_uses != UNLIMITED_USES && self.used_count >= self.max_uses
    }

    /// Lifecycle state at `now`; revocation wins over the implicit states
    pub fn status_at(&self, now: DateTime<Utc>) -> InviteStatus {
        if self.is_revoked {
            InviteStatus::Revoked
        } else if self.is_exhausted() {
            InviteStatus::Exhausted
        } else if self.is_expired_at(now) {
            InviteStatus::Expired
        } else {
            InviteStatus::Active
        }
    }

    /// `!revoked && now < expires_at && (max_uses == 0 || used_count < max_uses)`
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == InviteStatus::Active
    }

    /// Check if invite is still valid
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Get remaining uses (None if unlimited)
    pub fn remaining_uses(&self) -> Option<i32> {
        (self.max_uses != UNLIMITED_USES).then(|| (self.max_uses - self.used_count).max(0))
    }

    /// Consume one use of the invite
    pub(crate) fn use_at(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        match self.status_at(now) {
            InviteStatus::Active => {
                self.used_count = self
                    .used_count
                    .checked_add(1)
                    .ok_or(DomainError::InviteMaxUsesReached)?;
                Ok(())
            }
            InviteStatus::Revoked => Err(DomainError::InviteRevoked),
            InviteStatus::Exhausted => Err(DomainError::InviteMaxUsesReached),
            InviteStatus::Expired => Err(DomainError::InviteExpired),
        }
    }

    /// Revoke the invite; revoking twice fails
    pub(crate) fn revoke(&mut self) -> Result<(), DomainError> {
        if self.is_revoked {
            return Err(DomainError::InviteRevoked);
        }
        self.is_revoked = true;
        Ok(())
    }
}
