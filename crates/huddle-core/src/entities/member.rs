//! Member - a user's membership in a workspace

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;
use crate::value_objects::{UserId, WorkspaceId};

/// Workspace member value object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: UserId,
    pub workspace_id: WorkspaceId,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

impl Member {
    /// Create a new Member joining now
    pub fn new(user_id: UserId, workspace_id: WorkspaceId, role: Role) -> Self {
        Self {
            user_id,
            workspace_id,
            role,
            joined_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_owner(&self) -> bool {
        self.role == Role::Owner
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[inline]
    pub fn can_manage_members(&self) -> bool {
        self.is_admin()
    }

    #[inline]
    pub fn can_invite(&self) -> bool {
        self.is_admin()
    }
}
