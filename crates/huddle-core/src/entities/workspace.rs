//! Workspace aggregate - a team unit owning its invites and members
//!
//! Every workspace is paired with an external identity-provider group
//! (`keycloak_group_id`) whose membership mirrors [`Workspace::members`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::invite::{Invite, InviteSnapshot};
use super::member::Member;
use super::role::Role;
use crate::error::DomainError;
use crate::validation;
use crate::value_objects::{InviteId, UserId, WorkspaceId};

/// Longest workspace name accepted, in characters
pub const MAX_WORKSPACE_NAME_LENGTH: usize = 100;

/// Full persisted state of a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceSnapshot {
    pub id: WorkspaceId,
    pub name: String,
    pub keycloak_group_id: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub invites: Vec<InviteSnapshot>,
    pub members: Vec<Member>,
    pub version: u64,
}

/// Workspace aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    id: WorkspaceId,
    name: String,
    keycloak_group_id: String,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    invites: Vec<Invite>,
    members: Vec<Member>,
    version: u64,
    persisted_version: u64,
}

impl Workspace {
    /// Create a workspace backed by an already provisioned external group.
    /// The creator becomes its owner.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the name is blank or too long, the group id is
    /// blank, or `created_by` is nil.
    pub fn new(
        name: impl Into<String>,
        keycloak_group_id: impl Into<String>,
        created_by: UserId,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        let keycloak_group_id = keycloak_group_id.into();
        Self::validate_name(&name)?;
        validation::required("keycloak_group_id", &keycloak_group_id)?;
        validation::uuid_non_zero("created_by", created_by)?;

        let id = WorkspaceId::new();
        let now = Utc::now();
        Ok(Self {
            id,
            name,
            keycloak_group_id,
            created_by,
            created_at: now,
            updated_at: now,
            invites: Vec::new(),
            members: vec![Member::new(created_by, id, Role::Owner)],
            version: 1,
            persisted_version: 0,
        })
    }

    /// Rebuild a workspace from persistence (no validation), persisted at
    /// `snapshot.version`
    pub fn reconstruct(snapshot: WorkspaceSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name,
            keycloak_group_id: snapshot.keycloak_group_id,
            created_by: snapshot.created_by,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            invites: snapshot.invites.into_iter().map(Invite::reconstruct).collect(),
            members: snapshot.members,
            version: snapshot.version,
            persisted_version: snapshot.version,
        }
    }

    pub fn snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            id: self.id,
            name: self.name.clone(),
            keycloak_group_id: self.keycloak_group_id.clone(),
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            invites: self.invites.iter().map(Invite::snapshot).collect(),
            members: self.members.clone(),
            version: self.version,
        }
    }

    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keycloak_group_id(&self) -> &str {
        &self.keycloak_group_id
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn invites(&self) -> &[Invite] {
        &self.invites
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Version this copy was loaded or last saved at, 0 if never stored
    pub fn persisted_version(&self) -> u64 {
        self.persisted_version
    }

    pub fn mark_persisted(&mut self) {
        self.persisted_version = self.version;
    }

    /// Membership record for a user, if any
    pub fn member(&self, user_id: UserId) -> Option<&Member> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    #[inline]
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.member(user_id).is_some()
    }

    #[inline]
    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.member(user_id).is_some_and(Member::is_owner)
    }

    /// Invites that can still be redeemed at `now`
    pub fn active_invites(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Invite> {
        self.invites.iter().filter(move |i| i.is_valid_at(now))
    }

    /// Rename the workspace
    pub fn update_name(&mut self, name: impl Into<String>) -> Result<(), DomainError> {
        let name = name.into();
        Self::validate_name(&name)?;

        self.name = name;
        self.touch();
        Ok(())
    }

    /// Issue a new invite with a fresh token
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `expires_at` is not strictly in the future or
    /// `max_uses` is negative.
    pub fn create_invite(
        &mut self,
        created_by: UserId,
        expires_at: DateTime<Utc>,
        max_uses: i32,
    ) -> Result<&Invite, DomainError> {
        validation::uuid_non_zero("created_by", created_by)?;
        validation::date_not_past("expires_at", expires_at, Utc::now())?;
        validation::non_negative("max_uses", i64::from(max_uses))?;

        self.invites
            .push(Invite::new(self.id, created_by, expires_at, max_uses));
        self.touch();
        Ok(&self.invites[self.invites.len() - 1])
    }

    pub fn find_invite_by_token(&self, token: &str) -> Result<&Invite, DomainError> {
        self.invites
            .iter()
            .find(|i| i.token() == token)
            .ok_or(DomainError::InviteNotFound)
    }

    pub fn find_invite(&self, invite_id: InviteId) -> Result<&Invite, DomainError> {
        self.invites
            .iter()
            .find(|i| i.id() == invite_id)
            .ok_or(DomainError::InviteNotFound)
    }

    /// Consume one use of the invite carrying `token`
    pub fn use_invite(&mut self, token: &str) -> Result<&Invite, DomainError> {
        self.use_invite_at(token, Utc::now())
    }

    /// Consume one use of the invite carrying `token`, judged at `now`
    ///
    /// # Errors
    ///
    /// - `InviteNotFound` if no invite carries the token
    /// - `InviteRevoked` / `InviteExpired` / `InviteMaxUsesReached` if it is
    ///   no longer active
    pub fn use_invite_at(&mut self, token: &str, now: DateTime<Utc>) -> Result<&Invite, DomainError> {
        let index = self
            .invites
            .iter()
            .position(|i| i.token() == token)
            .ok_or(DomainError::InviteNotFound)?;

        self.invites[index].use_at(now)?;
        self.touch();
        Ok(&self.invites[index])
    }

    /// Revoke an invite; revocation is terminal
    pub fn revoke_invite(&mut self, invite_id: InviteId) -> Result<(), DomainError> {
        let invite = self
            .invites
            .iter_mut()
            .find(|i| i.id() == invite_id)
            .ok_or(DomainError::InviteNotFound)?;

        invite.revoke()?;
        self.touch();
        Ok(())
    }

    /// Record a member. Returns `false` (and changes nothing) when the user
    /// already belongs to the workspace.
    pub fn add_member(&mut self, user_id: UserId, role: Role) -> bool {
        if self.is_member(user_id) {
            return false;
        }
        self.members.push(Member::new(user_id, self.id, role));
        self.touch();
        true
    }

    fn validate_name(name: &str) -> Result<(), DomainError> {
        validation::required("name", name)?;
        validation::max_length("name", name, MAX_WORKSPACE_NAME_LENGTH)?;
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}
