//! Invite service
//!
//! Handles workspace invite creation, redemption, revocation and listing.

use chrono::Utc;
use huddle_core::{DomainError, DomainEvent, Invite, Member, Role, Workspace, WorkspaceId};
use tracing::{error, info, instrument};

use crate::dto::{
    AcceptInviteCommand, AcceptedInvite, CreateInviteCommand, ListInvitesQuery,
    RevokeInviteCommand,
};
use crate::request_context::RequestContext;

use super::context::ServiceContext;
use super::error::{RepoResultExt, ServiceResult};
use super::events::publish_best_effort;

/// Invite service
pub struct InviteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InviteService<'a> {
    /// Create a new InviteService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Issue a new invite for a workspace
    ///
    /// Expiry and use limit fall back to the configured defaults.
    #[instrument(skip(self, cx, cmd), fields(workspace_id = %cmd.workspace_id, created_by = %cmd.created_by))]
    pub async fn create_invite(
        &self,
        cx: &RequestContext,
        cmd: CreateInviteCommand,
    ) -> ServiceResult<Invite> {
        cx.check()?;
        cmd.validate_input()?;

        let mut workspace = self.load(cx, cmd.workspace_id).await?;
        if !workspace.member(cmd.created_by).is_some_and(Member::can_invite) {
            return Err(DomainError::forbidden("not allowed to invite to this workspace").into());
        }

        let defaults = &self.ctx.config().invites;
        let expires_at = cmd
            .expires_at
            .unwrap_or_else(|| Utc::now() + defaults.default_ttl());
        let max_uses = cmd.max_uses.unwrap_or(defaults.default_max_uses);

        let invite = workspace
            .create_invite(cmd.created_by, expires_at, max_uses)?
            .clone();

        self.ctx
            .workspace_repo()
            .save(cx, &mut workspace)
            .await
            .with_operation("save_workspace")?;

        info!(
            workspace_id = %workspace.id(),
            invite_id = %invite.id(),
            expires_at = %invite.expires_at(),
            max_uses = invite.max_uses(),
            "Invite created"
        );

        publish_best_effort(
            self.ctx,
            cx,
            DomainEvent::invite_created(&workspace, &invite),
        )
        .await;

        Ok(invite)
    }

    /// Redeem an invite token and join its workspace
    ///
    /// The use is persisted before the identity group is updated. A failed
    /// group add returns `KeycloakUserAddFailed` but the use stays counted.
    #[instrument(skip(self, cx, cmd), fields(user_id = %cmd.user_id))]
    pub async fn accept_invite(
        &self,
        cx: &RequestContext,
        cmd: AcceptInviteCommand,
    ) -> ServiceResult<AcceptedInvite> {
        cx.check()?;
        cmd.validate_input()?;

        let invite = self
            .ctx
            .workspace_repo()
            .find_invite_by_token(cx, &cmd.token)
            .await
            .or_not_found("find_invite", || DomainError::InviteNotFound)?;

        let now = Utc::now();
        if invite.is_revoked() {
            return Err(DomainError::InviteRevoked.into());
        }
        if !invite.is_valid_at(now) {
            return Err(DomainError::InviteExpired.into());
        }

        let mut workspace = self.load(cx, invite.workspace_id()).await?;
        let used = workspace.use_invite_at(&cmd.token, now)?.clone();
        let joined = workspace.add_member(cmd.user_id, Role::Member);

        self.ctx
            .workspace_repo()
            .save(cx, &mut workspace)
            .await
            .with_operation("save_workspace")?;

        info!(
            workspace_id = %workspace.id(),
            invite_id = %used.id(),
            used_count = used.used_count(),
            joined,
            "Invite accepted"
        );

        publish_best_effort(
            self.ctx,
            cx,
            DomainEvent::invite_used(&workspace, &used, cmd.user_id),
        )
        .await;

        if let Err(e) = self
            .ctx
            .identity()
            .add_user_to_group(cx, cmd.user_id, workspace.keycloak_group_id())
            .await
        {
            error!(
                error = %e,
                workspace_id = %workspace.id(),
                group_id = %workspace.keycloak_group_id(),
                "Failed to add user to identity group"
            );
            return Err(DomainError::KeycloakUserAddFailed.into());
        }

        Ok(AcceptedInvite {
            workspace,
            invite: used,
            joined,
        })
    }

    /// Revoke an invite by id
    #[instrument(skip(self, cx, cmd), fields(invite_id = %cmd.invite_id, user_id = %cmd.user_id))]
    pub async fn revoke_invite(
        &self,
        cx: &RequestContext,
        cmd: RevokeInviteCommand,
    ) -> ServiceResult<()> {
        cx.check()?;
        cmd.validate_input()?;

        let mut workspace = self
            .ctx
            .workspace_repo()
            .find_workspace_by_invite_id(cx, cmd.invite_id)
            .await
            .or_not_found("find_invite_workspace", || DomainError::InviteNotFound)?;

        if !workspace.member(cmd.user_id).is_some_and(Member::can_invite) {
            return Err(DomainError::forbidden("not allowed to revoke invites of this workspace").into());
        }

        workspace.revoke_invite(cmd.invite_id)?;

        self.ctx
            .workspace_repo()
            .save(cx, &mut workspace)
            .await
            .with_operation("save_workspace")?;

        info!(workspace_id = %workspace.id(), invite_id = %cmd.invite_id, "Invite revoked");

        publish_best_effort(
            self.ctx,
            cx,
            DomainEvent::invite_revoked(&workspace, cmd.invite_id, cmd.user_id),
        )
        .await;

        Ok(())
    }

    /// Invites of a workspace (admins only); redeemable ones unless
    /// `include_inactive` is set
    #[instrument(skip(self, cx, query), fields(workspace_id = %query.workspace_id))]
    pub async fn list_invites(
        &self,
        cx: &RequestContext,
        query: ListInvitesQuery,
    ) -> ServiceResult<Vec<Invite>> {
        cx.check()?;
        query.validate_input()?;

        let workspace = self.load(cx, query.workspace_id).await?;
        if !workspace.member(query.user_id).is_some_and(Member::is_admin) {
            return Err(DomainError::forbidden("only workspace admins can list invites").into());
        }

        let invites = if query.include_inactive {
            workspace.invites().to_vec()
        } else {
            workspace.active_invites(Utc::now()).cloned().collect()
        };
        Ok(invites)
    }

    async fn load(&self, cx: &RequestContext, id: WorkspaceId) -> ServiceResult<Workspace> {
        self.ctx
            .workspace_repo()
            .find_by_id(cx, id)
            .await
            .or_not_found("find_workspace", || DomainError::WorkspaceNotFound(id))
    }
}
