//! Workspace service
//!
//! Handles workspace lifecycle. Every workspace is backed by a group on the
//! identity provider; the two are kept in step with best-effort compensation.

use huddle_core::{DomainError, DomainEvent, Member, Workspace, WorkspaceId};
use tracing::{error, info, instrument, warn};

use crate::dto::{
    CreateWorkspaceCommand, DeleteWorkspaceCommand, GetWorkspaceQuery, ListUserWorkspacesQuery,
    UpdateWorkspaceCommand, WorkspacePage,
};
use crate::request_context::RequestContext;

use super::context::ServiceContext;
use super::error::{RepoResultExt, ServiceResult};
use super::events::publish_best_effort;

/// Workspace service
pub struct WorkspaceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> WorkspaceService<'a> {
    /// Create a new WorkspaceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a workspace and its identity group
    ///
    /// The group is created first. If the workspace cannot be built or
    /// stored afterwards the group is deleted again and the original error
    /// is returned. Adding the creator to the group is best-effort.
    #[instrument(skip(self, cx, cmd), fields(created_by = %cmd.created_by))]
    pub async fn create_workspace(
        &self,
        cx: &RequestContext,
        cmd: CreateWorkspaceCommand,
    ) -> ServiceResult<Workspace> {
        cx.check()?;
        cmd.validate_input()?;

        let group_id = match self.ctx.identity().create_group(cx, &cmd.name).await {
            Ok(group_id) => group_id,
            Err(e) => {
                error!(error = %e, name = %cmd.name, "Failed to create identity group");
                return Err(DomainError::KeycloakGroupCreationFailed.into());
            }
        };

        let workspace = match self.store_new(cx, &cmd, &group_id).await {
            Ok(workspace) => workspace,
            Err(err) => {
                self.release_group(&group_id, "failed create").await;
                return Err(err);
            }
        };

        info!(
            workspace_id = %workspace.id(),
            group_id = %group_id,
            "Workspace created"
        );

        if let Err(e) = self
            .ctx
            .identity()
            .add_user_to_group(cx, cmd.created_by, &group_id)
            .await
        {
            warn!(
                error = %e,
                workspace_id = %workspace.id(),
                "Failed to add creator to identity group"
            );
        }

        publish_best_effort(self.ctx, cx, DomainEvent::workspace_created(&workspace)).await;

        Ok(workspace)
    }

    /// Rename a workspace (admins only)
    #[instrument(skip(self, cx, cmd), fields(workspace_id = %cmd.workspace_id, user_id = %cmd.user_id))]
    pub async fn update_workspace(
        &self,
        cx: &RequestContext,
        cmd: UpdateWorkspaceCommand,
    ) -> ServiceResult<Workspace> {
        cx.check()?;
        cmd.validate_input()?;

        let mut workspace = self.load(cx, cmd.workspace_id).await?;
        if !workspace.member(cmd.user_id).is_some_and(Member::is_admin) {
            return Err(DomainError::forbidden("only workspace admins can rename a workspace").into());
        }

        workspace.update_name(cmd.name)?;

        self.ctx
            .workspace_repo()
            .save(cx, &mut workspace)
            .await
            .with_operation("save_workspace")?;

        info!(workspace_id = %workspace.id(), name = %workspace.name(), "Workspace renamed");

        publish_best_effort(
            self.ctx,
            cx,
            DomainEvent::workspace_updated(&workspace, cmd.user_id),
        )
        .await;

        Ok(workspace)
    }

    #[instrument(skip(self, cx, query), fields(workspace_id = %query.workspace_id))]
    pub async fn get_workspace(
        &self,
        cx: &RequestContext,
        query: GetWorkspaceQuery,
    ) -> ServiceResult<Workspace> {
        cx.check()?;
        query.validate_input()?;

        self.load(cx, query.workspace_id).await
    }

    /// Workspaces the user belongs to, oldest first
    #[instrument(skip(self, cx, query), fields(user_id = %query.user_id))]
    pub async fn list_user_workspaces(
        &self,
        cx: &RequestContext,
        query: ListUserWorkspacesQuery,
    ) -> ServiceResult<WorkspacePage> {
        cx.check()?;
        query.validate_input()?;
        let page = query.pagination();

        let repo = self.ctx.workspace_repo();
        let workspaces = repo
            .list_by_user(cx, query.user_id, page)
            .await
            .with_operation("list_user_workspaces")?;
        let total = repo
            .count_by_user(cx, query.user_id)
            .await
            .with_operation("count_user_workspaces")?;

        Ok(WorkspacePage {
            workspaces,
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    /// Delete a workspace (owner only)
    ///
    /// The record goes first. The identity group is released afterwards on
    /// a best-effort basis, so a failed group removal leaves an orphaned
    /// group rather than a workspace pointing at a missing one.
    #[instrument(skip(self, cx, cmd), fields(workspace_id = %cmd.workspace_id, user_id = %cmd.user_id))]
    pub async fn delete_workspace(
        &self,
        cx: &RequestContext,
        cmd: DeleteWorkspaceCommand,
    ) -> ServiceResult<()> {
        cx.check()?;
        cmd.validate_input()?;

        let workspace = self.load(cx, cmd.workspace_id).await?;
        if !workspace.is_owner(cmd.user_id) {
            return Err(DomainError::forbidden("only the workspace owner can delete it").into());
        }

        let workspace_id = workspace.id();
        self.ctx
            .workspace_repo()
            .delete(cx, workspace_id)
            .await
            .or_not_found("delete_workspace", || DomainError::WorkspaceNotFound(workspace_id))?;

        info!(workspace_id = %workspace_id, "Workspace deleted");

        self.release_group(workspace.keycloak_group_id(), "delete").await;

        publish_best_effort(
            self.ctx,
            cx,
            DomainEvent::workspace_deleted(&workspace, cmd.user_id),
        )
        .await;

        Ok(())
    }

    async fn store_new(
        &self,
        cx: &RequestContext,
        cmd: &CreateWorkspaceCommand,
        group_id: &str,
    ) -> ServiceResult<Workspace> {
        let mut workspace = Workspace::new(cmd.name.as_str(), group_id, cmd.created_by)?;
        self.ctx
            .workspace_repo()
            .save(cx, &mut workspace)
            .await
            .with_operation("save_workspace")?;
        Ok(workspace)
    }

    /// Remove an identity group the workspace no longer owns. Runs detached
    /// so a cancelled request still cleans up; a failure is only logged.
    async fn release_group(&self, group_id: &str, after: &'static str) {
        let cleanup = RequestContext::detached(self.ctx.config().compensation_timeout());
        match self.ctx.identity().delete_group(&cleanup, group_id).await {
            Ok(()) => info!(group_id = %group_id, after, "Released identity group"),
            Err(e) => warn!(
                error = %e,
                group_id = %group_id,
                after,
                "Failed to release identity group, it is now orphaned"
            ),
        }
    }

    async fn load(&self, cx: &RequestContext, id: WorkspaceId) -> ServiceResult<Workspace> {
        self.ctx
            .workspace_repo()
            .find_by_id(cx, id)
            .await
            .or_not_found("find_workspace", || DomainError::WorkspaceNotFound(id))
    }
}
