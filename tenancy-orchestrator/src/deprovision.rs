//! Teardown of a tenant's records. Nothing is rolled back: a failure halfway
//! leaves the remaining records in place and the call can simply be retried.

use crate::error::{OrchestratorError, Result};
use crate::identity::TenantIdentity;
use crate::labels::{self, LabelSelector};
use crate::orchestrator::TenantOrchestrator;
use crate::principal::Principal;
use crate::store::{ResourceKind, StoreError};
use crate::workspace::Workspace;
use tracing::{info, instrument, warn};

impl TenantOrchestrator {
    /// Delete the principal of `identity` together with its global role grant.
    ///
    /// Both records are resolved before anything is deleted, so a tenant with
    /// a principal but no grant (or several) is reported and left untouched.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn deprovision_principal(&self, identity: &TenantIdentity) -> Result<Principal> {
        let principal = self.get_principal(identity).await?;
        let grant_name = self.global_grant_name(identity).await?;

        self.store
            .delete(ResourceKind::GlobalRoleGrant, None, &grant_name)
            .await?;
        self.store
            .delete(ResourceKind::Principal, None, &principal.user_id)
            .await?;

        info!(user_id = %principal.user_id, "principal deprovisioned");
        Ok(principal)
    }

    /// Delete the workspace of `identity` on the configured cluster, after the
    /// role grants that point at it.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn deprovision_workspace(&self, identity: &TenantIdentity) -> Result<Workspace> {
        let workspace = self.get_workspace(identity).await?;
        let namespace = Some(workspace.cluster_id.as_str());

        let selector = LabelSelector::owned_by(identity)
            .with(labels::PROJECT_ID, workspace.project_id.as_str());
        let grants = self
            .store
            .list(ResourceKind::WorkspaceRoleGrant, namespace, &selector)
            .await?;

        for grant in grants {
            let Some(name) = grant.metadata.name else {
                continue;
            };
            match self
                .store
                .delete(ResourceKind::WorkspaceRoleGrant, namespace, &name)
                .await
            {
                Ok(()) => {}
                Err(StoreError::NotFound(_)) => {
                    warn!(grant = %name, "workspace grant already gone");
                }
                Err(e) => return Err(OrchestratorError::from(e)),
            }
        }

        self.store
            .delete(ResourceKind::Workspace, namespace, &workspace.project_id)
            .await?;

        info!(
            project_id = %workspace.project_id,
            cluster_id = %workspace.cluster_id,
            "workspace deprovisioned"
        );
        Ok(workspace)
    }
}
