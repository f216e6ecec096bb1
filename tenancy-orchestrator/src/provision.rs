//! Creation of a tenant's resource graph.
//!
//! The backing store has no transactions, so each flow keeps a list of what
//! it created and deletes it again (newest first) if a later step fails. The
//! caller always gets the error of the step that failed; a failed cleanup is
//! only logged.

use crate::error::{OrchestratorError, Result};
use crate::grant::{GlobalRoleGrant, WorkspaceRoleGrant};
use crate::identity::TenantIdentity;
use crate::orchestrator::TenantOrchestrator;
use crate::principal::Principal;
use crate::store::{ResourceKind, ResourceStore};
use crate::workspace::Workspace;
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    Start,
    GuardChecked,
    PrincipalCreated,
    GlobalGrantCreated,
    WorkspaceCreated,
    OwnerResolved,
    WorkspaceGrantCreated,
    Ready,
    FailedRollback,
}

impl fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

struct Created {
    kind: ResourceKind,
    namespace: Option<String>,
    name: String,
}

/// Progress of one provisioning flow.
struct Saga<'a> {
    store: &'a dyn ResourceStore,
    identity: &'a TenantIdentity,
    stage: ProvisionStage,
    created: Vec<Created>,
}

impl<'a> Saga<'a> {
    fn begin(store: &'a dyn ResourceStore, identity: &'a TenantIdentity) -> Self {
        Self {
            store,
            identity,
            stage: ProvisionStage::Start,
            created: Vec::new(),
        }
    }

    fn advance(&mut self, stage: ProvisionStage) {
        debug!(identity = %self.identity, from = %self.stage, to = %stage, "provisioning stage");
        self.stage = stage;
    }

    fn record(&mut self, kind: ResourceKind, namespace: Option<&str>, name: &str) {
        self.created.push(Created {
            kind,
            namespace: namespace.map(str::to_string),
            name: name.to_string(),
        });
    }

    /// Best-effort undo of everything recorded so far; returns `cause`.
    async fn fail(mut self, cause: OrchestratorError) -> OrchestratorError {
        warn!(
            identity = %self.identity,
            stage = %self.stage,
            error = %cause,
            "provisioning failed, rolling back {} record(s)",
            self.created.len()
        );
        self.stage = ProvisionStage::FailedRollback;

        while let Some(record) = self.created.pop() {
            match self
                .store
                .delete(record.kind, record.namespace.as_deref(), &record.name)
                .await
            {
                Ok(()) => info!(kind = %record.kind, name = %record.name, "rolled back"),
                Err(e) => error!(
                    identity = %self.identity,
                    kind = %record.kind,
                    name = %record.name,
                    error = %e,
                    "rollback failed, record left behind"
                ),
            }
        }
        cause
    }
}

impl TenantOrchestrator {
    /// Create the principal for `identity` and bind it to the default global role.
    ///
    /// Fails with [`OrchestratorError::Conflict`] when the identity already has
    /// a principal. If the role grant cannot be created the principal is
    /// deleted again.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn provision_principal(&self, identity: &TenantIdentity) -> Result<Principal> {
        let mut saga = Saga::begin(self.store.as_ref(), identity);

        if self.principal_exists(identity).await? {
            return Err(OrchestratorError::Conflict(format!(
                "principal already exists for {}",
                identity
            )));
        }
        saga.advance(ProvisionStage::GuardChecked);

        let user_id = self
            .ids
            .generate(ResourceKind::Principal, identity, &self.config.cluster_id);
        let principal = Principal::generate(user_id, identity.clone(), &self.config.auth_provider);

        if let Err(e) = self
            .store
            .create(ResourceKind::Principal, None, principal.to_object())
            .await
        {
            return Err(saga.fail(e.into()).await);
        }
        saga.record(ResourceKind::Principal, None, &principal.user_id);
        saga.advance(ProvisionStage::PrincipalCreated);

        let grant = GlobalRoleGrant::for_principal(&principal, &self.config.default_global_role);
        if let Err(e) = self
            .store
            .create(ResourceKind::GlobalRoleGrant, None, grant.to_object())
            .await
        {
            return Err(saga.fail(e.into()).await);
        }
        saga.advance(ProvisionStage::GlobalGrantCreated);
        saga.advance(ProvisionStage::Ready);

        info!(user_id = %principal.user_id, "principal provisioned");
        Ok(principal)
    }

    /// Create the workspace for `identity` on the configured cluster and bind
    /// the identity's principal to it.
    ///
    /// The workspace is created before the principal is looked up; when there
    /// is no principal (or the binding fails) the workspace is deleted again
    /// and the lookup error is returned.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn provision_workspace(&self, identity: &TenantIdentity) -> Result<Workspace> {
        let mut saga = Saga::begin(self.store.as_ref(), identity);
        let cluster_id = self.config.cluster_id.as_str();

        if self.workspace_exists(identity).await? {
            return Err(OrchestratorError::Conflict(format!(
                "workspace already exists for {} on {}",
                identity, cluster_id
            )));
        }
        saga.advance(ProvisionStage::GuardChecked);

        let project_id = self
            .ids
            .generate(ResourceKind::Workspace, identity, cluster_id);
        let workspace = Workspace::generate(project_id, cluster_id, identity.clone());

        if let Err(e) = self
            .store
            .create(ResourceKind::Workspace, Some(cluster_id), workspace.to_object())
            .await
        {
            return Err(saga.fail(e.into()).await);
        }
        saga.record(ResourceKind::Workspace, Some(cluster_id), &workspace.project_id);
        saga.advance(ProvisionStage::WorkspaceCreated);

        let owner = match self.get_principal(identity).await {
            Ok(owner) => owner,
            Err(e) => return Err(saga.fail(e).await),
        };
        saga.advance(ProvisionStage::OwnerResolved);

        let grant = WorkspaceRoleGrant::for_workspace(
            &workspace,
            &owner.user_id,
            &self.config.auth_provider,
            &self.config.default_workspace_role,
        );
        if let Err(e) = self
            .store
            .create(
                ResourceKind::WorkspaceRoleGrant,
                Some(&grant.namespace),
                grant.to_object(),
            )
            .await
        {
            return Err(saga.fail(e.into()).await);
        }
        saga.advance(ProvisionStage::WorkspaceGrantCreated);
        saga.advance(ProvisionStage::Ready);

        info!(
            project_id = %workspace.project_id,
            cluster_id = %workspace.cluster_id,
            "workspace provisioned"
        );
        Ok(workspace)
    }
}
