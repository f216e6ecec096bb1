use crate::labels::{self, Lifecycle};
use crate::principal::Principal;
use crate::store::ResourceKind;
use crate::workspace::Workspace;
use kube::core::DynamicObject;
use serde_json::json;
use std::collections::BTreeMap;

/// Cluster-wide role binding for a principal. Named after the principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalRoleGrant {
    pub name: String,
    pub principal_id: String,
    pub role: String,
    pub lifecycle: Lifecycle,
}

impl GlobalRoleGrant {
    pub fn for_principal(principal: &Principal, role: &str) -> Self {
        Self {
            name: principal.user_id.clone(),
            principal_id: principal.user_id.clone(),
            role: role.to_string(),
            lifecycle: principal.lifecycle(),
        }
    }

    pub fn to_object(&self) -> DynamicObject {
        let mut obj = DynamicObject::new(&self.name, &ResourceKind::GlobalRoleGrant.api_resource())
            .data(json!({
                "globalRoleName": self.role,
                "userName": self.principal_id,
            }));
        obj.metadata.labels = Some(BTreeMap::from([(
            labels::USER_ID.to_string(),
            self.principal_id.clone(),
        )]));
        self.lifecycle.stamp(&mut obj.metadata);
        obj
    }
}

/// Workspace-scoped role binding, living in the workspace's cluster namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRoleGrant {
    pub name: String,
    pub namespace: String,
    pub principal_id: String,
    pub principal_ref: String,
    pub workspace_id: String,
    pub workspace_ref: String,
    pub role: String,
    pub lifecycle: Lifecycle,
}

impl WorkspaceRoleGrant {
    pub fn binding_name(workspace_id: &str) -> String {
        format!("{}-owner", workspace_id)
    }

    pub fn for_workspace(
        workspace: &Workspace,
        principal_id: &str,
        auth_provider: &str,
        role: &str,
    ) -> Self {
        Self {
            name: Self::binding_name(&workspace.project_id),
            namespace: workspace.cluster_id.clone(),
            principal_id: principal_id.to_string(),
            principal_ref: format!("{}://{}", auth_provider, principal_id),
            workspace_id: workspace.project_id.clone(),
            workspace_ref: workspace.qualified_name(),
            role: role.to_string(),
            lifecycle: workspace.lifecycle(),
        }
    }

    pub fn to_object(&self) -> DynamicObject {
        let mut obj =
            DynamicObject::new(&self.name, &ResourceKind::WorkspaceRoleGrant.api_resource())
                .within(&self.namespace)
                .data(json!({
                    "projectName": self.workspace_ref,
                    "roleTemplateName": self.role,
                    "userPrincipalName": self.principal_ref,
                    "userName": self.principal_id,
                }));
        obj.metadata.labels = Some(BTreeMap::from([
            (labels::USER_ID.to_string(), self.principal_id.clone()),
            (labels::PROJECT_ID.to_string(), self.workspace_id.clone()),
        ]));
        self.lifecycle.stamp(&mut obj.metadata);
        obj
    }
}
