use crate::error::{OrchestratorError, Result};
use crate::identity::TenantIdentity;
use crate::labels::{self, Lifecycle};
use crate::quota::QuotaDeclaration;
use crate::store::ResourceKind;
use chrono::{DateTime, Duration, Utc};
use kube::core::DynamicObject;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use utoipa::ToSchema;

pub fn workspace_ttl() -> Duration {
    Duration::hours(1)
}

/// Quota-bounded project created for a tenant on one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub project_id: String,
    pub cluster_id: String,
    pub display_name: String,
    pub resources: QuotaDeclaration,
    pub creation_time: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
    #[schema(value_type = String)]
    pub owner_dn: TenantIdentity,
}

impl Workspace {
    pub fn generate(project_id: String, cluster_id: &str, owner: TenantIdentity) -> Self {
        let lifecycle = Lifecycle::starting_now(owner, workspace_ttl());
        Self {
            project_id,
            cluster_id: cluster_id.to_string(),
            display_name: lifecycle.owner.to_string(),
            resources: QuotaDeclaration::default(),
            creation_time: lifecycle.created_at,
            expiration_time: lifecycle.expires_at,
            owner_dn: lifecycle.owner,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle {
            owner: self.owner_dn.clone(),
            created_at: self.creation_time,
            expires_at: self.expiration_time,
        }
    }

    /// `<cluster>:<project>`, the reference used by workspace role grants.
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.cluster_id, self.project_id)
    }

    pub fn to_object(&self) -> DynamicObject {
        let mut obj =
            DynamicObject::new(&self.project_id, &ResourceKind::Workspace.api_resource())
                .within(&self.cluster_id)
                .data(json!({
                    "spec": {
                        "displayName": self.display_name,
                        "description": "Tenancy workspace",
                        "clusterName": self.cluster_id,
                        "resourceQuota": { "limit": self.resources },
                        "namespaceDefaultResourceQuota": { "limit": self.resources },
                    }
                }));
        obj.metadata.labels = Some(BTreeMap::from([
            (labels::PROJECT_ID.to_string(), self.project_id.clone()),
            (
                labels::CLUSTER_ID.to_string(),
                labels::encode_label_value(&self.cluster_id),
            ),
            (
                labels::DISPLAY_NAME.to_string(),
                labels::encode_label_value(&self.display_name),
            ),
        ]));
        self.lifecycle().stamp(&mut obj.metadata);
        obj
    }

    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let project_id = obj
            .metadata
            .name
            .clone()
            .ok_or_else(|| malformed("workspace without a name".to_string()))?;
        let lifecycle = Lifecycle::decode(&obj.metadata)?;

        let spec = obj
            .data
            .get("spec")
            .ok_or_else(|| malformed(format!("workspace {}: missing spec", project_id)))?;
        let spec_str = |field: &str| {
            spec.get(field)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| malformed(format!("workspace {}: missing spec.{}", project_id, field)))
        };
        let cluster_id = spec_str("clusterName")?;
        let display_name = spec_str("displayName")?;

        let limits = spec
            .get("resourceQuota")
            .and_then(|q| q.get("limit"))
            .cloned()
            .ok_or_else(|| {
                malformed(format!("workspace {}: missing spec.resourceQuota.limit", project_id))
            })?;
        let resources: QuotaDeclaration = serde_json::from_value(limits).map_err(|e| {
            malformed(format!("workspace {}: bad resource quota: {}", project_id, e))
        })?;

        Ok(Self {
            project_id,
            cluster_id,
            display_name,
            resources,
            creation_time: lifecycle.created_at,
            expiration_time: lifecycle.expires_at,
            owner_dn: lifecycle.owner,
        })
    }
}

fn malformed(msg: String) -> OrchestratorError {
    OrchestratorError::MalformedMetadata(msg)
}
