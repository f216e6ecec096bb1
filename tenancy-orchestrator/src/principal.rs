use crate::error::{OrchestratorError, Result};
use crate::identity::TenantIdentity;
use crate::labels::{self, Lifecycle};
use crate::store::ResourceKind;
use chrono::{DateTime, Duration, Utc};
use kube::core::DynamicObject;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use utoipa::ToSchema;

pub fn principal_ttl() -> Duration {
    Duration::days(1)
}

/// The account record created for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
    pub display_name: String,
    pub principal_ids: Vec<String>,
    #[schema(value_type = String)]
    pub user_dn: TenantIdentity,
    pub creation_time: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
}

impl Principal {
    pub fn generate(user_id: String, owner: TenantIdentity, auth_provider: &str) -> Self {
        let lifecycle = Lifecycle::starting_now(owner, principal_ttl());
        Self {
            display_name: user_id.clone(),
            principal_ids: vec![format!("{}://{}", auth_provider, user_id)],
            user_id,
            user_dn: lifecycle.owner,
            creation_time: lifecycle.created_at,
            expiration_time: lifecycle.expires_at,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle {
            owner: self.user_dn.clone(),
            created_at: self.creation_time,
            expires_at: self.expiration_time,
        }
    }

    pub fn to_object(&self) -> DynamicObject {
        let mut obj = DynamicObject::new(&self.user_id, &ResourceKind::Principal.api_resource())
            .data(json!({
                "principalIds": self.principal_ids,
                "description": "Created by tenancy",
                "username": self.display_name,
            }));
        obj.metadata.labels = Some(BTreeMap::from([(
            labels::USER_ID.to_string(),
            self.user_id.clone(),
        )]));
        self.lifecycle().stamp(&mut obj.metadata);
        obj
    }

    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let user_id = obj
            .metadata
            .name
            .clone()
            .ok_or_else(|| malformed("principal without a name"))?;
        let lifecycle = Lifecycle::decode(&obj.metadata)?;

        let display_name = obj
            .data
            .get("username")
            .and_then(|v| v.as_str())
            .ok_or_else(|| malformed(format!("principal {}: missing username", user_id)))?
            .to_string();

        let principal_ids = obj
            .data
            .get("principalIds")
            .and_then(|v| v.as_array())
            .ok_or_else(|| malformed(format!("principal {}: missing principalIds", user_id)))?
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    malformed(format!("principal {}: non-string principal id", user_id))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            user_id,
            display_name,
            principal_ids,
            user_dn: lifecycle.owner,
            creation_time: lifecycle.created_at,
            expiration_time: lifecycle.expires_at,
        })
    }
}

fn malformed(msg: impl Into<String>) -> OrchestratorError {
    OrchestratorError::MalformedMetadata(msg.into())
}
