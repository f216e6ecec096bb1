//! Read path and duplicate guard.
//!
//! The backing store cannot enforce "one record per owner", so every read
//! disambiguates: zero matches, one match, or an invariant violation that is
//! always surfaced.

use crate::error::{OrchestratorError, Result};
use crate::identity::TenantIdentity;
use crate::labels::{self, LabelSelector};
use crate::orchestrator::TenantOrchestrator;
use crate::principal::Principal;
use crate::store::ResourceKind;
use crate::workspace::Workspace;
use kube::core::DynamicObject;
use tracing::{debug, instrument};

fn at_most_one(
    kind: ResourceKind,
    identity: &TenantIdentity,
    mut records: Vec<DynamicObject>,
) -> Result<Option<DynamicObject>> {
    match records.len() {
        0 => Ok(None),
        1 => Ok(records.pop()),
        n => Err(OrchestratorError::InvariantViolated(format!(
            "{} {} records owned by {}",
            n, kind, identity
        ))),
    }
}

fn exactly_one(
    kind: ResourceKind,
    identity: &TenantIdentity,
    records: Vec<DynamicObject>,
) -> Result<DynamicObject> {
    at_most_one(kind, identity, records)?.ok_or_else(|| {
        OrchestratorError::NotFound(format!("no {} owned by {}", kind, identity))
    })
}

/// False only when the record names a different owner. The hashed owner
/// label is not unique on its own: a verbatim identity can spell another
/// identity's hash.
fn owned_by(record: &DynamicObject, identity: &TenantIdentity) -> bool {
    record
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(labels::OWNER_DN))
        .map_or(true, |owner| owner == identity.as_str())
}

impl TenantOrchestrator {
    pub(crate) async fn owned(
        &self,
        kind: ResourceKind,
        identity: &TenantIdentity,
    ) -> Result<Vec<DynamicObject>> {
        let namespace = kind.is_namespaced().then(|| self.config.cluster_id.as_str());
        let mut records = self
            .store
            .list(kind, namespace, &LabelSelector::owned_by(identity))
            .await?;
        records.retain(|record| owned_by(record, identity));
        debug!(kind = %kind, count = records.len(), "owner lookup");
        Ok(records)
    }

    /// Whether a principal exists for `identity`.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn principal_exists(&self, identity: &TenantIdentity) -> Result<bool> {
        let records = self.owned(ResourceKind::Principal, identity).await?;
        Ok(at_most_one(ResourceKind::Principal, identity, records)?.is_some())
    }

    /// Whether a workspace exists for `identity` on the configured cluster.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn workspace_exists(&self, identity: &TenantIdentity) -> Result<bool> {
        let records = self.owned(ResourceKind::Workspace, identity).await?;
        Ok(at_most_one(ResourceKind::Workspace, identity, records)?.is_some())
    }

    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn get_principal(&self, identity: &TenantIdentity) -> Result<Principal> {
        let records = self.owned(ResourceKind::Principal, identity).await?;
        Principal::from_object(&exactly_one(ResourceKind::Principal, identity, records)?)
    }

    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn get_workspace(&self, identity: &TenantIdentity) -> Result<Workspace> {
        let records = self.owned(ResourceKind::Workspace, identity).await?;
        Workspace::from_object(&exactly_one(ResourceKind::Workspace, identity, records)?)
    }

    /// Name of the single global role grant owned by `identity`.
    pub(crate) async fn global_grant_name(&self, identity: &TenantIdentity) -> Result<String> {
        let records = self.owned(ResourceKind::GlobalRoleGrant, identity).await?;
        let grant = exactly_one(ResourceKind::GlobalRoleGrant, identity, records)?;
        grant.metadata.name.ok_or_else(|| {
            OrchestratorError::MalformedMetadata(format!(
                "{} owned by {} has no name",
                ResourceKind::GlobalRoleGrant,
                identity
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TenancyConfig;
    use crate::store::{MemoryStore, ResourceStore};
    use std::sync::Arc;

    fn setup() -> (MemoryStore, TenantOrchestrator) {
        let store = MemoryStore::new();
        let orchestrator = TenantOrchestrator::new(
            Arc::new(store.clone()),
            TenancyConfig::new("local", "local", "user", "project-owner"),
        );
        (store, orchestrator)
    }

    fn alice() -> TenantIdentity {
        TenantIdentity::new("CN=alice").unwrap()
    }

    #[tokio::test]
    async fn test_exists_is_false_for_unknown_identity() {
        let (_, orchestrator) = setup();
        assert!(!orchestrator.principal_exists(&alice()).await.unwrap());
        assert!(!orchestrator.workspace_exists(&alice()).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_missing_principal_is_not_found() {
        let (_, orchestrator) = setup();
        assert!(matches!(
            orchestrator.get_principal(&alice()).await,
            Err(OrchestratorError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_records_violate_invariant() {
        let (store, orchestrator) = setup();
        for id in ["tenancy-aaaaa", "tenancy-bbbbb"] {
            let principal = Principal::generate(id.to_string(), alice(), "local");
            store
                .create(ResourceKind::Principal, None, principal.to_object())
                .await
                .unwrap();
        }

        assert!(matches!(
            orchestrator.principal_exists(&alice()).await,
            Err(OrchestratorError::InvariantViolated(_))
        ));
        assert!(matches!(
            orchestrator.get_principal(&alice()).await,
            Err(OrchestratorError::InvariantViolated(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_record_surfaces() {
        let (store, orchestrator) = setup();
        let principal = Principal::generate("tenancy-aaaaa".to_string(), alice(), "local");
        let mut obj = principal.to_object();
        obj.metadata
            .labels
            .as_mut()
            .unwrap()
            .insert(crate::labels::CREATION_TIME.to_string(), "garbage".to_string());
        store.insert(ResourceKind::Principal, None, obj);

        // The guard only counts; the resolver has to decode.
        assert!(orchestrator.principal_exists(&alice()).await.unwrap());
        assert!(matches!(
            orchestrator.get_principal(&alice()).await,
            Err(OrchestratorError::MalformedMetadata(_))
        ));
    }

    #[tokio::test]
    async fn test_identity_spelling_another_owners_hash_sees_nothing() {
        let (store, orchestrator) = setup();
        orchestrator.provision_principal(&alice()).await.unwrap();

        // A valid label value is used as-is, so this selects alice's records.
        let lookalike =
            TenantIdentity::new(labels::encode_label_value(alice().as_str())).unwrap();
        assert!(lookalike.as_str().starts_with("dn-"));

        assert!(!orchestrator.principal_exists(&lookalike).await.unwrap());
        assert!(matches!(
            orchestrator.get_principal(&lookalike).await,
            Err(OrchestratorError::NotFound(_))
        ));
        assert!(matches!(
            orchestrator.deprovision_principal(&lookalike).await,
            Err(OrchestratorError::NotFound(_))
        ));

        let survivor = orchestrator.get_principal(&alice()).await.unwrap();
        assert_eq!(survivor.user_dn, alice());
        assert_eq!(store.count(ResourceKind::Principal), 1);
        assert_eq!(store.count(ResourceKind::GlobalRoleGrant), 1);
    }

    #[tokio::test]
    async fn test_workspace_lookup_is_scoped_to_cluster() {
        let (store, orchestrator) = setup();
        let elsewhere = Workspace::generate("tenancy-qwert".to_string(), "other", alice());
        store
            .create(ResourceKind::Workspace, Some("other"), elsewhere.to_object())
            .await
            .unwrap();

        assert!(!orchestrator.workspace_exists(&alice()).await.unwrap());
    }
}
