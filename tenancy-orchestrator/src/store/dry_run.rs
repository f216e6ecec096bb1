use super::{ResourceKind, ResourceStore, StoreResult};
use crate::labels::LabelSelector;
use ::kube::core::DynamicObject;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Logs creates instead of performing them. Reads and deletes go through.
#[derive(Clone)]
pub struct DryRunStore {
    inner: Arc<dyn ResourceStore>,
}

impl DryRunStore {
    pub fn new(inner: Arc<dyn ResourceStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ResourceStore for DryRunStore {
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> StoreResult<Vec<DynamicObject>> {
        self.inner.list(kind, namespace, selector).await
    }

    async fn create(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        object: DynamicObject,
    ) -> StoreResult<()> {
        let rendered = serde_json::to_string(&object).unwrap_or_else(|e| e.to_string());
        info!(
            kind = %kind,
            namespace = namespace.unwrap_or(""),
            "[dry-run] would create: {}",
            rendered
        );
        Ok(())
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<()> {
        self.inner.delete(kind, namespace, name).await
    }
}
