use super::{ResourceKind, ResourceStore, StoreError, StoreResult};
use crate::labels::LabelSelector;
use ::kube::core::DynamicObject;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

type Key = (ResourceKind, Option<String>, String);

/// Process-local store with the same name/label semantics as the cluster.
///
/// Used for local development and as the fake backing store in tests.
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<BTreeMap<Key, DynamicObject>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, BTreeMap<Key, DynamicObject>> {
        // A panic while holding the lock cannot leave a half-written map.
        self.objects
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn key(kind: ResourceKind, namespace: Option<&str>, name: &str) -> Key {
        let namespace = if kind.is_namespaced() {
            namespace.map(str::to_string)
        } else {
            None
        };
        (kind, namespace, name.to_string())
    }

    /// Number of stored records of `kind` across all namespaces.
    pub fn count(&self, kind: ResourceKind) -> usize {
        self.objects().keys().filter(|(k, _, _)| *k == kind).count()
    }

    pub fn get(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Option<DynamicObject> {
        self.objects()
            .get(&Self::key(kind, namespace, name))
            .cloned()
    }

    /// Stores a record without any conflict check, e.g. to seed a state the
    /// orchestrator itself would never produce.
    pub fn insert(&self, kind: ResourceKind, namespace: Option<&str>, object: DynamicObject) {
        let name = object.metadata.name.clone().unwrap_or_default();
        self.objects()
            .insert(Self::key(kind, namespace, &name), object);
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> StoreResult<Vec<DynamicObject>> {
        let scoped_ns = namespace.filter(|_| kind.is_namespaced());
        Ok(self
            .objects()
            .iter()
            .filter(|((k, ns, _), _)| *k == kind && (scoped_ns.is_none() || ns.as_deref() == scoped_ns))
            .filter(|(_, obj)| selector.matches(obj.metadata.labels.as_ref()))
            .map(|(_, obj)| obj.clone())
            .collect())
    }

    async fn create(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        mut object: DynamicObject,
    ) -> StoreResult<()> {
        let name = object
            .metadata
            .name
            .clone()
            .ok_or_else(|| StoreError::Unavailable(format!("{} without a name", kind)))?;
        let key = Self::key(kind, namespace, &name);

        let mut objects = self.objects();
        if objects.contains_key(&key) {
            return Err(StoreError::Conflict(format!(
                "{} \"{}\" already exists",
                kind, name
            )));
        }
        object.metadata.namespace = key.1.clone();
        objects.insert(key, object);
        Ok(())
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<()> {
        self.objects()
            .remove(&Self::key(kind, namespace, name))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("{} \"{}\" not found", kind, name)))
    }
}
