//! Store and id doubles shared by unit tests and the API crate's tests.

use crate::identity::TenantIdentity;
use crate::ids::IdGenerator;
use crate::labels::LabelSelector;
use crate::store::{ResourceKind, ResourceStore, StoreError, StoreResult};
use async_trait::async_trait;
use kube::core::DynamicObject;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Create,
    Delete,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Op::List => "list",
            Op::Create => "create",
            Op::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub op: Op,
    pub kind: ResourceKind,
    /// Record name for create/delete, empty for list.
    pub name: String,
}

#[derive(Default)]
struct Faults {
    calls: Vec<Call>,
    failures: HashMap<(Op, ResourceKind), StoreError>,
    hidden: HashSet<ResourceKind>,
}

/// Wraps another store, records every call in order and fails the ones it
/// was told to fail. Failed calls never reach the inner store.
///
/// Listings of a hidden kind come back empty, like a read that raced a
/// concurrent create.
#[derive(Clone)]
pub struct FaultyStore {
    inner: Arc<dyn ResourceStore>,
    faults: Arc<Mutex<Faults>>,
}

impl FaultyStore {
    pub fn new(inner: Arc<dyn ResourceStore>) -> Self {
        Self {
            inner,
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fail every `op` on `kind` as if the store were unreachable.
    pub fn fail_on(&self, op: Op, kind: ResourceKind) {
        let err = StoreError::Unavailable(format!("injected failure: {} {}", op, kind));
        self.fail_with(op, kind, err);
    }

    pub fn fail_with(&self, op: Op, kind: ResourceKind, err: StoreError) {
        self.faults().failures.insert((op, kind), err);
    }

    /// Answer every list of `kind` with no records.
    pub fn hide_listings(&self, kind: ResourceKind) {
        self.faults().hidden.insert(kind);
    }

    pub fn heal(&self) {
        let mut faults = self.faults();
        faults.failures.clear();
        faults.hidden.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.faults().calls.clone()
    }

    pub fn calls_of(&self, op: Op) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.op == op).collect()
    }

    fn enter(&self, op: Op, kind: ResourceKind, name: &str) -> StoreResult<()> {
        let mut faults = self.faults();
        faults.calls.push(Call {
            op,
            kind,
            name: name.to_string(),
        });
        match faults.failures.get(&(op, kind)) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ResourceStore for FaultyStore {
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> StoreResult<Vec<DynamicObject>> {
        self.enter(Op::List, kind, "")?;
        if self.faults().hidden.contains(&kind) {
            return Ok(Vec::new());
        }
        self.inner.list(kind, namespace, selector).await
    }

    async fn create(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        object: DynamicObject,
    ) -> StoreResult<()> {
        let name = object.metadata.name.clone().unwrap_or_default();
        self.enter(Op::Create, kind, &name)?;
        self.inner.create(kind, namespace, object).await
    }

    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<()> {
        self.enter(Op::Delete, kind, name)?;
        self.inner.delete(kind, namespace, name).await
    }
}

/// Hands out a fixed sequence of ids, then repeats the last one.
pub struct FixedIds {
    ids: Mutex<VecDeque<String>>,
    last: Mutex<String>,
}

impl FixedIds {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Mutex::new(ids.into_iter().map(Into::into).collect()),
            last: Mutex::new(String::from("tenancy-zzzzz")),
        }
    }

    pub fn always(id: &str) -> Self {
        Self::new([id])
    }
}

impl IdGenerator for FixedIds {
    fn generate(&self, _kind: ResourceKind, _identity: &TenantIdentity, _cluster_id: &str) -> String {
        let mut last = self.last.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(next) = self.ids.lock().unwrap_or_else(|p| p.into_inner()).pop_front() {
            *last = next;
        }
        last.clone()
    }
}
