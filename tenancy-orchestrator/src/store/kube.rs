use super::{ResourceKind, ResourceStore, StoreError, StoreResult};
use crate::labels::LabelSelector;
use ::kube::api::{Api, DeleteParams, ListParams, PostParams};
use ::kube::core::DynamicObject;
use ::kube::Client;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// [`ResourceStore`] backed by the cluster's dynamic API.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    timeout: Duration,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Upper bound for each individual API call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api(&self, kind: ResourceKind, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = kind.api_resource();
        match namespace {
            Some(ns) if kind.is_namespaced() => {
                Api::namespaced_with(self.client.clone(), ns, &resource)
            }
            _ => Api::all_with(self.client.clone(), &resource),
        }
    }

    async fn bounded<T, F>(&self, what: String, call: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, ::kube::Error>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(|e| map_kube_error(&what, e)),
            Err(_) => Err(StoreError::Unavailable(format!(
                "{} timed out after {:?}",
                what, self.timeout
            ))),
        }
    }
}

fn map_kube_error(what: &str, err: ::kube::Error) -> StoreError {
    match err {
        ::kube::Error::Api(resp) if resp.code == 404 => {
            StoreError::NotFound(format!("{}: {}", what, resp.message))
        }
        ::kube::Error::Api(resp) if resp.code == 409 => {
            StoreError::Conflict(format!("{}: {}", what, resp.message))
        }
        other => StoreError::Unavailable(format!("{}: {}", what, other)),
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    #[instrument(skip(self, selector), fields(selector = %selector.to_query()))]
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> StoreResult<Vec<DynamicObject>> {
        let api = self.api(kind, namespace);
        let query = selector.to_query();
        let params = ListParams::default().labels(&query);
        let list = self
            .bounded(format!("list {}", kind), api.list(&params))
            .await?;
        debug!(count = list.items.len(), "listed {}", kind);
        Ok(list.items)
    }

    #[instrument(skip(self, object), fields(name = object.metadata.name.as_deref().unwrap_or("")))]
    async fn create(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        object: DynamicObject,
    ) -> StoreResult<()> {
        let api = self.api(kind, namespace);
        self.bounded(
            format!("create {}", kind),
            api.create(&PostParams::default(), &object),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        name: &str,
    ) -> StoreResult<()> {
        let api = self.api(kind, namespace);
        self.bounded(
            format!("delete {} {}", kind, name),
            api.delete(name, &DeleteParams::default()),
        )
        .await?;
        Ok(())
    }
}
