use crate::config::TenancyConfig;
use crate::ids::{self, IdGenerator};
use crate::store::ResourceStore;
use std::sync::Arc;

/// Entry point for every tenant operation.
///
/// Holds no mutable state: two requests for the same identity only see each
/// other through the backing store. Cheap to clone.
#[derive(Clone)]
pub struct TenantOrchestrator {
    pub(crate) store: Arc<dyn ResourceStore>,
    pub(crate) config: Arc<TenancyConfig>,
    pub(crate) ids: Arc<dyn IdGenerator>,
}

impl TenantOrchestrator {
    pub fn new(store: Arc<dyn ResourceStore>, config: TenancyConfig) -> Self {
        let ids = ids::from_config(&config);
        Self {
            store,
            config: Arc::new(config),
            ids,
        }
    }

    /// Replace the id generator picked from the configuration.
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &TenancyConfig {
        &self.config
    }

    pub fn cluster_id(&self) -> &str {
        &self.config.cluster_id
    }
}
