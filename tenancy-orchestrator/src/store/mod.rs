//! Narrow list/create/delete surface over the custom-resource store.
//!
//! Every call is independent: nothing here spans more than one request to
//! the backing store, so callers that need multi-record consistency have to
//! compensate themselves.

pub mod dry_run;
pub mod kube;
pub mod memory;

use crate::labels::LabelSelector;
use ::kube::core::{ApiResource, DynamicObject, GroupVersionKind};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub use self::dry_run::DryRunStore;
pub use self::kube::KubeStore;
pub use self::memory::MemoryStore;

pub const API_GROUP: &str = "management.cattle.io";
pub const API_VERSION: &str = "v3";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Principal,
    Workspace,
    GlobalRoleGrant,
    WorkspaceRoleGrant,
}

impl ResourceKind {
    /// Kind name and plural in the management API group.
    fn kind_and_plural(self) -> (&'static str, &'static str) {
        match self {
            ResourceKind::Principal => ("User", "users"),
            ResourceKind::Workspace => ("Project", "projects"),
            ResourceKind::GlobalRoleGrant => ("GlobalRoleBinding", "globalrolebindings"),
            ResourceKind::WorkspaceRoleGrant => (
                "ProjectRoleTemplateBinding",
                "projectroletemplatebindings",
            ),
        }
    }

    pub fn api_resource(self) -> ApiResource {
        let (kind, plural) = self.kind_and_plural();
        ApiResource::from_gvk_with_plural(
            &GroupVersionKind::gvk(API_GROUP, API_VERSION, kind),
            plural,
        )
    }

    /// Principals and global grants are cluster-scoped.
    pub fn is_namespaced(self) -> bool {
        matches!(
            self,
            ResourceKind::Workspace | ResourceKind::WorkspaceRoleGrant
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_and_plural().0)
    }
}

#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Records of `kind` matching `selector`. No match is an empty list.
    async fn list(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        selector: &LabelSelector,
    ) -> StoreResult<Vec<DynamicObject>>;

    /// Fails with [`StoreError::Conflict`] when the name is taken.
    async fn create(
        &self,
        kind: ResourceKind,
        namespace: Option<&str>,
        object: DynamicObject,
    ) -> StoreResult<()>;

    /// Fails with [`StoreError::NotFound`] when nothing has that name.
    async fn delete(&self, kind: ResourceKind, namespace: Option<&str>, name: &str)
        -> StoreResult<()>;
}
