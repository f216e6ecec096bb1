//! Tenant provisioning business logic
//!
//! This crate owns the lifecycle of a tenant's records in the cluster's
//! management API: one principal with a global role grant, and one
//! quota-bounded workspace with an owner role grant. It is consumed by the
//! tenancy-api HTTP service but only depends on the [`store::ResourceStore`]
//! seam, so it can run against a live cluster or an in-memory store.

pub mod config;
pub mod deprovision;
pub mod error;
pub mod grant;
pub mod identity;
pub mod ids;
pub mod labels;
pub mod lookup;
pub mod orchestrator;
pub mod principal;
pub mod provision;
pub mod quota;
pub mod store;
pub mod workspace;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{IdStrategy, TenancyConfig};
pub use error::{OrchestratorError, Result};
pub use identity::TenantIdentity;
pub use orchestrator::TenantOrchestrator;
pub use principal::Principal;
pub use provision::ProvisionStage;
pub use quota::QuotaDeclaration;
pub use store::{DryRunStore, KubeStore, MemoryStore, ResourceKind, ResourceStore, StoreError};
pub use workspace::Workspace;
