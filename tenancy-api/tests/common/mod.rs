//! Common test utilities and helpers for tenancy-api tests
//!
//! Every test gets its own in-memory store, optionally wrapped in the
//! fault-injecting store from tenancy-orchestrator's `test-utils` feature.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use std::sync::Arc;
use tenancy_orchestrator::test_utils::FaultyStore;
use tenancy_orchestrator::{MemoryStore, ResourceStore, TenancyConfig, TenantOrchestrator};
use tower::ServiceExt; // for `oneshot`

pub const USER_PATH: &str = "/api/v1/user";
pub const PROJECT_PATH: &str = "/api/v1/project";

pub fn test_config() -> TenancyConfig {
    TenancyConfig::new("local", "local", "user", "project-owner")
}

pub fn orchestrator_over(store: Arc<dyn ResourceStore>) -> TenantOrchestrator {
    TenantOrchestrator::new(store, test_config())
}

/// Create a test app over the given orchestrator
pub async fn create_test_app(orchestrator: TenantOrchestrator) -> Router {
    tenancy_api::create_app(orchestrator)
        .await
        .expect("Failed to create test app")
}

/// Helper to extract JSON body from axum response
pub async fn extract_json_body<T>(response: Response<Body>) -> T
where
    T: serde::de::DeserializeOwned,
{
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");

    serde_json::from_slice(&body).expect("Failed to deserialize JSON")
}

/// TestClient to encapsulate API interaction logic
pub struct TestClient {
    pub app: Router,
    pub store: MemoryStore,
}

impl TestClient {
    /// App over a fresh in-memory store
    pub async fn new() -> Self {
        let store = MemoryStore::new();
        let app = create_test_app(orchestrator_over(Arc::new(store.clone()))).await;
        Self { app, store }
    }

    /// App over a fresh in-memory store behind a fault-injecting wrapper
    pub async fn with_faults() -> (Self, FaultyStore) {
        let store = MemoryStore::new();
        let faulty = FaultyStore::new(Arc::new(store.clone()));
        let app = create_test_app(orchestrator_over(Arc::new(faulty.clone()))).await;
        (Self { app, store }, faulty)
    }

    /// Send a request to the API
    pub async fn send_request(&self, request: Request<Body>) -> Response<Body> {
        // Clone the app to allow reuse (Router is cheap to clone)
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Request with the identity passed in the plain `UserDN` header
    pub async fn call(&self, method: &str, uri: &str, identity: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(dn) = identity {
            builder = builder.header("UserDN", dn);
        }
        let request = builder.body(Body::empty()).unwrap();
        self.send_request(request).await
    }

    pub async fn get(&self, uri: &str, identity: Option<&str>) -> Response<Body> {
        self.call("GET", uri, identity).await
    }

    pub async fn post(&self, uri: &str, identity: Option<&str>) -> Response<Body> {
        self.call("POST", uri, identity).await
    }

    pub async fn delete(&self, uri: &str, identity: Option<&str>) -> Response<Body> {
        self.call("DELETE", uri, identity).await
    }
}
