//! Integration tests for REST API endpoints
//!
//! Tests principal and workspace provisioning, lookup and teardown over HTTP,
//! including the status code mapping of every failure path.

mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{TestClient, PROJECT_PATH, USER_PATH};
use serde_json::Value;
use tenancy_orchestrator::ids::is_generated_id;
use tenancy_orchestrator::test_utils::Op;
use tenancy_orchestrator::{Principal, ResourceKind, Workspace};

const ALICE: &str = "CN=alice";

#[tokio::test]
async fn test_create_principal_endpoint() {
    let client = TestClient::new().await;

    let response = client.post(USER_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let principal: Principal = common::extract_json_body(response).await;
    assert!(is_generated_id(&principal.user_id, "tenancy"));
    assert_eq!(principal.user_dn.as_str(), ALICE);
    assert_eq!(
        principal.expiration_time,
        principal.creation_time + Duration::days(1)
    );
    assert_eq!(client.store.count(ResourceKind::GlobalRoleGrant), 1);
}

#[tokio::test]
async fn test_principal_json_uses_camel_case() {
    let client = TestClient::new().await;

    let response = client.post(USER_PATH, Some(ALICE)).await;
    let body: Value = common::extract_json_body(response).await;

    for field in [
        "userId",
        "displayName",
        "principalIds",
        "userDn",
        "creationTime",
        "expirationTime",
    ] {
        assert!(body.get(field).is_some(), "missing {}", field);
    }
    assert_eq!(body["userDn"], ALICE);
}

#[tokio::test]
async fn test_second_create_conflicts_and_keeps_original() {
    let client = TestClient::new().await;

    let first: Principal =
        common::extract_json_body(client.post(USER_PATH, Some(ALICE)).await).await;

    let response = client.post(USER_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = common::extract_json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let response = client.get(USER_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Principal = common::extract_json_body(response).await;
    assert_eq!(fetched.user_id, first.user_id);
    assert_eq!(client.store.count(ResourceKind::Principal), 1);
}

#[tokio::test]
async fn test_principal_routes_require_identity() {
    let client = TestClient::new().await;

    for method in ["GET", "POST", "DELETE"] {
        let response = client.call(method, USER_PATH, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", method);
        let body: Value = common::extract_json_body(response).await;
        assert!(body["error"].is_string());
    }
    assert_eq!(client.store.count(ResourceKind::Principal), 0);
}

#[tokio::test]
async fn test_get_unknown_principal_is_not_found() {
    let client = TestClient::new().await;

    let response = client.get(USER_PATH, Some("CN=nobody")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_principal_endpoint() {
    let client = TestClient::new().await;
    let created: Principal =
        common::extract_json_body(client.post(USER_PATH, Some(ALICE)).await).await;

    let response = client.delete(USER_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = common::extract_json_body(response).await;
    assert_eq!(body["userId"], created.user_id.as_str());

    assert_eq!(client.store.count(ResourceKind::Principal), 0);
    assert_eq!(client.store.count(ResourceKind::GlobalRoleGrant), 0);

    let response = client.get(USER_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_principal_is_not_found() {
    let client = TestClient::new().await;

    let response = client.delete(USER_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_grant_failure_rolls_back_principal() {
    let (client, faulty) = TestClient::with_faults().await;
    faulty.fail_on(Op::Create, ResourceKind::GlobalRoleGrant);

    let response = client.post(USER_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(client.store.count(ResourceKind::Principal), 0);

    // Once the store recovers the same identity can be provisioned.
    faulty.heal();
    let response = client.post(USER_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_workspace_endpoint() {
    let client = TestClient::new().await;
    client.post(USER_PATH, Some(ALICE)).await;

    let response = client.post(PROJECT_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let workspace: Workspace = common::extract_json_body(response).await;
    assert!(is_generated_id(&workspace.project_id, "tenancy"));
    assert_eq!(workspace.cluster_id, "local");
    assert_eq!(workspace.owner_dn.as_str(), ALICE);
    assert_eq!(workspace.display_name, ALICE);
    assert_eq!(workspace.resources.requests_storage, "10Gi");
    assert_eq!(
        workspace.expiration_time,
        workspace.creation_time + Duration::hours(1)
    );
    assert_eq!(client.store.count(ResourceKind::WorkspaceRoleGrant), 1);

    let response = client.get(PROJECT_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Workspace = common::extract_json_body(response).await;
    assert_eq!(fetched, workspace);
}

#[tokio::test]
async fn test_workspace_without_principal_fails_after_workspace_step() {
    let (client, faulty) = TestClient::with_faults().await;

    let response = client.post(PROJECT_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let creates: Vec<_> = faulty.calls_of(Op::Create).into_iter().map(|c| c.kind).collect();
    assert_eq!(creates, vec![ResourceKind::Workspace]);
    assert_eq!(client.store.count(ResourceKind::Workspace), 0);
    assert_eq!(client.store.count(ResourceKind::WorkspaceRoleGrant), 0);
}

#[tokio::test]
async fn test_second_workspace_conflicts() {
    let client = TestClient::new().await;
    client.post(USER_PATH, Some(ALICE)).await;
    client.post(PROJECT_PATH, Some(ALICE)).await;

    let response = client.post(PROJECT_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(client.store.count(ResourceKind::Workspace), 1);
}

#[tokio::test]
async fn test_workspace_routes_reject_missing_identity() {
    let client = TestClient::new().await;

    for method in ["GET", "POST", "DELETE"] {
        let response = client.call(method, PROJECT_PATH, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", method);
    }
}

#[tokio::test]
async fn test_delete_workspace_endpoint() {
    let client = TestClient::new().await;
    client.post(USER_PATH, Some(ALICE)).await;
    let workspace: Workspace =
        common::extract_json_body(client.post(PROJECT_PATH, Some(ALICE)).await).await;

    let response = client.delete(PROJECT_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = common::extract_json_body(response).await;
    assert_eq!(body["projectId"], workspace.project_id.as_str());

    assert_eq!(client.store.count(ResourceKind::Workspace), 0);
    assert_eq!(client.store.count(ResourceKind::WorkspaceRoleGrant), 0);
    assert_eq!(client.store.count(ResourceKind::Principal), 1);

    let response = client.get(PROJECT_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_store_outage_is_internal_error() {
    let (client, faulty) = TestClient::with_faults().await;
    faulty.fail_on(Op::List, ResourceKind::Principal);

    let response = client.get(USER_PATH, Some(ALICE)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = common::extract_json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("injected failure"));
}

#[tokio::test]
async fn test_health_endpoints() {
    let client = TestClient::new().await;

    let response = client.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = common::extract_json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "tenancy-api");

    let response = client.get("/healthcheck", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let client = TestClient::new().await;

    let response = client.get("/api-docs/openapi.json", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc: Value = common::extract_json_body(response).await;

    assert!(doc["paths"].get(USER_PATH).is_some());
    assert!(doc["paths"].get(PROJECT_PATH).is_some());
    assert!(doc["components"]["schemas"].get("Principal").is_some());
}
