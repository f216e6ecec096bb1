//! Integration tests for the identity middlewares
//!
//! Tests that both middlewares resolve the tenant identity from the trusted
//! headers and reject requests without one with the right status.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
    Router,
};
use tenancy_api::auth::{auth_middleware, identity_header_middleware};
use tenancy_orchestrator::TenantIdentity;
use tower::ServiceExt; // for `oneshot`

// Simple handler that echoes the resolved identity
async fn test_handler(axum::Extension(identity): axum::Extension<TenantIdentity>) -> String {
    identity.to_string()
}

fn create_test_app() -> Router {
    Router::new()
        .route(
            "/principal",
            get(test_handler).layer(middleware::from_fn(auth_middleware)),
        )
        .route(
            "/workspace",
            get(test_handler).layer(middleware::from_fn(identity_header_middleware)),
        )
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_userdn_header_passes() {
    let app = create_test_app();

    let request = Request::builder()
        .uri("/principal")
        .header("UserDN", "CN=alice,OU=people")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "CN=alice,OU=people");
}

#[tokio::test]
async fn test_proxy_header_takes_precedence() {
    let app = create_test_app();

    let request = Request::builder()
        .uri("/principal")
        .header("x-client-dn", "CN=alice")
        .header("UserDN", "CN=mallory")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "CN=alice");
}

#[tokio::test]
async fn test_missing_identity_on_principal_route_is_unauthorized() {
    let app = create_test_app();

    let request = Request::builder()
        .uri("/principal")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_identity_on_workspace_route_is_bad_request() {
    let app = create_test_app();

    let request = Request::builder()
        .uri("/workspace")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_identity_is_rejected() {
    let app = create_test_app();

    let request = Request::builder()
        .uri("/principal")
        .header("UserDN", "   ")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
