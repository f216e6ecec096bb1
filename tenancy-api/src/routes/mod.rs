pub mod health;
pub mod principals;
pub mod workspaces;

use crate::{
    api_docs::ApiDoc,
    auth::{auth_middleware, identity_header_middleware, CLIENT_DN_HEADER, USER_DN_HEADER},
    state::AppState,
};
use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::get,
    Json, Router,
};
use tenancy_orchestrator::TenantOrchestrator;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

pub async fn create_app(orchestrator: TenantOrchestrator) -> anyhow::Result<Router> {
    let state = AppState::new(orchestrator);

    // Browser frontends call the API directly through the proxy.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            header::AUTHORIZATION,
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static(USER_DN_HEADER),
            HeaderName::from_static(CLIENT_DN_HEADER),
        ]);

    let app = Router::new()
        .merge(health::routes()) // Health routes don't need an identity
        .route("/api-docs/openapi.json", get(openapi_spec))
        .merge(principals::routes().layer(middleware::from_fn(auth_middleware)))
        .merge(workspaces::routes().layer(middleware::from_fn(identity_header_middleware)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
