use crate::{error::ApiResult, state::AppState};
use axum::{extract::State, http::StatusCode, routing::get, Extension, Json, Router};
use serde_json::{json, Value};
use tenancy_orchestrator::{Principal, TenantIdentity};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/v1/user",
        get(get_principal)
            .post(create_principal)
            .delete(delete_principal),
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/user",
    tag = "principals",
    responses(
        (status = 200, description = "Principal of the calling identity", body = Principal),
        (status = 401, description = "No identity header"),
        (status = 404, description = "No principal for this identity"),
    )
)]
pub async fn get_principal(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<Json<Principal>> {
    let principal = state.orchestrator.get_principal(&identity).await?;
    Ok(Json(principal))
}

#[utoipa::path(
    post,
    path = "/api/v1/user",
    tag = "principals",
    responses(
        (status = 201, description = "Principal and global role grant created", body = Principal),
        (status = 401, description = "No identity header"),
        (status = 409, description = "Principal already exists"),
    )
)]
pub async fn create_principal(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<(StatusCode, Json<Principal>)> {
    let principal = state.orchestrator.provision_principal(&identity).await?;
    Ok((StatusCode::CREATED, Json(principal)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/user",
    tag = "principals",
    responses(
        (status = 200, description = "Principal and global role grant deleted"),
        (status = 401, description = "No identity header"),
        (status = 404, description = "No principal for this identity"),
    )
)]
pub async fn delete_principal(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<Json<Value>> {
    let principal = state.orchestrator.deprovision_principal(&identity).await?;
    Ok(Json(json!({
        "message": "Principal deleted",
        "userId": principal.user_id,
    })))
}
