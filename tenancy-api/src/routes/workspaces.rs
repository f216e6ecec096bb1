use crate::{error::ApiResult, state::AppState};
use axum::{extract::State, http::StatusCode, routing::get, Extension, Json, Router};
use serde_json::{json, Value};
use tenancy_orchestrator::{TenantIdentity, Workspace};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/v1/project",
        get(get_workspace)
            .post(create_workspace)
            .delete(delete_workspace),
    )
}

#[utoipa::path(
    get,
    path = "/api/v1/project",
    tag = "workspaces",
    responses(
        (status = 200, description = "Workspace of the calling identity", body = Workspace),
        (status = 400, description = "No identity header"),
        (status = 404, description = "No workspace for this identity"),
    )
)]
pub async fn get_workspace(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<Json<Workspace>> {
    let workspace = state.orchestrator.get_workspace(&identity).await?;
    Ok(Json(workspace))
}

#[utoipa::path(
    post,
    path = "/api/v1/project",
    tag = "workspaces",
    responses(
        (status = 201, description = "Workspace and owner role grant created", body = Workspace),
        (status = 400, description = "No identity header"),
        (status = 404, description = "The identity has no principal yet"),
        (status = 409, description = "Workspace already exists"),
    )
)]
pub async fn create_workspace(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<(StatusCode, Json<Workspace>)> {
    let workspace = state.orchestrator.provision_workspace(&identity).await?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/project",
    tag = "workspaces",
    responses(
        (status = 200, description = "Workspace and its role grants deleted"),
        (status = 400, description = "No identity header"),
        (status = 404, description = "No workspace for this identity"),
    )
)]
pub async fn delete_workspace(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
) -> ApiResult<Json<Value>> {
    let workspace = state.orchestrator.deprovision_workspace(&identity).await?;
    Ok(Json(json!({
        "message": "Workspace deleted",
        "projectId": workspace.project_id,
        "clusterId": workspace.cluster_id,
    })))
}
