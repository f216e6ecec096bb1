use tenancy_orchestrator::{Principal, QuotaDeclaration, Workspace};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::health::liveness,
        crate::routes::principals::get_principal,
        crate::routes::principals::create_principal,
        crate::routes::principals::delete_principal,
        crate::routes::workspaces::get_workspace,
        crate::routes::workspaces::create_workspace,
        crate::routes::workspaces::delete_workspace,
    ),
    components(schemas(Principal, Workspace, QuotaDeclaration)),
    tags(
        (name = "principals", description = "Tenant accounts and their global role"),
        (name = "workspaces", description = "Quota-bounded projects and their owner role"),
        (name = "health", description = "Liveness probes")
    )
)]
pub struct ApiDoc;
