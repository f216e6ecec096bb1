use crate::error::ApiError;
use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use tenancy_orchestrator::TenantIdentity;

/// Set by the mTLS-terminating proxy from the verified client certificate.
pub const CLIENT_DN_HEADER: &str = "x-client-dn";
/// Plain identity header, accepted when no proxy header is present.
pub const USER_DN_HEADER: &str = "userdn";

/// Reads the tenant identity from the trusted upstream headers.
///
/// Certificates are never parsed here; the proxy in front of this service
/// verifies them and forwards the subject DN.
pub fn resolve_identity(headers: &HeaderMap) -> Option<TenantIdentity> {
    [CLIENT_DN_HEADER, USER_DN_HEADER]
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find_map(TenantIdentity::new)
}

/// Principal routes: a request without an identity is unauthenticated (401).
pub async fn auth_middleware(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let identity = resolve_identity(req.headers())
        .ok_or_else(|| ApiError::Unauthorized("identity header not found".to_string()))?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

/// Workspace routes: a missing identity is a malformed request (400).
pub async fn identity_header_middleware(
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = resolve_identity(req.headers())
        .ok_or_else(|| ApiError::BadRequest("identity header not found".to_string()))?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
