//! Tenant context for ledger routes.
//!
//! Tenant routing happens upstream; by the time a request reaches the
//! ledger it carries the tenant id in the `X-Tenant-Id` header.

use axum::{extract::FromRequestParts, http::request::Parts};

use defter_shared::AppError;
use defter_shared::types::TenantId;

use crate::error::ApiError;

/// Header carrying the tenant id.
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Extractor for the tenant a request operates on.
///
/// ```ignore
/// async fn handler(TenantContext(tenant_id): TenantContext) -> impl IntoResponse {
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantContext(pub TenantId);

impl TenantContext {
    /// Returns the tenant ID.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.0
    }
}

fn parse_tenant_header(parts: &Parts) -> Result<TenantId, AppError> {
    let raw = parts
        .headers
        .get(TENANT_HEADER)
        .ok_or_else(|| AppError::MissingTenant("X-Tenant-Id header is required".to_string()))?;
    let raw = raw
        .to_str()
        .map_err(|_| AppError::MissingTenant("X-Tenant-Id header is not valid text".to_string()))?;
    raw.trim()
        .parse()
        .map_err(|_| AppError::MissingTenant(format!("X-Tenant-Id '{raw}' is not a UUID")))
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parse_tenant_header(parts)?))
    }
}
