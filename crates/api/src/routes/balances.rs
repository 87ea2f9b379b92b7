//! Administrative balance routes.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Serialize;
use tracing::warn;

use defter_core::ledger::BalanceDrift;
use defter_db::BalanceRepository;

use crate::{AppState, error::ApiError, middleware::TenantContext};

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/balances/rebuild", post(rebuild_balances))
        .route("/balances/drift", get(get_drift))
}

/// Response for a rebuild.
#[derive(Debug, Serialize)]
pub struct RebuildResponse {
    /// Accounts whose cached totals were wrong and got corrected.
    pub corrected_accounts: usize,
}

/// Response for a drift check.
#[derive(Debug, Serialize)]
pub struct DriftResponse {
    /// Accounts whose cached totals differ from their lines.
    pub drift: Vec<BalanceDrift>,
}

/// POST `/balances/rebuild` - Re-sum every account of the tenant from its lines.
async fn rebuild_balances(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<Json<RebuildResponse>, ApiError> {
    let corrected_accounts = BalanceRepository::new(state.conn()).rebuild_all(tenant_id).await?;
    if corrected_accounts > 0 {
        warn!(tenant_id = %tenant_id, corrected_accounts, "Balance rebuild corrected drifted accounts");
    }
    Ok(Json(RebuildResponse { corrected_accounts }))
}

/// GET `/balances/drift` - Compare cached totals with the lines without changing anything.
async fn get_drift(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<Json<DriftResponse>, ApiError> {
    let drift = BalanceRepository::new(state.conn()).verify(tenant_id).await?;
    Ok(Json(DriftResponse { drift }))
}
