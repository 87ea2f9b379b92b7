//! Journal voucher routes.
//!
//! Producer modules post through these; a voucher carrying a source
//! reference can be looked up and replaced by the module that made it.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use defter_core::ledger::{SourceRef, Voucher, VoucherInput, VoucherType};
use defter_db::{VoucherFilter, VoucherRepository, VoucherWithLines};
use defter_shared::types::{FiscalPeriodId, VoucherId};

use crate::{AppState, error::ApiError, middleware::TenantContext};

/// Creates the voucher routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vouchers", get(list_vouchers).post(create_voucher))
        .route("/vouchers/by-source", get(find_by_source))
        .route(
            "/vouchers/{voucher_id}",
            get(get_voucher).put(update_voucher).delete(delete_voucher),
        )
}

/// Query parameters for listing vouchers.
#[derive(Debug, Default, Deserialize)]
pub struct ListVouchersQuery {
    /// Filter by fiscal period.
    pub fiscal_period_id: Option<FiscalPeriodId>,
    /// Filter by voucher type, e.g. `GENERAL`.
    #[serde(rename = "type")]
    pub voucher_type: Option<VoucherType>,
    /// Earliest voucher date (inclusive).
    pub from: Option<NaiveDate>,
    /// Latest voucher date (inclusive).
    pub to: Option<NaiveDate>,
    /// Only finalized (`true`) or only in-progress (`false`) vouchers.
    pub locked: Option<bool>,
}

impl From<ListVouchersQuery> for VoucherFilter {
    fn from(query: ListVouchersQuery) -> Self {
        Self {
            fiscal_period_id: query.fiscal_period_id,
            voucher_type: query.voucher_type,
            date_from: query.from,
            date_to: query.to,
            locked: query.locked,
        }
    }
}

/// Query parameters for a source lookup.
#[derive(Debug, Deserialize)]
pub struct SourceQuery {
    /// Producing module name.
    pub module: String,
    /// Record id inside that module.
    pub record_id: Uuid,
}

/// Response for a voucher listing.
#[derive(Debug, Serialize)]
pub struct VoucherListResponse {
    /// Voucher headers.
    pub vouchers: Vec<Voucher>,
}

/// GET `/vouchers` - List voucher headers.
async fn list_vouchers(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Query(query): Query<ListVouchersQuery>,
) -> Result<Json<VoucherListResponse>, ApiError> {
    if let (Some(from), Some(to)) = (query.from, query.to)
        && from > to
    {
        return Err(ApiError::validation(format!("from {from} is after to {to}")));
    }
    let vouchers = repository(&state).list(tenant_id, query.into()).await?;
    Ok(Json(VoucherListResponse { vouchers }))
}

/// POST `/vouchers` - Create a voucher with its lines.
async fn create_voucher(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<VoucherInput>,
) -> Result<impl IntoResponse, ApiError> {
    let created = repository(&state).create(tenant_id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET `/vouchers/by-source` - Find the voucher a producer module created.
async fn find_by_source(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Query(query): Query<SourceQuery>,
) -> Result<Json<VoucherWithLines>, ApiError> {
    let source = SourceRef {
        module: query.module,
        record_id: query.record_id,
    };
    repository(&state)
        .find_by_source(tenant_id, &source)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError(defter_shared::AppError::NotFound(format!(
                "No voucher for {} record {}",
                source.module, source.record_id
            )))
        })
}

/// GET `/vouchers/{voucher_id}` - Get a voucher with its lines.
async fn get_voucher(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(voucher_id): Path<VoucherId>,
) -> Result<Json<VoucherWithLines>, ApiError> {
    Ok(Json(repository(&state).get(tenant_id, voucher_id).await?))
}

/// PUT `/vouchers/{voucher_id}` - Replace a voucher's header and lines.
async fn update_voucher(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(voucher_id): Path<VoucherId>,
    Json(payload): Json<VoucherInput>,
) -> Result<Json<VoucherWithLines>, ApiError> {
    Ok(Json(repository(&state).update(tenant_id, voucher_id, payload).await?))
}

/// DELETE `/vouchers/{voucher_id}` - Delete an unlocked voucher.
async fn delete_voucher(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(voucher_id): Path<VoucherId>,
) -> Result<StatusCode, ApiError> {
    repository(&state).delete(tenant_id, voucher_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn repository(state: &AppState) -> VoucherRepository {
    VoucherRepository::new(state.conn(), state.ledger.voucher_number_digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_maps_to_filter() {
        let query: ListVouchersQuery =
            serde_json::from_value(serde_json::json!({ "type": "CASH_RECEIPT", "from": "2025-01-01", "locked": false }))
                .unwrap();
        let filter = VoucherFilter::from(query);
        assert_eq!(filter.voucher_type, Some(VoucherType::CashReceipt));
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(filter.date_to, None);
        assert_eq!(filter.locked, Some(false));
    }
}
