//! Fiscal period routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use defter_core::fiscal::{FinalizationSummary, FiscalPeriod, NewFiscalPeriod, PeriodState};
use defter_db::FiscalRepository;
use defter_shared::types::FiscalPeriodId;

use crate::{AppState, error::ApiError, middleware::TenantContext};

/// Creates the fiscal period routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/fiscal-periods", get(list_periods).post(create_period))
        .route("/fiscal-periods/{period_id}", get(get_period).patch(update_period))
        .route("/fiscal-periods/{period_id}/finalize", post(finalize_period))
}

/// Request body for activating or deactivating a period.
#[derive(Debug, Deserialize)]
pub struct UpdatePeriodRequest {
    /// Whether the period accepts new postings.
    pub is_active: bool,
}

/// Request body for finalization.
#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    /// Vouchers dated on or before this day are numbered and locked.
    pub cutoff: NaiveDate,
}

/// A period with its finalization state spelled out.
#[derive(Debug, Serialize)]
pub struct PeriodResponse {
    /// The stored period.
    #[serde(flatten)]
    pub period: FiscalPeriod,
    /// `OPEN`, or `FINALIZED_UP_TO` with the lock date.
    pub finalization: PeriodState,
}

impl From<FiscalPeriod> for PeriodResponse {
    fn from(period: FiscalPeriod) -> Self {
        Self {
            finalization: period.state(),
            period,
        }
    }
}

/// Response for a period listing.
#[derive(Debug, Serialize)]
pub struct PeriodListResponse {
    /// Periods by start date.
    pub fiscal_periods: Vec<PeriodResponse>,
}

/// GET `/fiscal-periods` - List periods by start date.
async fn list_periods(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<Json<PeriodListResponse>, ApiError> {
    let periods = FiscalRepository::new(state.conn()).list_periods(tenant_id).await?;
    Ok(Json(PeriodListResponse {
        fiscal_periods: periods.into_iter().map(PeriodResponse::from).collect(),
    }))
}

/// POST `/fiscal-periods` - Create a period that overlaps no other.
async fn create_period(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Json(payload): Json<NewFiscalPeriod>,
) -> Result<impl IntoResponse, ApiError> {
    let period = FiscalRepository::new(state.conn())
        .create_period(tenant_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(PeriodResponse::from(period))))
}

/// GET `/fiscal-periods/{period_id}` - Get one period.
async fn get_period(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(period_id): Path<FiscalPeriodId>,
) -> Result<Json<PeriodResponse>, ApiError> {
    let period = FiscalRepository::new(state.conn())
        .get_period(tenant_id, period_id)
        .await?;
    Ok(Json(period.into()))
}

/// PATCH `/fiscal-periods/{period_id}` - Activate or deactivate a period.
async fn update_period(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(period_id): Path<FiscalPeriodId>,
    Json(payload): Json<UpdatePeriodRequest>,
) -> Result<Json<PeriodResponse>, ApiError> {
    let period = FiscalRepository::new(state.conn())
        .set_active(tenant_id, period_id, payload.is_active)
        .await?;
    Ok(Json(period.into()))
}

/// POST `/fiscal-periods/{period_id}/finalize` - Number and lock vouchers up to the cutoff.
async fn finalize_period(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Path(period_id): Path<FiscalPeriodId>,
    Json(payload): Json<FinalizeRequest>,
) -> Result<Json<FinalizationSummary>, ApiError> {
    let summary = FiscalRepository::new(state.conn())
        .finalize(tenant_id, period_id, payload.cutoff)
        .await?;
    info!(
        tenant_id = %tenant_id,
        period_id = %period_id,
        finalized = summary.finalized_count,
        last_sequence_number = summary.last_sequence_number,
        "Finalization requested via API"
    );
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use defter_shared::types::TenantId;

    fn period(lock_date: Option<NaiveDate>) -> FiscalPeriod {
        FiscalPeriod {
            id: FiscalPeriodId::new(),
            tenant_id: TenantId::new(),
            name: "2025".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            is_active: true,
            lock_date,
            last_sequence_number: 0,
        }
    }

    #[test]
    fn test_period_response_spells_out_state() {
        let open = serde_json::to_value(PeriodResponse::from(period(None))).unwrap();
        assert_eq!(open["name"], "2025");
        assert_eq!(open["finalization"], serde_json::json!({ "state": "OPEN" }));

        let cutoff = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        let finalized = serde_json::to_value(PeriodResponse::from(period(Some(cutoff)))).unwrap();
        assert_eq!(
            finalized["finalization"],
            serde_json::json!({ "state": "FINALIZED_UP_TO", "lock_date": "2025-03-31" })
        );
        assert_eq!(finalized["lock_date"], "2025-03-31");
    }
}
