//! Ledger report routes.
//!
//! The journal book is served both as structured pages and as the
//! fixed-width text that gets printed and bound.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::header::CONTENT_TYPE,
    response::IntoResponse,
    routing::get,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use defter_core::ledger::BalanceAnomaly;
use defter_core::reports::{
    ExportReadiness, JournalBookRequest, JournalPage, MAX_PAGE_WIDTH, MIN_PAGE_WIDTH, ReportScope,
    TrialBalanceReport, render_book,
};
use defter_db::{BalanceRepository, ReportRepository};
use defter_shared::LedgerConfig;

use crate::{AppState, error::ApiError, middleware::TenantContext};

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/journal-book", get(get_journal_book))
        .route("/reports/journal-book.txt", get(get_journal_book_text))
        .route("/reports/trial-balance", get(get_trial_balance))
        .route("/reports/balance-anomalies", get(get_balance_anomalies))
        .route("/reports/export-readiness", get(get_export_readiness))
}

// ============================================================================
// Query Parameters
// ============================================================================

/// Query parameters for the journal book.
#[derive(Debug, Deserialize)]
pub struct JournalBookQuery {
    /// First voucher date (inclusive).
    pub start: NaiveDate,
    /// Last voucher date (inclusive).
    pub end: NaiveDate,
    /// `finalized_only` (default) or `include_drafts`.
    #[serde(default)]
    pub scope: ReportScope,
    /// Lines per printed page. Defaults to the configured limit.
    pub page_line_limit: Option<usize>,
    /// Characters per rendered line. Defaults to the configured width.
    pub width: Option<usize>,
}

impl JournalBookQuery {
    fn to_request(&self, config: &LedgerConfig) -> Result<JournalBookRequest, ApiError> {
        if let Some(width) = self.width
            && !(MIN_PAGE_WIDTH..=MAX_PAGE_WIDTH).contains(&width)
        {
            return Err(ApiError::validation(format!(
                "width must be between {MIN_PAGE_WIDTH} and {MAX_PAGE_WIDTH}, got {width}"
            )));
        }
        Ok(JournalBookRequest {
            start: self.start,
            end: self.end,
            scope: self.scope,
            page_line_limit: self.page_line_limit.unwrap_or(config.page_line_limit),
        })
    }

    fn page_width(&self, config: &LedgerConfig) -> usize {
        self.width.unwrap_or(config.page_width)
    }
}

/// Query parameters for the trial balance.
#[derive(Debug, Deserialize)]
pub struct TrialBalanceQuery {
    /// Deepest hierarchy level to list; all levels when absent.
    pub max_depth: Option<u32>,
}

/// Query parameters for export readiness.
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    /// First voucher date (inclusive).
    pub start: NaiveDate,
    /// Last voucher date (inclusive).
    pub end: NaiveDate,
}

// ============================================================================
// Response Types
// ============================================================================

/// Response for the structured journal book.
#[derive(Debug, Serialize)]
pub struct JournalBookResponse {
    /// Requested range start.
    pub start: NaiveDate,
    /// Requested range end.
    pub end: NaiveDate,
    /// Number of pages.
    pub page_count: usize,
    /// Pages in print order.
    pub pages: Vec<JournalPage>,
}

/// Response for the balance anomaly check.
#[derive(Debug, Serialize)]
pub struct AnomaliesResponse {
    /// Accounts whose balance contradicts their nature.
    pub anomalies: Vec<BalanceAnomaly>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET `/reports/journal-book` - Paginated journal book with carried-forward totals.
async fn get_journal_book(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Query(query): Query<JournalBookQuery>,
) -> Result<Json<JournalBookResponse>, ApiError> {
    let request = query.to_request(&state.ledger)?;
    let pages = ReportRepository::new(state.conn())
        .journal_book(tenant_id, &request)
        .await?;
    Ok(Json(JournalBookResponse {
        start: request.start,
        end: request.end,
        page_count: pages.len(),
        pages,
    }))
}

/// GET `/reports/journal-book.txt` - The journal book as fixed-width text.
async fn get_journal_book_text(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Query(query): Query<JournalBookQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request = query.to_request(&state.ledger)?;
    let pages = ReportRepository::new(state.conn())
        .journal_book(tenant_id, &request)
        .await?;
    let text = render_book(&pages, query.page_width(&state.ledger));
    Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

/// GET `/reports/trial-balance` - Totals rolled up the account hierarchy.
async fn get_trial_balance(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Query(query): Query<TrialBalanceQuery>,
) -> Result<Json<TrialBalanceReport>, ApiError> {
    let report = ReportRepository::new(state.conn())
        .trial_balance(tenant_id, query.max_depth)
        .await?;
    Ok(Json(report))
}

/// GET `/reports/balance-anomalies` - Accounts with a balance of the wrong sign.
async fn get_balance_anomalies(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
) -> Result<Json<AnomaliesResponse>, ApiError> {
    let anomalies = BalanceRepository::new(state.conn()).anomalies(tenant_id).await?;
    Ok(Json(AnomaliesResponse { anomalies }))
}

/// GET `/reports/export-readiness` - Lines missing data for statutory export.
async fn get_export_readiness(
    State(state): State<AppState>,
    TenantContext(tenant_id): TenantContext,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<ExportReadiness>, ApiError> {
    let readiness = ReportRepository::new(state.conn())
        .export_readiness(tenant_id, query.start, query.end)
        .await?;
    Ok(Json(readiness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_journal_query_defaults_from_config() {
        let query: JournalBookQuery =
            serde_json::from_value(serde_json::json!({ "start": "2025-01-01", "end": "2025-01-31" })).unwrap();
        let request = query.to_request(&LedgerConfig::default()).unwrap();
        assert_eq!(request.scope, ReportScope::FinalizedOnly);
        assert_eq!(request.page_line_limit, 40);
        assert_eq!(query.page_width(&LedgerConfig::default()), 120);
    }

    #[test]
    fn test_journal_query_overrides() {
        let query: JournalBookQuery = serde_json::from_value(serde_json::json!({
            "start": "2025-01-01",
            "end": "2025-01-31",
            "scope": "include_drafts",
            "page_line_limit": 25,
            "width": 132
        }))
        .unwrap();
        let request = query.to_request(&LedgerConfig::default()).unwrap();
        assert_eq!(request.scope, ReportScope::IncludeDrafts);
        assert_eq!(request.page_line_limit, 25);
        assert_eq!(query.page_width(&LedgerConfig::default()), 132);
    }

    #[test]
    fn test_journal_query_rejects_out_of_range_width() {
        for width in [0, MIN_PAGE_WIDTH - 1, MAX_PAGE_WIDTH + 1, usize::MAX] {
            let query: JournalBookQuery = serde_json::from_value(serde_json::json!({
                "start": "2025-01-01",
                "end": "2025-01-31",
                "width": width
            }))
            .unwrap();
            let err = query.to_request(&LedgerConfig::default()).unwrap_err();
            assert_eq!(err.0.error_code(), "VALIDATION_ERROR");
        }
    }
}
