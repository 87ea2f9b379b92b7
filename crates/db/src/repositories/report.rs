//! Report repository: loads ledger data and hands it to the pure generators.
//!
//! Each report reads inside one read-only `REPEATABLE READ` tenant
//! transaction, so the chart and the vouchers it loads come from a single
//! snapshot.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use defter_core::chart::{ChartError, ChartOfAccounts};
use defter_core::reports::{
    ExportLine, ExportReadiness, JournalBookRequest, JournalEntry, JournalLine, JournalPage, ReportError,
    ReportScope, ReportService, TrialBalanceReport,
};
use defter_core::ledger::VoucherLine;
use defter_shared::types::{AccountId, TenantId, VoucherId};

use super::account::load_chart;
use super::error::RepositoryError;
use crate::entities::{voucher_lines, vouchers};
use crate::rls::TenantTransaction;

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds the paginated journal book for a date range.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` for an invalid range or page size.
    pub async fn journal_book(
        &self,
        tenant_id: TenantId,
        request: &JournalBookRequest,
    ) -> Result<Vec<JournalPage>, RepositoryError> {
        if request.start > request.end {
            return Err(ReportError::InvalidDateRange {
                start: request.start,
                end: request.end,
            }
            .into());
        }

        let scope = TenantTransaction::begin_read(&self.db, tenant_id).await?;
        let txn = scope.transaction();
        let chart = load_chart(txn, tenant_id, false).await?;
        let rows = vouchers_with_lines(txn, tenant_id, request.start, request.end, request.scope).await?;
        scope.commit().await?;

        let entries = rows
            .into_iter()
            .map(|(voucher, lines)| journal_entry(&chart, voucher, lines))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(tenant_id = %tenant_id, vouchers = entries.len(), "Journal book source loaded");

        let names = top_level_names(&chart, &entries);
        let pages = ReportService::generate_journal_book(entries, &names, request)?;
        Ok(pages)
    }

    /// Builds the trial balance from cached account totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the chart cannot be loaded.
    pub async fn trial_balance(
        &self,
        tenant_id: TenantId,
        max_depth: Option<u32>,
    ) -> Result<TrialBalanceReport, RepositoryError> {
        let scope = TenantTransaction::begin_read(&self.db, tenant_id).await?;
        let chart = load_chart(scope.transaction(), tenant_id, false).await?;
        scope.commit().await?;
        Ok(ReportService::generate_trial_balance(&chart, max_depth))
    }

    /// Checks the lines of all vouchers in a date range for the document
    /// metadata a statutory export needs.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or a query error.
    pub async fn export_readiness(
        &self,
        tenant_id: TenantId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ExportReadiness, RepositoryError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end }.into());
        }

        let scope = TenantTransaction::begin_read(&self.db, tenant_id).await?;
        let txn = scope.transaction();
        let chart = load_chart(txn, tenant_id, false).await?;
        let rows = vouchers_with_lines(txn, tenant_id, start, end, ReportScope::IncludeDrafts).await?;
        scope.commit().await?;

        let mut lines = Vec::new();
        for (voucher, voucher_lines) in rows {
            for line in voucher_lines.into_iter().map(VoucherLine::from) {
                let account = chart
                    .get(line.account_id)
                    .ok_or(ChartError::AccountNotFound(line.account_id))?;
                lines.push(ExportLine {
                    voucher_id: VoucherId::from_uuid(voucher.id),
                    voucher_number: voucher.voucher_number.clone(),
                    date: voucher.voucher_date,
                    line_no: line.line_no,
                    account_code: account.code.to_string(),
                    special_role: account.special_role,
                    document: line.document,
                });
            }
        }

        Ok(ReportService::check_export_readiness(&lines))
    }
}

async fn vouchers_with_lines<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    start: NaiveDate,
    end: NaiveDate,
    scope: ReportScope,
) -> Result<Vec<(vouchers::Model, Vec<voucher_lines::Model>)>, RepositoryError> {
    let mut query = vouchers::Entity::find()
        .filter(vouchers::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(vouchers::Column::VoucherDate.gte(start))
        .filter(vouchers::Column::VoucherDate.lte(end));
    if scope == ReportScope::FinalizedOnly {
        query = query.filter(vouchers::Column::Locked.eq(true));
    }

    let mut rows = query
        .order_by_asc(vouchers::Column::VoucherDate)
        .find_with_related(voucher_lines::Entity)
        .all(conn)
        .await?;
    for (_, lines) in &mut rows {
        lines.sort_by_key(|l| l.line_no);
    }
    Ok(rows)
}

fn journal_entry(
    chart: &ChartOfAccounts,
    voucher: vouchers::Model,
    lines: Vec<voucher_lines::Model>,
) -> Result<JournalEntry, ChartError> {
    let lines = lines
        .into_iter()
        .map(|line| -> Result<JournalLine, ChartError> {
            let account_id = AccountId::from_uuid(line.account_id);
            let account = chart.get(account_id).ok_or(ChartError::AccountNotFound(account_id))?;
            Ok(JournalLine {
                account_code: account.code.clone(),
                account_name: account.name.clone(),
                description: line.description,
                debit: line.debit,
                credit: line.credit,
            })
        })
        .collect::<Result<Vec<_>, ChartError>>()?;

    Ok(JournalEntry {
        voucher_id: VoucherId::from_uuid(voucher.id),
        sequence_number: voucher.sequence_number,
        voucher_type: voucher.voucher_type.into(),
        voucher_number: voucher.voucher_number,
        date: voucher.voucher_date,
        description: voucher.description,
        locked: voucher.locked,
        lines,
    })
}

/// Names of the single-segment accounts, keyed by code.
/// Names of the top-level accounts the entries post under.
fn top_level_names(chart: &ChartOfAccounts, entries: &[JournalEntry]) -> HashMap<String, String> {
    entries
        .iter()
        .flat_map(|entry| &entry.lines)
        .filter_map(|line| chart.top_level_of(&line.account_code))
        .map(|top| (top.code.to_string(), top.name.clone()))
        .collect()
}
