//! Report generation service.

use std::collections::HashMap;

use rust_decimal::Decimal;

use defter_shared::types::AccountId;

use super::error::ReportError;
use super::journal::JournalBookGenerator;
use super::types::{
    ExportIssue, ExportLine, ExportReadiness, JournalBookRequest, JournalEntry, JournalPage, TrialBalanceReport,
    TrialBalanceRow, TrialBalanceTotals,
};
use crate::chart::ChartOfAccounts;

/// Service for generating ledger reports.
pub struct ReportService;

impl ReportService {
    /// Generates the paginated journal book.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` for an invalid range or page size.
    pub fn generate_journal_book(
        entries: Vec<JournalEntry>,
        top_level_names: &HashMap<String, String>,
        request: &JournalBookRequest,
    ) -> Result<Vec<JournalPage>, ReportError> {
        JournalBookGenerator::generate(entries, top_level_names, request)
    }

    /// Generates a trial balance from the chart's cached account totals.
    ///
    /// Each account's row includes the totals of all its descendants.
    /// Grand totals count every posting once. `max_depth` hides deeper rows
    /// without changing any total.
    #[must_use]
    pub fn generate_trial_balance(chart: &ChartOfAccounts, max_depth: Option<u32>) -> TrialBalanceReport {
        let mut rolled: HashMap<AccountId, (Decimal, Decimal)> = chart
            .iter()
            .map(|a| (a.id, (a.debit_total, a.credit_total)))
            .collect();

        // Deepest first, so children are complete before they add into parents.
        let mut by_depth: Vec<_> = chart.iter().collect();
        by_depth.sort_by(|a, b| b.depth.cmp(&a.depth));
        for account in by_depth {
            let Some(parent_id) = account.parent_id else {
                continue;
            };
            let own = rolled.get(&account.id).copied().unwrap_or_default();
            if let Some(parent) = rolled.get_mut(&parent_id) {
                parent.0 += own.0;
                parent.1 += own.1;
            }
        }

        let rows = chart
            .iter()
            .filter(|a| max_depth.is_none_or(|max| a.depth <= max))
            .map(|a| {
                let (total_debit, total_credit) = rolled.get(&a.id).copied().unwrap_or_default();
                let net = total_debit - total_credit;
                TrialBalanceRow {
                    account_id: a.id,
                    code: a.code.to_string(),
                    name: a.name.clone(),
                    depth: a.depth,
                    classification: a.classification,
                    total_debit,
                    total_credit,
                    debit_balance: net.max(Decimal::ZERO),
                    credit_balance: (-net).max(Decimal::ZERO),
                }
            })
            .collect();

        let total_debit: Decimal = chart.iter().map(|a| a.debit_total).sum();
        let total_credit: Decimal = chart.iter().map(|a| a.credit_total).sum();

        TrialBalanceReport {
            rows,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: total_debit == total_credit,
            },
        }
    }

    /// Lists lines that lack the document data a statutory export needs.
    ///
    /// Every line needs a document kind, number, and date. Lines on cash,
    /// bank, and cheque accounts also need a settlement method.
    #[must_use]
    pub fn check_export_readiness(lines: &[ExportLine]) -> ExportReadiness {
        let issues = lines
            .iter()
            .filter_map(|line| {
                let mut missing = line.document.missing_fields();
                if line.special_role.requires_settlement_method() && line.document.settlement.is_none() {
                    missing.push("settlement_method");
                }
                (!missing.is_empty()).then(|| ExportIssue {
                    voucher_id: line.voucher_id,
                    voucher_number: line.voucher_number.clone(),
                    date: line.date,
                    line_no: line.line_no,
                    account_code: line.account_code.clone(),
                    missing,
                })
            })
            .collect();

        ExportReadiness {
            checked_lines: lines.len(),
            issues,
        }
    }
}
