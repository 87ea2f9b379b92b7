//! Report input and output types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use defter_shared::types::{AccountId, VoucherId};

use crate::chart::{AccountCode, Classification, SpecialRole};
use crate::fiscal::CanonicalKey;
use crate::ledger::{DocumentMetadata, VoucherType};

/// Which vouchers a report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportScope {
    /// Only finalized (locked) vouchers.
    #[default]
    FinalizedOnly,
    /// Finalized and in-progress vouchers.
    IncludeDrafts,
}

impl ReportScope {
    /// Whether a voucher with this lock flag belongs in the report.
    #[must_use]
    pub const fn includes(self, locked: bool) -> bool {
        match self {
            Self::FinalizedOnly => locked,
            Self::IncludeDrafts => true,
        }
    }
}

// ============================================================================
// Journal book input
// ============================================================================

/// A voucher as fed to the journal book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Voucher ID.
    pub voucher_id: VoucherId,
    /// Statutory sequence number, `None` until finalized.
    pub sequence_number: Option<i64>,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Voucher number.
    pub voucher_number: String,
    /// Voucher date.
    pub date: NaiveDate,
    /// Voucher description.
    pub description: String,
    /// Lock flag.
    pub locked: bool,
    /// Lines.
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Canonical sort key.
    #[must_use]
    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::new(self.date, self.voucher_type, &self.voucher_number, self.voucher_id)
    }

    /// Sum of line amounts.
    #[must_use]
    pub fn totals(&self) -> PageTotals {
        PageTotals {
            debit: self.lines.iter().map(|l| l.debit).sum(),
            credit: self.lines.iter().map(|l| l.credit).sum(),
        }
    }
}

/// A voucher line as fed to the journal book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Sub-ledger account code.
    pub account_code: AccountCode,
    /// Sub-ledger account name.
    pub account_name: String,
    /// Line description.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// Journal book parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalBookRequest {
    /// First date, inclusive.
    pub start: NaiveDate,
    /// Last date, inclusive.
    pub end: NaiveDate,
    /// Voucher scope.
    pub scope: ReportScope,
    /// Maximum printed lines per page.
    pub page_line_limit: usize,
}

// ============================================================================
// Journal book output
// ============================================================================

/// Running debit/credit pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTotals {
    /// Debit.
    pub debit: Decimal,
    /// Credit.
    pub credit: Decimal,
}

impl PageTotals {
    /// Adds another pair.
    pub fn add(&mut self, other: Self) {
        self.debit += other.debit;
        self.credit += other.credit;
    }
}

/// Side of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Debit.
    Debit,
    /// Credit.
    Credit,
}

/// Visual tier of a posting row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowTier {
    /// Total of a top-level group with several lines.
    GroupHeader,
    /// One line beneath a group header.
    Leaf,
    /// A top-level group with a single line, printed on one row.
    Collapsed,
}

/// One printed posting row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRow {
    /// Row tier.
    pub tier: RowTier,
    /// Debit or credit side.
    pub side: Side,
    /// Printed account code.
    pub account_code: String,
    /// Printed account name.
    pub account_name: String,
    /// Printed description. Empty on group headers.
    pub description: String,
    /// Amount in the detail column (leaf rows).
    pub detail_amount: Option<Decimal>,
    /// Amount in the debit or credit column (group headers and collapsed rows).
    pub main_amount: Option<Decimal>,
}

/// The printed form of one voucher. Never split across pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherBlock {
    /// Voucher ID.
    pub voucher_id: VoucherId,
    /// Statutory sequence number.
    pub sequence_number: Option<i64>,
    /// Voucher date.
    pub date: NaiveDate,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Voucher number.
    pub voucher_number: String,
    /// Voucher description.
    pub description: String,
    /// Debit rows, then credit rows.
    pub rows: Vec<PostingRow>,
    /// Voucher totals.
    pub totals: PageTotals,
}

impl VoucherBlock {
    /// Printed lines: header row, posting rows, total row, separator.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rows.len() + 3
    }
}

/// What the page footer prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FooterKind {
    /// Running total to be brought forward on the next page.
    CarriedForward,
    /// Grand total of the whole book (last page).
    GrandTotal,
}

/// Page footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFooter {
    /// Footer kind.
    pub kind: FooterKind,
    /// Cumulative totals through the end of this page.
    pub totals: PageTotals,
}

/// One page of the journal book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalPage {
    /// 1-based page number.
    pub page_number: u32,
    /// Cumulative totals of all previous pages.
    pub brought_forward: PageTotals,
    /// Voucher blocks on this page.
    pub blocks: Vec<VoucherBlock>,
    /// Totals of this page's vouchers alone.
    pub page_totals: PageTotals,
    /// Footer.
    pub footer: PageFooter,
    /// A single voucher taller than a page was printed alone here.
    pub overflow: bool,
}

impl JournalPage {
    /// Body lines used by the blocks.
    #[must_use]
    pub fn body_lines(&self) -> usize {
        self.blocks.iter().map(VoucherBlock::line_count).sum()
    }

    /// Returns true on the final page.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.footer.kind == FooterKind::GrandTotal
    }
}

// ============================================================================
// Trial balance
// ============================================================================

/// One trial balance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Depth in the hierarchy.
    pub depth: u32,
    /// Classification.
    pub classification: Classification,
    /// Debit total including descendants.
    pub total_debit: Decimal,
    /// Credit total including descendants.
    pub total_credit: Decimal,
    /// Debit balance, zero when the net is a credit.
    pub debit_balance: Decimal,
    /// Credit balance, zero when the net is a debit.
    pub credit_balance: Decimal,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// Whether total debit equals total credit.
    pub is_balanced: bool,
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Rows in code order.
    pub rows: Vec<TrialBalanceRow>,
    /// Grand totals.
    pub totals: TrialBalanceTotals,
}

// ============================================================================
// Export readiness
// ============================================================================

/// A voucher line checked for statutory export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportLine {
    /// Voucher ID.
    pub voucher_id: VoucherId,
    /// Voucher number.
    pub voucher_number: String,
    /// Voucher date.
    pub date: NaiveDate,
    /// Line position.
    pub line_no: u32,
    /// Account code.
    pub account_code: String,
    /// Routing tag of the account.
    pub special_role: SpecialRole,
    /// Document metadata.
    pub document: DocumentMetadata,
}

/// A line that is not ready for export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportIssue {
    /// Voucher ID.
    pub voucher_id: VoucherId,
    /// Voucher number.
    pub voucher_number: String,
    /// Voucher date.
    pub date: NaiveDate,
    /// Line position.
    pub line_no: u32,
    /// Account code.
    pub account_code: String,
    /// Missing fields.
    pub missing: Vec<&'static str>,
}

/// Result of an export readiness check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReadiness {
    /// Lines examined.
    pub checked_lines: usize,
    /// Lines with missing data.
    pub issues: Vec<ExportIssue>,
}

impl ExportReadiness {
    /// True when nothing is missing.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }
}
