//! Journal voucher domain types.
//!
//! A voucher is one balanced double-entry transaction: a header plus two or
//! more lines, each posting to a single sub-ledger account.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use defter_shared::types::{AccountId, BranchId, FiscalPeriodId, TenantId, VoucherId, VoucherLineId};

use super::validation::BALANCE_EPSILON;
use crate::chart::{AccountCode, Classification};

/// Voucher type.
///
/// The declaration order is the statutory priority used when several
/// vouchers share a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoucherType {
    /// Opening entry of the period.
    Opening,
    /// Cash receipt.
    CashReceipt,
    /// Cash payment.
    CashPayment,
    /// General journal (mahsup).
    General,
    /// Closing entry of the period.
    Closing,
}

impl VoucherType {
    /// All voucher types in priority order.
    pub const ALL: [Self; 5] = [
        Self::Opening,
        Self::CashReceipt,
        Self::CashPayment,
        Self::General,
        Self::Closing,
    ];

    /// Ordering priority within a single date. Lower sorts first.
    #[must_use]
    pub const fn priority(self) -> u8 {
        match self {
            Self::Opening => 1,
            Self::CashReceipt => 2,
            Self::CashPayment => 3,
            Self::General => 4,
            Self::Closing => 5,
        }
    }

    /// Prefix of auto-generated voucher numbers.
    #[must_use]
    pub const fn number_prefix(self) -> &'static str {
        match self {
            Self::Opening => "A-",
            Self::CashReceipt => "T-",
            Self::CashPayment => "TD-",
            Self::General => "M-",
            Self::Closing => "K-",
        }
    }

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "OPENING",
            Self::CashReceipt => "CASH_RECEIPT",
            Self::CashPayment => "CASH_PAYMENT",
            Self::General => "GENERAL",
            Self::Closing => "CLOSING",
        }
    }
}

impl std::fmt::Display for VoucherType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of source document behind a voucher line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Invoice.
    Invoice,
    /// Cheque.
    Check,
    /// Receipt.
    Receipt,
    /// Promissory note.
    Note,
    /// Anything else.
    Other,
}

/// How the underlying document was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementMethod {
    /// Cash.
    Cash,
    /// Bank transfer.
    Bank,
    /// Cheque.
    Check,
    /// Promissory note.
    Note,
    /// Credit card.
    Card,
}

/// Source-document metadata. Optional on entry, required for statutory export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document kind.
    #[serde(default)]
    pub kind: Option<DocumentKind>,
    /// Document number.
    #[serde(default)]
    pub number: Option<String>,
    /// Document date.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Settlement method.
    #[serde(default)]
    pub settlement: Option<SettlementMethod>,
}

impl DocumentMetadata {
    /// Names of the document fields that are missing.
    ///
    /// The settlement method is not listed here; whether it is needed
    /// depends on the account posted to.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.kind.is_none() {
            missing.push("document_kind");
        }
        if self.number.as_deref().is_none_or(|n| n.trim().is_empty()) {
            missing.push("document_number");
        }
        if self.date.is_none() {
            missing.push("document_date");
        }
        missing
    }
}

/// Reference to the record of a producer module that generated a voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Producing module, e.g. `invoice` or `bank`.
    pub module: String,
    /// Record ID inside that module.
    pub record_id: Uuid,
}

/// One line of a voucher as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherLineInput {
    /// Sub-ledger account posted to.
    pub account_id: AccountId,
    /// Debit amount.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount.
    #[serde(default)]
    pub credit: Decimal,
    /// Line description.
    #[serde(default)]
    pub description: String,
    /// Source-document metadata.
    #[serde(default)]
    pub document: DocumentMetadata,
}

/// A voucher as submitted for create or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherInput {
    /// Owning fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// Branch.
    pub branch_id: BranchId,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Human voucher number. Generated when absent.
    #[serde(default)]
    pub voucher_number: Option<String>,
    /// Voucher date.
    pub date: NaiveDate,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Producer module reference.
    #[serde(default)]
    pub source: Option<SourceRef>,
    /// Lines.
    pub lines: Vec<VoucherLineInput>,
}

/// Facts about an account needed to validate a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingAccount {
    /// Account ID.
    pub id: AccountId,
    /// Account code.
    pub code: AccountCode,
    /// Classification.
    pub classification: Classification,
    /// Active flag.
    pub is_active: bool,
}

/// Debit and credit totals of a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherTotals {
    /// Sum of line debits.
    pub debit: Decimal,
    /// Sum of line credits.
    pub credit: Decimal,
}

impl VoucherTotals {
    /// Creates totals.
    #[must_use]
    pub const fn new(debit: Decimal, credit: Decimal) -> Self {
        Self { debit, credit }
    }

    /// Absolute difference between the sides.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        (self.debit - self.credit).abs()
    }

    /// Balanced within the rounding tolerance.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.difference() <= BALANCE_EPSILON
    }
}

/// A stored voucher header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    /// Voucher ID.
    pub id: VoucherId,
    /// Tenant.
    pub tenant_id: TenantId,
    /// Fiscal period.
    pub fiscal_period_id: FiscalPeriodId,
    /// Branch.
    pub branch_id: BranchId,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Human voucher number.
    pub voucher_number: String,
    /// Voucher date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Cached debit total.
    pub total_debit: Decimal,
    /// Cached credit total.
    pub total_credit: Decimal,
    /// Statutory sequence number, assigned at finalization.
    pub sequence_number: Option<i64>,
    /// Frozen by finalization.
    pub locked: bool,
    /// Producer module reference.
    pub source: Option<SourceRef>,
}

/// A stored voucher line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherLine {
    /// Line ID.
    pub id: VoucherLineId,
    /// Owning voucher.
    pub voucher_id: VoucherId,
    /// 1-based position within the voucher.
    pub line_no: u32,
    /// Account posted to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Line description.
    pub description: String,
    /// Source-document metadata.
    pub document: DocumentMetadata,
}

/// Key of a voucher-number counter: one sequence per type per calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterKey {
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Calendar year of the voucher date.
    pub year: i32,
}

impl CounterKey {
    /// Counter key for a voucher of `voucher_type` dated `date`.
    #[must_use]
    pub fn for_voucher(voucher_type: VoucherType, date: NaiveDate) -> Self {
        Self {
            voucher_type,
            year: date.year(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_priority_matches_declaration_order() {
        let priorities: Vec<u8> = VoucherType::ALL.iter().map(|t| t.priority()).collect();
        assert_eq!(priorities, vec![1, 2, 3, 4, 5]);
        assert!(VoucherType::Opening < VoucherType::Closing);
    }

    #[test]
    fn test_number_prefixes() {
        assert_eq!(VoucherType::Opening.number_prefix(), "A-");
        assert_eq!(VoucherType::CashReceipt.number_prefix(), "T-");
        assert_eq!(VoucherType::CashPayment.number_prefix(), "TD-");
        assert_eq!(VoucherType::General.number_prefix(), "M-");
        assert_eq!(VoucherType::Closing.number_prefix(), "K-");
    }

    #[test]
    fn test_totals_epsilon() {
        assert!(VoucherTotals::new(dec!(100.00), dec!(100.01)).is_balanced());
        assert!(!VoucherTotals::new(dec!(100.00), dec!(100.02)).is_balanced());
        assert_eq!(VoucherTotals::new(dec!(10), dec!(12.5)).difference(), dec!(2.5));
    }

    #[test]
    fn test_missing_document_fields() {
        let empty = DocumentMetadata::default();
        assert_eq!(
            empty.missing_fields(),
            vec!["document_kind", "document_number", "document_date"]
        );

        let complete = DocumentMetadata {
            kind: Some(DocumentKind::Invoice),
            number: Some("FT-2025-001".to_string()),
            date: NaiveDate::from_ymd_opt(2025, 1, 3),
            settlement: None,
        };
        assert!(complete.missing_fields().is_empty());

        let blank_number = DocumentMetadata {
            number: Some("  ".to_string()),
            ..complete
        };
        assert_eq!(blank_number.missing_fields(), vec!["document_number"]);
    }

    #[test]
    fn test_counter_key_uses_calendar_year() {
        let key = CounterKey::for_voucher(
            VoucherType::General,
            NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        );
        assert_eq!(key.year, 2025);
    }

    #[test]
    fn test_voucher_type_serde() {
        assert_eq!(
            serde_json::to_string(&VoucherType::CashReceipt).unwrap(),
            "\"CASH_RECEIPT\""
        );
    }
}
