//! Ledger error types for voucher, balance, and finalization errors.
//!
//! Every variant carries the context a caller needs to show a precise
//! message: the account code, voucher ID or number, and offending dates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use defter_shared::types::{AccountId, FiscalPeriodId, VoucherId};

use crate::chart::Classification;

/// Why an account cannot receive a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidAccountReason {
    /// No account with this ID exists for the tenant.
    Missing,
    /// The account is deactivated.
    Inactive,
    /// Only sub-ledger accounts accept postings.
    NotSubLedger(Classification),
}

impl std::fmt::Display for InvalidAccountReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing => f.write_str("account does not exist"),
            Self::Inactive => f.write_str("account is inactive"),
            Self::NotSubLedger(class) => {
                write!(f, "{class} accounts cannot be posted to, only SUB_LEDGER")
            }
        }
    }
}

/// Why a voucher line is malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidLineReason {
    /// Both debit and credit are non-zero.
    BothSides,
    /// Both debit and credit are zero.
    ZeroAmount,
    /// An amount has more decimal places than the ledger stores.
    ExcessPrecision,
    /// An amount is negative.
    NegativeAmount,
}

impl std::fmt::Display for InvalidLineReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::BothSides => "line must have either a debit or a credit, not both",
            Self::ZeroAmount => "line must have a non-zero debit or credit",
            Self::ExcessPrecision => "line amounts cannot have more than 2 decimal places",
            Self::NegativeAmount => "line amounts cannot be negative",
        })
    }
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// A voucher needs at least two lines.
    #[error("Voucher must have at least 2 lines, got {count}")]
    InsufficientLines {
        /// Lines supplied.
        count: usize,
    },

    /// A line is malformed.
    #[error("Line {line}: {reason}")]
    InvalidLine {
        /// 1-based line number.
        line: usize,
        /// What is wrong.
        reason: InvalidLineReason,
    },

    /// Debits and credits differ by more than the rounding tolerance.
    #[error("Voucher is not balanced. Debit: {debit}, Credit: {credit}, Difference: {difference}")]
    UnbalancedVoucher {
        /// Total debit.
        debit: Decimal,
        /// Total credit.
        credit: Decimal,
        /// Absolute difference.
        difference: Decimal,
    },

    // ========== Account Errors ==========
    /// A line references an account that cannot be posted to.
    #[error("Invalid account {account} on line {line}: {reason}")]
    InvalidAccount {
        /// 1-based line number.
        line: usize,
        /// Account ID.
        account_id: AccountId,
        /// Account code, or the ID when the account is missing.
        account: String,
        /// Why it was rejected.
        reason: InvalidAccountReason,
    },

    // ========== Fiscal Period Errors ==========
    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    FiscalPeriodNotFound(FiscalPeriodId),

    /// Period start is not before its end.
    #[error("Fiscal period start {start} must be before end {end}")]
    InvalidPeriodRange {
        /// Requested start.
        start: NaiveDate,
        /// Requested end.
        end: NaiveDate,
    },

    /// Period overlaps an existing one.
    #[error("Fiscal period overlaps existing period '{existing}'")]
    OverlappingPeriod {
        /// Name of the existing period.
        existing: String,
    },

    /// Fiscal period is inactive.
    #[error("Fiscal period {0} is inactive")]
    PeriodInactive(FiscalPeriodId),

    /// The date is inside the finalized range of the period.
    #[error("Date {date} is on or before the period lock date {lock_date}")]
    PeriodLocked {
        /// Offending date.
        date: NaiveDate,
        /// Current lock date of the period.
        lock_date: NaiveDate,
    },

    /// The date is outside the period.
    #[error("Date {date} is outside the fiscal period {start} - {end}")]
    DateOutsidePeriod {
        /// Offending date.
        date: NaiveDate,
        /// Period start.
        start: NaiveDate,
        /// Period end.
        end: NaiveDate,
    },

    // ========== Voucher State Errors ==========
    /// Voucher not found.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(VoucherId),

    /// Finalized vouchers are immutable.
    #[error("Voucher {voucher_number} ({voucher_id}) is locked")]
    VoucherLocked {
        /// Voucher ID.
        voucher_id: VoucherId,
        /// Voucher number.
        voucher_number: String,
    },

    /// The voucher moved to another period while it was being locked.
    #[error("Voucher {0} was moved by a concurrent update; retry")]
    ConcurrentModification(VoucherId),

    /// Voucher number already used in this period for this type.
    #[error("Voucher number {voucher_number} already exists for type {voucher_type}")]
    DuplicateVoucherNumber {
        /// The number.
        voucher_number: String,
        /// The voucher type, as its stable string.
        voucher_type: String,
    },

    // ========== Finalization Errors ==========
    /// Finalization never moves backward.
    #[error("Cutoff {cutoff} is not after the current lock date {lock_date}")]
    AlreadyFinalized {
        /// Requested cutoff.
        cutoff: NaiveDate,
        /// Current lock date.
        lock_date: NaiveDate,
    },

    /// Cutoff precedes the period.
    #[error("Cutoff {cutoff} is before the period start {start}")]
    CutoffOutsidePeriod {
        /// Requested cutoff.
        cutoff: NaiveDate,
        /// Period start.
        start: NaiveDate,
    },

    /// No unlocked vouchers on or before the cutoff.
    #[error("No unlocked vouchers on or before {cutoff} to finalize")]
    NothingToFinalize {
        /// Requested cutoff.
        cutoff: NaiveDate,
    },

    /// A voucher selected for numbering was already locked.
    #[error("Voucher {voucher_id} is already locked but lies after the lock date")]
    InconsistentLockState {
        /// The offending voucher.
        voucher_id: VoucherId,
    },

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines { .. } => "INSUFFICIENT_LINES",
            Self::InvalidLine { .. } => "INVALID_LINE",
            Self::UnbalancedVoucher { .. } => "UNBALANCED_VOUCHER",
            Self::InvalidAccount { .. } => "INVALID_ACCOUNT",
            Self::FiscalPeriodNotFound(_) => "FISCAL_PERIOD_NOT_FOUND",
            Self::InvalidPeriodRange { .. } => "INVALID_PERIOD_RANGE",
            Self::OverlappingPeriod { .. } => "OVERLAPPING_PERIOD",
            Self::PeriodInactive(_) => "PERIOD_INACTIVE",
            Self::PeriodLocked { .. } => "PERIOD_LOCKED",
            Self::DateOutsidePeriod { .. } => "DATE_OUTSIDE_PERIOD",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::VoucherLocked { .. } => "VOUCHER_LOCKED",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::DuplicateVoucherNumber { .. } => "DUPLICATE_VOUCHER_NUMBER",
            Self::AlreadyFinalized { .. } => "ALREADY_FINALIZED",
            Self::CutoffOutsidePeriod { .. } => "CUTOFF_OUTSIDE_PERIOD",
            Self::NothingToFinalize { .. } => "NOTHING_TO_FINALIZE",
            Self::InconsistentLockState { .. } => "INCONSISTENT_LOCK_STATE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::InsufficientLines { .. }
            | Self::InvalidLine { .. }
            | Self::UnbalancedVoucher { .. }
            | Self::InvalidAccount { .. }
            | Self::DateOutsidePeriod { .. }
            | Self::CutoffOutsidePeriod { .. }
            | Self::InvalidPeriodRange { .. } => 400,

            // 404 Not Found
            Self::FiscalPeriodNotFound(_) | Self::VoucherNotFound(_) => 404,

            // 409 Conflict
            Self::DuplicateVoucherNumber { .. }
            | Self::OverlappingPeriod { .. }
            | Self::ConcurrentModification(_) => 409,

            // 422 Unprocessable - state rules
            Self::PeriodInactive(_)
            | Self::PeriodLocked { .. }
            | Self::VoucherLocked { .. }
            | Self::AlreadyFinalized { .. }
            | Self::NothingToFinalize { .. } => 422,

            // 500 Internal Server Error
            Self::InconsistentLockState { .. } | Self::Database(_) | Self::Internal(_) => 500,
        }
    }
}

impl From<LedgerError> for defter_shared::AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Database(msg) => Self::Database(msg),
            LedgerError::Internal(msg) => Self::Internal(msg),
            other => Self::Ledger {
                code: other.error_code(),
                status: other.http_status_code(),
                message: other.to_string(),
            },
        }
    }
}
