//! Double-entry voucher logic.
//!
//! This module implements the journal voucher side of the ledger:
//! - Voucher and line domain types
//! - Line, account, and balance validation
//! - Voucher numbering
//! - Balance aggregation by full re-summing
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod numbering;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod service_props;

pub use balance::{
    AccountTotals, BalanceAnomaly, BalanceDrift, affected_accounts, detect_anomalies, find_drift, resum,
};
pub use error::{InvalidAccountReason, InvalidLineReason, LedgerError};
pub use numbering::{format_voucher_number, normalize_voucher_number};
pub use service::VoucherService;
pub use types::{
    CounterKey, DocumentKind, DocumentMetadata, PostingAccount, SettlementMethod, SourceRef, Voucher,
    VoucherInput, VoucherLine, VoucherLineInput, VoucherTotals, VoucherType,
};
pub use validation::BALANCE_EPSILON;
