//! Voucher service for validation before persistence.
//!
//! Pure business logic: the repository loads the period, the existing
//! voucher, and the referenced accounts, then asks this service whether the
//! write may proceed. Nothing is written unless every check passes.

use defter_shared::types::AccountId;

use super::error::LedgerError;
use super::types::{PostingAccount, Voucher, VoucherInput, VoucherTotals};
use super::validation::{MIN_LINES, calculate_totals, check_line_amounts, check_posting_account, ensure_balanced};
use crate::fiscal::FiscalPeriod;

/// Voucher validation service.
pub struct VoucherService;

impl VoucherService {
    /// Validates a new voucher.
    ///
    /// Checks, in order:
    /// 1. The date is not finalized and lies in an active period
    /// 2. There are at least two lines
    /// 3. Each line posts a valid amount to an active sub-ledger account
    /// 4. Debits equal credits within the rounding tolerance
    ///
    /// # Arguments
    ///
    /// * `input` - The voucher to validate
    /// * `period` - The fiscal period the voucher belongs to
    /// * `account_lookup` - Resolves an account ID to its posting facts
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` encountered.
    pub fn validate_create<A>(
        input: &VoucherInput,
        period: &FiscalPeriod,
        account_lookup: A,
    ) -> Result<VoucherTotals, LedgerError>
    where
        A: Fn(AccountId) -> Option<PostingAccount>,
    {
        // 1. Date lock and period
        period.ensure_accepts(input.date)?;

        // 2. Line count
        if input.lines.len() < MIN_LINES {
            return Err(LedgerError::InsufficientLines {
                count: input.lines.len(),
            });
        }

        // 3. Lines
        for (index, line) in input.lines.iter().enumerate() {
            let line_no = index + 1;
            check_posting_account(line_no, line, account_lookup(line.account_id).as_ref())?;
            check_line_amounts(line_no, line)?;
        }

        // 4. Balance
        let totals = calculate_totals(&input.lines);
        ensure_balanced(totals)?;

        Ok(totals)
    }

    /// Validates replacing an existing voucher.
    ///
    /// The stored voucher must be unlocked and its current date editable;
    /// the replacement then goes through the same checks as a new voucher.
    ///
    /// # Errors
    ///
    /// Returns `VoucherLocked`, `PeriodLocked`, or any create-time error.
    pub fn validate_update<A>(
        existing: &Voucher,
        existing_period: &FiscalPeriod,
        input: &VoucherInput,
        target_period: &FiscalPeriod,
        account_lookup: A,
    ) -> Result<VoucherTotals, LedgerError>
    where
        A: Fn(AccountId) -> Option<PostingAccount>,
    {
        Self::validate_can_modify(existing, existing_period)?;
        Self::validate_create(input, target_period, account_lookup)
    }

    /// Validates deleting a voucher.
    ///
    /// # Errors
    ///
    /// Returns `VoucherLocked` or `PeriodLocked`.
    pub fn validate_delete(existing: &Voucher, period: &FiscalPeriod) -> Result<(), LedgerError> {
        Self::validate_can_modify(existing, period)
    }

    /// A stored voucher may change only while unlocked and outside the lock range.
    fn validate_can_modify(existing: &Voucher, period: &FiscalPeriod) -> Result<(), LedgerError> {
        if existing.locked {
            return Err(LedgerError::VoucherLocked {
                voucher_id: existing.id,
                voucher_number: existing.voucher_number.clone(),
            });
        }
        period.ensure_date_editable(existing.date)
    }
}
