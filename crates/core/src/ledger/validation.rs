//! Line-level and balance validation rules for vouchers.

use rust_decimal::Decimal;

use super::error::{InvalidAccountReason, InvalidLineReason, LedgerError};
use super::types::{PostingAccount, VoucherLineInput, VoucherTotals};

/// Rounding tolerance when comparing debit and credit totals (0.01).
pub const BALANCE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Minimum number of lines in a voucher.
pub const MIN_LINES: usize = 2;

/// Decimal places stored for line amounts.
pub const AMOUNT_SCALE: u32 = 2;

fn exceeds_scale(amount: Decimal) -> bool {
    amount.normalize().scale() > AMOUNT_SCALE
}

/// Checks a line's amounts. `line` is 1-based.
///
/// # Errors
///
/// Returns `InvalidLine` if an amount is negative or has more than
/// `AMOUNT_SCALE` decimal places, if both are zero, or if both are non-zero.
pub fn check_line_amounts(line: usize, input: &VoucherLineInput) -> Result<(), LedgerError> {
    let reason = if input.debit < Decimal::ZERO || input.credit < Decimal::ZERO {
        Some(InvalidLineReason::NegativeAmount)
    } else if exceeds_scale(input.debit) || exceeds_scale(input.credit) {
        Some(InvalidLineReason::ExcessPrecision)
    } else if input.debit.is_zero() && input.credit.is_zero() {
        Some(InvalidLineReason::ZeroAmount)
    } else if !input.debit.is_zero() && !input.credit.is_zero() {
        Some(InvalidLineReason::BothSides)
    } else {
        None
    };

    match reason {
        Some(reason) => Err(LedgerError::InvalidLine { line, reason }),
        None => Ok(()),
    }
}

/// Checks that the line's account exists, is active, and is a sub-ledger.
///
/// # Errors
///
/// Returns `InvalidAccount` with the reason.
pub fn check_posting_account(
    line: usize,
    input: &VoucherLineInput,
    account: Option<&PostingAccount>,
) -> Result<(), LedgerError> {
    let invalid = |account: String, reason| LedgerError::InvalidAccount {
        line,
        account_id: input.account_id,
        account,
        reason,
    };

    let Some(account) = account else {
        return Err(invalid(input.account_id.to_string(), InvalidAccountReason::Missing));
    };
    if !account.classification.is_postable() {
        return Err(invalid(
            account.code.to_string(),
            InvalidAccountReason::NotSubLedger(account.classification),
        ));
    }
    if !account.is_active {
        return Err(invalid(account.code.to_string(), InvalidAccountReason::Inactive));
    }
    Ok(())
}

/// Sums the lines.
#[must_use]
pub fn calculate_totals(lines: &[VoucherLineInput]) -> VoucherTotals {
    let debit: Decimal = lines.iter().map(|l| l.debit).sum();
    let credit: Decimal = lines.iter().map(|l| l.credit).sum();
    VoucherTotals::new(debit, credit)
}

/// Rejects totals outside the rounding tolerance.
///
/// # Errors
///
/// Returns `UnbalancedVoucher`.
pub fn ensure_balanced(totals: VoucherTotals) -> Result<(), LedgerError> {
    if totals.is_balanced() {
        Ok(())
    } else {
        Err(LedgerError::UnbalancedVoucher {
            debit: totals.debit,
            credit: totals.credit,
            difference: totals.difference(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{AccountCode, Classification};
    use defter_shared::types::AccountId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn line(debit: Decimal, credit: Decimal) -> VoucherLineInput {
        VoucherLineInput {
            account_id: AccountId::new(),
            debit,
            credit,
            description: String::new(),
            document: Default::default(),
        }
    }

    fn posting(classification: Classification, is_active: bool) -> PostingAccount {
        PostingAccount {
            id: AccountId::new(),
            code: AccountCode::parse("120.01").unwrap(),
            classification,
            is_active,
        }
    }

    #[test]
    fn test_epsilon_is_one_cent() {
        assert_eq!(BALANCE_EPSILON, dec!(0.01));
    }

    #[rstest]
    #[case(dec!(100), dec!(0))]
    #[case(dec!(0), dec!(0.01))]
    #[case(dec!(12.5000), dec!(0))]
    fn test_valid_line_amounts(#[case] debit: Decimal, #[case] credit: Decimal) {
        assert!(check_line_amounts(1, &line(debit, credit)).is_ok());
    }

    #[rstest]
    #[case(dec!(0), dec!(0), InvalidLineReason::ZeroAmount)]
    #[case(dec!(10), dec!(10), InvalidLineReason::BothSides)]
    #[case(dec!(-5), dec!(0), InvalidLineReason::NegativeAmount)]
    #[case(dec!(0), dec!(-5), InvalidLineReason::NegativeAmount)]
    #[case(dec!(1.005), dec!(0), InvalidLineReason::ExcessPrecision)]
    #[case(dec!(0), dec!(0.004), InvalidLineReason::ExcessPrecision)]
    fn test_invalid_line_amounts(
        #[case] debit: Decimal,
        #[case] credit: Decimal,
        #[case] expected: InvalidLineReason,
    ) {
        let err = check_line_amounts(3, &line(debit, credit)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidLine { line: 3, reason } if reason == expected));
    }

    #[test]
    fn test_posting_account_rules() {
        let input = line(dec!(1), dec!(0));
        assert!(check_posting_account(1, &input, Some(&posting(Classification::SubLedger, true))).is_ok());

        let err = check_posting_account(1, &input, None).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAccount { reason: InvalidAccountReason::Missing, .. }));

        let err = check_posting_account(1, &input, Some(&posting(Classification::Group, true))).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidAccount { reason: InvalidAccountReason::NotSubLedger(Classification::Group), ref account, .. }
                if account == "120.01"
        ));

        let err = check_posting_account(1, &input, Some(&posting(Classification::SubLedger, false))).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAccount { reason: InvalidAccountReason::Inactive, .. }));
    }

    #[test]
    fn test_ensure_balanced() {
        let lines = vec![line(dec!(100.00), dec!(0)), line(dec!(0), dec!(99.99))];
        assert!(ensure_balanced(calculate_totals(&lines)).is_ok());

        let lines = vec![line(dec!(100.00), dec!(0)), line(dec!(0), dec!(99.98))];
        let err = ensure_balanced(calculate_totals(&lines)).unwrap_err();
        assert!(matches!(err, LedgerError::UnbalancedVoucher { difference, .. } if difference == dec!(0.02)));
    }

    #[test]
    fn test_sub_cent_lines_cannot_hide_an_imbalance() {
        // Ten debits of 1.005 sum to 10.05 but would be stored as 1.01 each.
        let mut lines: Vec<_> = (0..10).map(|_| line(dec!(1.005), dec!(0))).collect();
        lines.push(line(dec!(0), dec!(10.05)));
        assert!(ensure_balanced(calculate_totals(&lines)).is_ok());

        let first_bad = lines
            .iter()
            .enumerate()
            .find_map(|(i, l)| check_line_amounts(i + 1, l).err());
        assert!(matches!(
            first_bad,
            Some(LedgerError::InvalidLine { line: 1, reason: InvalidLineReason::ExcessPrecision })
        ));
    }
}
