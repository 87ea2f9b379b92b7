//! Property-based tests for VoucherService.
//!
//! - Property 1: Voucher balance integrity
//! - Property 2: Locked dates reject every write

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use defter_shared::types::{AccountId, BranchId, FiscalPeriodId, TenantId};

use super::error::LedgerError;
use super::service::VoucherService;
use super::types::{PostingAccount, VoucherInput, VoucherLineInput, VoucherType};
use super::validation::BALANCE_EPSILON;
use crate::chart::{AccountCode, Classification};
use crate::fiscal::FiscalPeriod;

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

fn period(lock_date: Option<NaiveDate>) -> FiscalPeriod {
    FiscalPeriod {
        id: FiscalPeriodId::new(),
        tenant_id: TenantId::new(),
        name: "2025".to_string(),
        start_date: start(),
        end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        is_active: true,
        lock_date,
        last_sequence_number: 0,
    }
}

/// Two sub-ledger accounts every generated line can post to.
fn accounts() -> HashMap<AccountId, PostingAccount> {
    ["100.01", "600.01"]
        .iter()
        .map(|code| {
            let id = AccountId::new();
            (
                id,
                PostingAccount {
                    id,
                    code: AccountCode::parse(code).unwrap(),
                    classification: Classification::SubLedger,
                    is_active: true,
                },
            )
        })
        .collect()
}

/// Debit lines on the first account, credit lines on the second.
fn build_voucher(
    accounts: &HashMap<AccountId, PostingAccount>,
    debits: &[Decimal],
    credits: &[Decimal],
    date: NaiveDate,
) -> VoucherInput {
    let mut ids: Vec<AccountId> = accounts.keys().copied().collect();
    ids.sort();
    let mut lines: Vec<VoucherLineInput> = debits
        .iter()
        .map(|d| VoucherLineInput {
            account_id: ids[0],
            debit: *d,
            credit: Decimal::ZERO,
            description: String::new(),
            document: Default::default(),
        })
        .collect();
    lines.extend(credits.iter().map(|c| VoucherLineInput {
        account_id: ids[1],
        debit: Decimal::ZERO,
        credit: *c,
        description: String::new(),
        document: Default::default(),
    }));

    VoucherInput {
        fiscal_period_id: FiscalPeriodId::new(),
        branch_id: BranchId::new(),
        voucher_type: VoucherType::General,
        voucher_number: None,
        date,
        description: String::new(),
        source: None,
        lines,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 1: Voucher balance integrity**
    ///
    /// *For any* voucher, validation SHALL succeed if and only if
    /// |sum(debit) - sum(credit)| <= 0.01, and the returned totals SHALL
    /// equal the line sums.
    #[test]
    fn prop_accepts_exactly_the_balanced_vouchers(
        debits in prop::collection::vec(positive_amount(), 1..6),
        credits in prop::collection::vec(positive_amount(), 1..6),
    ) {
        let accounts = accounts();
        let voucher = build_voucher(&accounts, &debits, &credits, start() + Duration::days(10));
        let debit: Decimal = debits.iter().sum();
        let credit: Decimal = credits.iter().sum();
        let balanced = (debit - credit).abs() <= BALANCE_EPSILON;

        let result = VoucherService::validate_create(&voucher, &period(None), |id| accounts.get(&id).cloned());
        match result {
            Ok(totals) => {
                prop_assert!(balanced);
                prop_assert_eq!(totals.debit, debit);
                prop_assert_eq!(totals.credit, credit);
            }
            Err(LedgerError::UnbalancedVoucher { .. }) => prop_assert!(!balanced),
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// **Property 1b: Mirrored vouchers always balance**
    ///
    /// *For any* set of debit amounts, a voucher crediting the same amounts
    /// SHALL validate.
    #[test]
    fn prop_mirrored_voucher_balances(amounts in prop::collection::vec(positive_amount(), 1..8)) {
        let accounts = accounts();
        let voucher = build_voucher(&accounts, &amounts, &amounts, start() + Duration::days(40));
        prop_assert!(VoucherService::validate_create(&voucher, &period(None), |id| accounts.get(&id).cloned()).is_ok());
    }

    /// **Property 2: Locked dates reject every write**
    ///
    /// *For any* date on or before the lock date, create SHALL fail with
    /// `PeriodLocked`, even for an otherwise valid voucher.
    #[test]
    fn prop_locked_dates_rejected(
        lock_offset in 0i64..300,
        back in 0i64..300,
        amount in positive_amount(),
    ) {
        let lock_date = start() + Duration::days(lock_offset);
        let date = lock_date - Duration::days(back);
        let accounts = accounts();
        let voucher = build_voucher(&accounts, &[amount], &[amount], date);
        let result = VoucherService::validate_create(&voucher, &period(Some(lock_date)), |id| accounts.get(&id).cloned());
        let is_period_locked = matches!(result, Err(LedgerError::PeriodLocked { .. }));
        prop_assert!(is_period_locked);
    }
}
