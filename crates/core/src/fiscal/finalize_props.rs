//! Property-based tests for finalization planning.
//!
//! - Property 1: Contiguous numbering
//! - Property 2: Canonical order
//! - Property 3: Monotonic lock date

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

use defter_shared::types::{FiscalPeriodId, TenantId, VoucherId};

use super::finalize::{FinalizationCandidate, plan_finalization};
use super::period::FiscalPeriod;
use crate::ledger::{LedgerError, VoucherType};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// Strategy to generate voucher types.
fn voucher_type_strategy() -> impl Strategy<Value = VoucherType> {
    prop_oneof![
        Just(VoucherType::Opening),
        Just(VoucherType::CashReceipt),
        Just(VoucherType::CashPayment),
        Just(VoucherType::General),
        Just(VoucherType::Closing),
    ]
}

/// Strategy to generate unlocked candidates within the first 90 days of 2025.
fn candidate_strategy() -> impl Strategy<Value = FinalizationCandidate> {
    (0i64..90, voucher_type_strategy(), 1u32..500).prop_map(|(offset, voucher_type, n)| {
        FinalizationCandidate {
            id: VoucherId::new(),
            date: base_date() + Duration::days(offset),
            voucher_type,
            voucher_number: format!("{}{n}", voucher_type.number_prefix()),
            locked: false,
        }
    })
}

fn period(last: i64) -> FiscalPeriod {
    FiscalPeriod {
        id: FiscalPeriodId::new(),
        tenant_id: TenantId::new(),
        name: "2025".to_string(),
        start_date: base_date(),
        end_date: NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
        is_active: true,
        lock_date: None,
        last_sequence_number: last,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 1: Contiguous numbering**
    ///
    /// *For any* set of eligible vouchers, the assigned numbers SHALL be the
    /// contiguous range `last + 1 ..= last + n` with no gaps or duplicates.
    #[test]
    fn prop_numbers_are_contiguous(
        candidates in prop::collection::vec(candidate_strategy(), 1..40),
        last in 0i64..10_000,
        cutoff_offset in 0i64..120,
    ) {
        let cutoff = base_date() + Duration::days(cutoff_offset);
        let eligible = candidates.iter().filter(|c| c.date <= cutoff).count();

        match plan_finalization(&period(last), cutoff, &candidates) {
            Ok(plan) => {
                prop_assert_eq!(plan.assignments.len(), eligible);
                for (i, a) in plan.assignments.iter().enumerate() {
                    prop_assert_eq!(a.sequence_number, last + 1 + i as i64);
                }
                prop_assert_eq!(plan.last_sequence_number, last + eligible as i64);
            }
            Err(LedgerError::NothingToFinalize { .. }) => prop_assert_eq!(eligible, 0),
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// **Property 2: Canonical order**
    ///
    /// *For any* input order, numbering SHALL follow (date, type priority,
    /// voucher number), so shuffling the input does not change the result.
    #[test]
    fn prop_order_is_canonical_and_input_independent(
        candidates in prop::collection::vec(candidate_strategy(), 1..30),
    ) {
        let cutoff = base_date() + Duration::days(200);
        let p = period(0);
        let forward = plan_finalization(&p, cutoff, &candidates).unwrap();

        let mut reversed = candidates.clone();
        reversed.reverse();
        let backward = plan_finalization(&p, cutoff, &reversed).unwrap();
        prop_assert_eq!(&forward.assignments, &backward.assignments);

        let keys: Vec<_> = forward
            .assignments
            .iter()
            .map(|a| {
                candidates
                    .iter()
                    .find(|c| c.id == a.voucher_id)
                    .map(FinalizationCandidate::canonical_key)
            })
            .collect();
        for pair in keys.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    /// **Property 3: Monotonic lock date**
    ///
    /// *For any* finalized period, a cutoff on or before the lock date SHALL
    /// fail with `AlreadyFinalized`.
    #[test]
    fn prop_cutoff_never_moves_backward(
        lock_offset in 0i64..200,
        back in 0i64..200,
        candidates in prop::collection::vec(candidate_strategy(), 0..10),
    ) {
        let mut p = period(3);
        let lock_date = base_date() + Duration::days(lock_offset);
        p.lock_date = Some(lock_date);
        let cutoff = lock_date - Duration::days(back);
        let is_already_finalized = matches!(
            plan_finalization(&p, cutoff, &candidates),
            Err(LedgerError::AlreadyFinalized { .. })
        );
        prop_assert!(is_already_finalized);
    }
}
