//! Finalization planning.
//!
//! Finalizing a period up to a cutoff date numbers every eligible voucher in
//! canonical order, locks them, and moves the period's lock date forward.
//! This module computes the whole outcome up front; the caller applies it in
//! one transaction or not at all.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use defter_shared::types::VoucherId;

use super::period::FiscalPeriod;
use super::sequence::{CanonicalKey, sort_canonically};
use crate::ledger::{LedgerError, VoucherType};

/// A voucher considered for finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizationCandidate {
    /// Voucher ID.
    pub id: VoucherId,
    /// Voucher date.
    pub date: NaiveDate,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Voucher number.
    pub voucher_number: String,
    /// Current lock flag.
    pub locked: bool,
}

impl FinalizationCandidate {
    /// Canonical sort key.
    #[must_use]
    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey::new(self.date, self.voucher_type, &self.voucher_number, self.id)
    }
}

/// A sequence number handed to a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceAssignment {
    /// Voucher ID.
    pub voucher_id: VoucherId,
    /// Statutory sequence number.
    pub sequence_number: i64,
}

/// Outcome of a finalization, to be applied atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationPlan {
    /// Assignments in canonical order.
    pub assignments: Vec<SequenceAssignment>,
    /// New lock date of the period.
    pub lock_date: NaiveDate,
    /// New last sequence number of the period.
    pub last_sequence_number: i64,
}

impl FinalizationPlan {
    /// Summary for callers.
    #[must_use]
    pub fn summary(&self) -> FinalizationSummary {
        FinalizationSummary {
            finalized_count: self.assignments.len(),
            first_sequence_number: self.assignments.first().map(|a| a.sequence_number),
            last_sequence_number: self.last_sequence_number,
            lock_date: self.lock_date,
        }
    }
}

/// What a finalization run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizationSummary {
    /// Number of vouchers numbered and locked.
    pub finalized_count: usize,
    /// First number assigned.
    pub first_sequence_number: Option<i64>,
    /// Last number assigned.
    pub last_sequence_number: i64,
    /// New lock date.
    pub lock_date: NaiveDate,
}

/// Plans the finalization of `period` up to and including `cutoff`.
///
/// `candidates` are the period's vouchers dated on or before the cutoff.
/// Vouchers already locked inside the previous lock range are skipped.
///
/// # Errors
///
/// - `AlreadyFinalized` if `cutoff` is not after the current lock date
/// - `CutoffOutsidePeriod` if `cutoff` precedes the period start
/// - `InconsistentLockState` if a voucher after the lock date is already locked
/// - `NothingToFinalize` if no unlocked voucher qualifies
pub fn plan_finalization(
    period: &FiscalPeriod,
    cutoff: NaiveDate,
    candidates: &[FinalizationCandidate],
) -> Result<FinalizationPlan, LedgerError> {
    // 1. Finalization never moves backward
    if let Some(lock_date) = period.lock_date {
        if cutoff <= lock_date {
            return Err(LedgerError::AlreadyFinalized { cutoff, lock_date });
        }
    }
    if cutoff < period.start_date {
        return Err(LedgerError::CutoffOutsidePeriod {
            cutoff,
            start: period.start_date,
        });
    }

    // 2. Select eligible vouchers
    let mut selected: Vec<&FinalizationCandidate> = Vec::new();
    for candidate in candidates.iter().filter(|c| c.date <= cutoff) {
        if candidate.locked {
            if period.is_date_locked(candidate.date) {
                continue;
            }
            return Err(LedgerError::InconsistentLockState {
                voucher_id: candidate.id,
            });
        }
        selected.push(candidate);
    }
    if selected.is_empty() {
        return Err(LedgerError::NothingToFinalize { cutoff });
    }

    // 3. Number them in canonical order
    sort_canonically(&mut selected, |c| c.canonical_key());
    let mut next = period.last_sequence_number;
    let assignments = selected
        .iter()
        .map(|c| {
            next += 1;
            SequenceAssignment {
                voucher_id: c.id,
                sequence_number: next,
            }
        })
        .collect();

    Ok(FinalizationPlan {
        assignments,
        lock_date: cutoff,
        last_sequence_number: next,
    })
}
