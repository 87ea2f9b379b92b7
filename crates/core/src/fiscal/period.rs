//! Fiscal period types and date locking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use defter_shared::types::{FiscalPeriodId, TenantId};

use crate::ledger::LedgerError;

/// Finalization state of a fiscal period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "lock_date", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodState {
    /// Nothing finalized yet. Every voucher is editable.
    Open,
    /// Vouchers on or before the date are immutable; later ones are editable.
    FinalizedUpTo(NaiveDate),
}

/// A fiscal period of a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Unique identifier.
    pub id: FiscalPeriodId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Period name (e.g., "2025").
    pub name: String,
    /// Start date of the period.
    pub start_date: NaiveDate,
    /// End date of the period.
    pub end_date: NaiveDate,
    /// Inactive periods accept no new vouchers.
    pub is_active: bool,
    /// Last finalized date, `None` while the period is open.
    pub lock_date: Option<NaiveDate>,
    /// Last statutory sequence number handed out in this period.
    pub last_sequence_number: i64,
}

impl FiscalPeriod {
    /// Current finalization state.
    #[must_use]
    pub fn state(&self) -> PeriodState {
        self.lock_date
            .map_or(PeriodState::Open, PeriodState::FinalizedUpTo)
    }

    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true if `date` is inside the finalized range.
    #[must_use]
    pub fn is_date_locked(&self, date: NaiveDate) -> bool {
        self.lock_date.is_some_and(|lock| date <= lock)
    }

    /// Rejects dates inside the finalized range.
    ///
    /// # Errors
    ///
    /// Returns `PeriodLocked` if `date` is on or before the lock date.
    pub fn ensure_date_editable(&self, date: NaiveDate) -> Result<(), LedgerError> {
        match self.lock_date {
            Some(lock_date) if date <= lock_date => Err(LedgerError::PeriodLocked { date, lock_date }),
            _ => Ok(()),
        }
    }

    /// Checks that a voucher dated `date` may be written into this period.
    ///
    /// The lock is checked first so a finalized date always reports
    /// `PeriodLocked`, whatever else is wrong with the voucher.
    ///
    /// # Errors
    ///
    /// Returns `PeriodLocked`, `PeriodInactive`, or `DateOutsidePeriod`.
    pub fn ensure_accepts(&self, date: NaiveDate) -> Result<(), LedgerError> {
        self.ensure_date_editable(date)?;
        if !self.is_active {
            return Err(LedgerError::PeriodInactive(self.id));
        }
        if !self.contains_date(date) {
            return Err(LedgerError::DateOutsidePeriod {
                date,
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

/// Input for creating a fiscal period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFiscalPeriod {
    /// Period name.
    pub name: String,
    /// Start date.
    pub start_date: NaiveDate,
    /// End date.
    pub end_date: NaiveDate,
}

/// Returns true if the two inclusive date ranges share at least one day.
#[must_use]
pub fn date_ranges_overlap(
    start1: NaiveDate,
    end1: NaiveDate,
    start2: NaiveDate,
    end2: NaiveDate,
) -> bool {
    start1 <= end2 && start2 <= end1
}

/// Validates a new period against the tenant's existing periods.
///
/// # Errors
///
/// Returns `InvalidPeriodRange` if start is not before end, or
/// `OverlappingPeriod` naming the first period it collides with.
pub fn validate_new_period(input: &NewFiscalPeriod, existing: &[FiscalPeriod]) -> Result<(), LedgerError> {
    if input.start_date >= input.end_date {
        return Err(LedgerError::InvalidPeriodRange {
            start: input.start_date,
            end: input.end_date,
        });
    }
    if let Some(clash) = existing
        .iter()
        .find(|p| date_ranges_overlap(input.start_date, input.end_date, p.start_date, p.end_date))
    {
        return Err(LedgerError::OverlappingPeriod {
            existing: clash.name.clone(),
        });
    }
    Ok(())
}
