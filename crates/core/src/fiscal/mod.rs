//! Fiscal periods, date locking, and finalization.

pub mod finalize;
pub mod period;
pub mod sequence;

#[cfg(test)]
mod finalize_props;

pub use finalize::{
    FinalizationCandidate, FinalizationPlan, FinalizationSummary, SequenceAssignment, plan_finalization,
};
pub use period::{FiscalPeriod, NewFiscalPeriod, PeriodState, date_ranges_overlap, validate_new_period};
pub use sequence::{CanonicalKey, natural_cmp, sort_canonically};
