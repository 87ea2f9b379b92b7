//! Account balance aggregation.
//!
//! Cached debit/credit totals are never adjusted by deltas. After every
//! voucher write the affected accounts are re-summed from all committed
//! lines, so the cache cannot drift from the lines it summarizes.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use defter_shared::types::AccountId;

use crate::chart::{Account, BalanceNature};

/// Debit and credit totals of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTotals {
    /// The account ID.
    pub account_id: AccountId,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
}

impl AccountTotals {
    /// Zero totals for an account.
    #[must_use]
    pub const fn zero(account_id: AccountId) -> Self {
        Self {
            account_id,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        }
    }

    /// Net balance, debit minus credit.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.debit_total - self.credit_total
    }
}

/// Accounts whose totals a voucher write can change: those on the old lines
/// plus those on the new lines. Sorted, so row locks are taken in a stable order.
#[must_use]
pub fn affected_accounts(
    old_lines: impl IntoIterator<Item = AccountId>,
    new_lines: impl IntoIterator<Item = AccountId>,
) -> Vec<AccountId> {
    old_lines
        .into_iter()
        .chain(new_lines)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Re-sums `accounts` from `postings` (account, debit, credit).
///
/// Every requested account gets an entry; one with no postings sums to zero.
/// Postings for other accounts are ignored.
#[must_use]
pub fn resum(
    accounts: &[AccountId],
    postings: impl IntoIterator<Item = (AccountId, Decimal, Decimal)>,
) -> Vec<AccountTotals> {
    let mut totals: BTreeMap<AccountId, AccountTotals> = accounts
        .iter()
        .map(|id| (*id, AccountTotals::zero(*id)))
        .collect();

    for (account_id, debit, credit) in postings {
        if let Some(entry) = totals.get_mut(&account_id) {
            entry.debit_total += debit;
            entry.credit_total += credit;
        }
    }

    totals.into_values().collect()
}

/// An account whose net balance has the wrong sign for its balance nature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAnomaly {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Declared balance nature.
    pub balance_nature: BalanceNature,
    /// Actual net balance (debit minus credit).
    pub net_balance: Decimal,
}

/// Lists accounts whose cached net balance contradicts their balance nature.
///
/// This is reporting only. Writes never fail because of it.
#[must_use]
pub fn detect_anomalies<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Vec<BalanceAnomaly> {
    accounts
        .into_iter()
        .filter(|a| a.balance_nature.is_violated_by(a.net_balance()))
        .map(|a| BalanceAnomaly {
            account_id: a.id,
            code: a.code.to_string(),
            name: a.name.clone(),
            balance_nature: a.balance_nature,
            net_balance: a.net_balance(),
        })
        .collect()
}

/// A cached total that differs from the recomputed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDrift {
    /// The account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Cached totals.
    pub cached: AccountTotals,
    /// Totals recomputed from the lines.
    pub actual: AccountTotals,
}

/// Compares cached account totals with recomputed ones.
#[must_use]
pub fn find_drift<'a>(
    accounts: impl IntoIterator<Item = &'a Account>,
    actual: &[AccountTotals],
) -> Vec<BalanceDrift> {
    let actual: BTreeMap<AccountId, &AccountTotals> = actual.iter().map(|t| (t.account_id, t)).collect();

    accounts
        .into_iter()
        .filter_map(|account| {
            let cached = AccountTotals {
                account_id: account.id,
                debit_total: account.debit_total,
                credit_total: account.credit_total,
            };
            let recomputed = actual
                .get(&account.id)
                .map_or_else(|| AccountTotals::zero(account.id), |t| **t);
            (cached != recomputed).then(|| BalanceDrift {
                account_id: account.id,
                code: account.code.to_string(),
                cached,
                actual: recomputed,
            })
        })
        .collect()
}
