//! Balance repository: keeps cached account totals equal to their lines.
//!
//! Totals are always re-summed from `voucher_lines`, never adjusted by a
//! delta. Voucher writes call [`resum_accounts`] inside their own
//! transaction, so a failed resum rolls the voucher write back with it.

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::Expr,
};
use tracing::{info, warn};
use uuid::Uuid;

use defter_core::ledger::{AccountTotals, BalanceAnomaly, BalanceDrift, detect_anomalies, find_drift, resum};
use defter_shared::types::{AccountId, TenantId};

use super::account::load_chart;
use super::error::RepositoryError;
use crate::entities::{accounts, voucher_lines};
use crate::rls::TenantTransaction;

/// Balance repository for aggregate maintenance and checks.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Re-sums every account of the tenant. Returns the number of accounts
    /// whose cached totals were wrong.
    ///
    /// # Errors
    ///
    /// Returns an error if any query fails; nothing is changed then.
    pub async fn rebuild_all(&self, tenant_id: TenantId) -> Result<usize, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let txn = scope.transaction();

        let chart = load_chart(txn, tenant_id, true).await?;
        let ids: Vec<AccountId> = chart.iter().map(|a| a.id).collect();
        let actual = sum_lines(txn, &ids).await?;
        let drift = find_drift(chart.iter(), &actual);
        for totals in &actual {
            store_totals(txn, totals).await?;
        }

        scope.commit().await?;
        info!(tenant_id = %tenant_id, accounts = ids.len(), repaired = drift.len(), "Balances rebuilt");
        Ok(drift.len())
    }

    /// Lists accounts whose cached totals differ from their lines.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn verify(&self, tenant_id: TenantId) -> Result<Vec<BalanceDrift>, RepositoryError> {
        let scope = TenantTransaction::begin_read(&self.db, tenant_id).await?;
        let txn = scope.transaction();

        let chart = load_chart(txn, tenant_id, false).await?;
        let ids: Vec<AccountId> = chart.iter().map(|a| a.id).collect();
        let actual = sum_lines(txn, &ids).await?;
        scope.commit().await?;

        let drift = find_drift(chart.iter(), &actual);
        if !drift.is_empty() {
            warn!(tenant_id = %tenant_id, accounts = drift.len(), "Cached balances drift from voucher lines");
        }
        Ok(drift)
    }

    /// Lists accounts whose net balance contradicts their balance nature.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn anomalies(&self, tenant_id: TenantId) -> Result<Vec<BalanceAnomaly>, RepositoryError> {
        let scope = TenantTransaction::begin_read(&self.db, tenant_id).await?;
        let chart = load_chart(scope.transaction(), tenant_id, false).await?;
        scope.commit().await?;
        Ok(detect_anomalies(chart.iter()))
    }
}

/// Re-sums `account_ids` from their lines and stores the result.
///
/// The account rows are locked in id order first, so concurrent voucher
/// writes touching overlapping accounts cannot deadlock.
///
/// # Errors
///
/// Returns an error if any query fails.
pub async fn resum_accounts<C: ConnectionTrait>(
    conn: &C,
    account_ids: &[AccountId],
) -> Result<Vec<AccountTotals>, RepositoryError> {
    if account_ids.is_empty() {
        return Ok(Vec::new());
    }

    accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(raw_ids(account_ids)))
        .order_by_asc(accounts::Column::Id)
        .lock_exclusive()
        .all(conn)
        .await?;

    let totals = sum_lines(conn, account_ids).await?;
    for t in &totals {
        store_totals(conn, t).await?;
    }
    Ok(totals)
}

/// Line sums per account, one entry for every requested account.
async fn sum_lines<C: ConnectionTrait>(conn: &C, account_ids: &[AccountId]) -> Result<Vec<AccountTotals>, RepositoryError> {
    if account_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<(Uuid, Decimal, Decimal)> = voucher_lines::Entity::find()
        .filter(voucher_lines::Column::AccountId.is_in(raw_ids(account_ids)))
        .select_only()
        .column(voucher_lines::Column::AccountId)
        .column_as(voucher_lines::Column::Debit.sum(), "debit_total")
        .column_as(voucher_lines::Column::Credit.sum(), "credit_total")
        .group_by(voucher_lines::Column::AccountId)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(resum(
        account_ids,
        rows.into_iter()
            .map(|(id, debit, credit)| (AccountId::from_uuid(id), debit, credit)),
    ))
}

async fn store_totals<C: ConnectionTrait>(conn: &C, totals: &AccountTotals) -> Result<(), RepositoryError> {
    accounts::Entity::update_many()
        .col_expr(accounts::Column::DebitTotal, Expr::value(totals.debit_total))
        .col_expr(accounts::Column::CreditTotal, Expr::value(totals.credit_total))
        .filter(accounts::Column::Id.eq(totals.account_id.into_inner()))
        .exec(conn)
        .await?;
    Ok(())
}

fn raw_ids(ids: &[AccountId]) -> Vec<Uuid> {
    ids.iter().map(|id| id.into_inner()).collect()
}
