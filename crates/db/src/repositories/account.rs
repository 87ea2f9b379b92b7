//! Account repository for chart of accounts database operations.
//!
//! Hierarchy rules live in `defter_core::chart::ChartOfAccounts`. Every write
//! loads the tenant's chart with its rows locked, applies the change to the
//! in-memory arena, and stores the rows the arena reports as changed.

use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info};

use defter_core::chart::{Account, AccountChanges, AccountCode, ChartError, ChartOfAccounts, NewAccount};
use defter_shared::types::{AccountId, TenantId};

use super::error::{RepositoryError, is_unique_violation};
use crate::entities::{accounts, voucher_lines};
use crate::rls::TenantTransaction;

/// Account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads the tenant's whole chart of accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored code is corrupt.
    pub async fn load_chart(&self, tenant_id: TenantId) -> Result<ChartOfAccounts, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let chart = load_chart(scope.transaction(), tenant_id, false).await?;
        scope.commit().await?;
        Ok(chart)
    }

    /// Lists all accounts in code order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, tenant_id: TenantId) -> Result<Vec<Account>, RepositoryError> {
        let chart = self.load_chart(tenant_id).await?;
        Ok(chart.iter().cloned().collect())
    }

    /// Gets the account with exactly this code.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCode` for a malformed code and `CodeNotFound` if no
    /// account of the tenant uses it.
    pub async fn find_by_code(&self, tenant_id: TenantId, code: &str) -> Result<Account, RepositoryError> {
        let code = AccountCode::parse(code)?;
        let chart = self.load_chart(tenant_id).await?;
        let account = chart
            .find_by_code(code.as_str())
            .cloned()
            .ok_or_else(|| ChartError::CodeNotFound(code.to_string()))?;
        Ok(account)
    }

    /// Lists the account with code `prefix` and every account beneath it,
    /// in code order. Matching is by whole segments: `120` covers `120.01`
    /// but not `1200`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCode` for a malformed prefix.
    pub async fn find_by_prefix(&self, tenant_id: TenantId, prefix: &str) -> Result<Vec<Account>, RepositoryError> {
        let prefix = AccountCode::parse(prefix)?;
        let chart = self.load_chart(tenant_id).await?;
        let accounts: Vec<Account> = chart.find_by_prefix(&prefix).cloned().collect();
        debug!(tenant_id = %tenant_id, prefix = %prefix, matches = accounts.len(), "Accounts found by prefix");
        Ok(accounts)
    }

    /// Gets one account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist for the tenant.
    pub async fn get(&self, tenant_id: TenantId, account_id: AccountId) -> Result<Account, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let model = accounts::Entity::find_by_id(account_id.into_inner())
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .one(scope.transaction())
            .await?
            .ok_or(ChartError::AccountNotFound(account_id))?;
        scope.commit().await?;
        Ok(Account::try_from(model)?)
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns `ChartError` for an invalid code, duplicate code, blank name,
    /// or missing/sub-ledger parent.
    pub async fn create(&self, tenant_id: TenantId, input: NewAccount) -> Result<Account, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let mut chart = load_chart(scope.transaction(), tenant_id, true).await?;

        let account = chart.create(input)?;
        account_active_model(tenant_id, &account)
            .insert(scope.transaction())
            .await
            .map_err(|e| duplicate_code_or(e, &account))?;

        scope.commit().await?;
        info!(tenant_id = %tenant_id, account_id = %account.id, code = %account.code, "Account created");
        Ok(account)
    }

    /// Edits an account: rename, recode, reparent, reclassify, or deactivate.
    ///
    /// Reparenting rewrites the depth of the whole moved subtree.
    ///
    /// # Errors
    ///
    /// Returns `ChartError` for any hierarchy rule violation.
    pub async fn update(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        changes: AccountChanges,
    ) -> Result<Account, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let txn = scope.transaction();
        let mut chart = load_chart(txn, tenant_id, true).await?;
        let posted = count_posted_lines(txn, account_id).await?;

        let changed = chart.edit(account_id, changes, posted)?;
        for account in &changed {
            let mut model = account_active_model(tenant_id, account);
            model.id = Unchanged(account.id.into_inner());
            model.tenant_id = Unchanged(tenant_id.into_inner());
            model.update(txn).await.map_err(|e| duplicate_code_or(e, account))?;
        }
        debug!(tenant_id = %tenant_id, rows = changed.len(), "Account rows rewritten");

        scope.commit().await?;
        let updated = changed
            .into_iter()
            .next()
            .ok_or(ChartError::AccountNotFound(account_id))?;
        info!(tenant_id = %tenant_id, account_id = %account_id, code = %updated.code, "Account updated");
        Ok(updated)
    }

    /// Deletes an account with no children and no posted lines.
    ///
    /// # Errors
    ///
    /// Returns `HasChildren` or `HasPostedLines`.
    pub async fn delete(&self, tenant_id: TenantId, account_id: AccountId) -> Result<(), RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let txn = scope.transaction();
        let mut chart = load_chart(txn, tenant_id, true).await?;
        let posted = count_posted_lines(txn, account_id).await?;

        let removed = chart.remove(account_id, posted)?;
        accounts::Entity::delete_by_id(account_id.into_inner()).exec(txn).await?;

        scope.commit().await?;
        info!(tenant_id = %tenant_id, account_id = %account_id, code = %removed.code, "Account deleted");
        Ok(())
    }
}

/// Loads a tenant's chart. With `for_update`, every account row is locked
/// until the transaction ends, which serializes concurrent chart edits.
pub(crate) async fn load_chart<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    for_update: bool,
) -> Result<ChartOfAccounts, RepositoryError> {
    let mut query = accounts::Entity::find()
        .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .order_by_asc(accounts::Column::Id);
    if for_update {
        query = query.lock_exclusive();
    }
    let models = query.all(conn).await?;

    let accounts = models
        .into_iter()
        .map(Account::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ChartOfAccounts::from_accounts(accounts)?)
}

/// Number of voucher lines posted to an account.
pub(crate) async fn count_posted_lines<C: ConnectionTrait>(conn: &C, account_id: AccountId) -> Result<u64, RepositoryError> {
    let count = voucher_lines::Entity::find()
        .filter(voucher_lines::Column::AccountId.eq(account_id.into_inner()))
        .count(conn)
        .await?;
    Ok(count)
}

/// Active model holding every stored column of an account except timestamps.
fn account_active_model(tenant_id: TenantId, account: &Account) -> accounts::ActiveModel {
    accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        tenant_id: Set(tenant_id.into_inner()),
        code: Set(account.code.to_string()),
        name: Set(account.name.clone()),
        parent_id: Set(account.parent_id.map(AccountId::into_inner)),
        depth: Set(i32::try_from(account.depth).unwrap_or(i32::MAX)),
        classification: Set(account.classification.into()),
        balance_nature: Set(account.balance_nature.into()),
        special_role: Set(account.special_role.into()),
        debit_total: Set(account.debit_total),
        credit_total: Set(account.credit_total),
        is_active: Set(account.is_active),
        ..Default::default()
    }
}

/// The arena already rejects duplicate codes; a violation here means a
/// concurrent insert won the race.
fn duplicate_code_or(err: sea_orm::DbErr, account: &Account) -> RepositoryError {
    if is_unique_violation(&err) {
        ChartError::DuplicateCode(account.code.to_string()).into()
    } else {
        err.into()
    }
}
