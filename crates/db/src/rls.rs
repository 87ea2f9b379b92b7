//! Tenant-scoped transactions.
//!
//! Every ledger operation runs inside one transaction that first sets
//! `app.current_tenant_id` with `SET LOCAL`. The row-level-security policies
//! created by the migrations filter every ledger table on that setting, so a
//! query can only ever see the rows of the tenant it was opened for.
//!
//! Writes use the default `READ COMMITTED` isolation and row locks. Reports
//! use [`TenantTransaction::begin_read`], a read-only `REPEATABLE READ`
//! transaction, so every query in them sees the same snapshot.
//!
//! # Usage
//!
//! ```ignore
//! use defter_db::rls::TenantTransaction;
//!
//! let scope = TenantTransaction::begin(&db, tenant_id).await?;
//! let accounts = Accounts::find().all(scope.transaction()).await?;
//! scope.commit().await?;
//! ```

use sea_orm::{
    AccessMode, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel, TransactionTrait,
};

use defter_shared::types::TenantId;

/// A database transaction bound to one tenant.
///
/// Dropping it without `commit` rolls the transaction back.
pub struct TenantTransaction {
    txn: DatabaseTransaction,
    tenant_id: TenantId,
}

impl TenantTransaction {
    /// Begins a transaction and sets the tenant context for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the tenant
    /// context cannot be set.
    pub async fn begin(db: &DatabaseConnection, tenant_id: TenantId) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        Self::scoped(txn, tenant_id).await
    }

    /// Begins a read-only `REPEATABLE READ` transaction for the tenant.
    ///
    /// # Errors
    ///
    /// Same as [`TenantTransaction::begin`].
    pub async fn begin_read(db: &DatabaseConnection, tenant_id: TenantId) -> Result<Self, DbErr> {
        let txn = db
            .begin_with_config(Some(IsolationLevel::RepeatableRead), Some(AccessMode::ReadOnly))
            .await?;
        Self::scoped(txn, tenant_id).await
    }

    async fn scoped(txn: DatabaseTransaction, tenant_id: TenantId) -> Result<Self, DbErr> {
        txn.execute_unprepared(&tenant_context_sql(tenant_id)).await?;
        Ok(Self { txn, tenant_id })
    }

    /// The tenant this transaction is scoped to.
    #[must_use]
    pub const fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// The underlying transaction, for executing queries.
    #[must_use]
    pub const fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }
}

/// `SET LOCAL` statement for a tenant. The id is a UUID, so its text form
/// cannot break out of the literal.
fn tenant_context_sql(tenant_id: TenantId) -> String {
    format!("SET LOCAL app.current_tenant_id = '{tenant_id}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_tenant_context_sql() {
        let tenant = TenantId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap());
        assert_eq!(
            tenant_context_sql(tenant),
            "SET LOCAL app.current_tenant_id = '550e8400-e29b-41d4-a716-446655440000'"
        );
    }
}
