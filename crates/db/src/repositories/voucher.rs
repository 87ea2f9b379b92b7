//! Voucher repository for journal voucher database operations.
//!
//! Every write runs in one tenant transaction:
//! 1. share-lock the fiscal period, then lock the voucher (update/delete),
//! 2. validate with `VoucherService`,
//! 3. take a voucher number if none was supplied,
//! 4. write the header and replace all lines,
//! 5. re-sum every affected account.
//!
//! Row locks are always taken in this order: fiscal period, voucher,
//! voucher counter, accounts by id. Finalization follows the same order
//! (period exclusively, then its vouchers), so a voucher write and a
//! finalize call on the same period queue behind each other instead of
//! deadlocking.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use defter_core::chart::{Account, ChartError};
use defter_core::fiscal::FiscalPeriod;
use defter_core::ledger::{
    CounterKey, LedgerError, PostingAccount, SourceRef, Voucher, VoucherInput, VoucherLine, VoucherService,
    VoucherTotals, VoucherType, affected_accounts, format_voucher_number, normalize_voucher_number,
};
use defter_shared::types::{AccountId, FiscalPeriodId, TenantId, VoucherId, VoucherLineId};

use super::balance::resum_accounts;
use super::counter;
use super::error::{RepositoryError, is_unique_violation};
use crate::entities::convert::posting_account;
use crate::entities::sea_orm_active_enums::VoucherType as DbVoucherType;
use crate::entities::{accounts, fiscal_periods, voucher_lines, vouchers};
use crate::rls::TenantTransaction;

/// A voucher with its lines in line order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoucherWithLines {
    /// Voucher header.
    #[serde(flatten)]
    pub voucher: Voucher,
    /// Lines.
    pub lines: Vec<VoucherLine>,
}

/// Filter options for listing vouchers.
#[derive(Debug, Clone, Default)]
pub struct VoucherFilter {
    /// Filter by fiscal period.
    pub fiscal_period_id: Option<FiscalPeriodId>,
    /// Filter by voucher type.
    pub voucher_type: Option<VoucherType>,
    /// Filter by date range start (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Filter by finalized state.
    pub locked: Option<bool>,
}

/// Voucher repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct VoucherRepository {
    db: DatabaseConnection,
    number_digits: usize,
}

impl VoucherRepository {
    /// Creates a new voucher repository. Auto-generated numbers are padded
    /// to `number_digits`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, number_digits: usize) -> Self {
        Self { db, number_digits }
    }

    /// Creates a voucher with its lines.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the voucher is invalid, its date is locked or
    /// outside the period, or its number is taken.
    pub async fn create(&self, tenant_id: TenantId, input: VoucherInput) -> Result<VoucherWithLines, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let txn = scope.transaction();

        let period = load_period(txn, tenant_id, input.fiscal_period_id).await?;
        let lookup = load_posting_accounts(txn, tenant_id, &input).await?;
        let totals = VoucherService::validate_create(&input, &period, |id| lookup.get(&id).cloned())?;

        let voucher_number = match normalize_voucher_number(input.voucher_number.as_deref()) {
            Some(number) => number,
            None => self.next_number(txn, tenant_id, input.voucher_type, input.date).await?,
        };

        let voucher_id = VoucherId::new();
        let header = header_active_model(tenant_id, voucher_id, &input, &voucher_number, totals);
        header
            .insert(txn)
            .await
            .map_err(|e| duplicate_number_or(e, &voucher_number, input.voucher_type))?;
        insert_lines(txn, tenant_id, voucher_id, &input).await?;

        let affected = affected_accounts([], input.lines.iter().map(|l| l.account_id));
        resum_accounts(txn, &affected).await?;

        let created = fetch_with_lines(txn, tenant_id, voucher_id).await?;
        scope.commit().await?;

        info!(
            tenant_id = %tenant_id,
            voucher_id = %voucher_id,
            voucher_number = %voucher_number,
            total = %totals.debit,
            "Voucher created"
        );
        Ok(created)
    }

    /// Replaces a voucher's header and all of its lines.
    ///
    /// Without a supplied number the stored one is kept, unless the voucher
    /// type changes, in which case a new number of the new type is taken.
    ///
    /// # Errors
    ///
    /// Returns `VoucherLocked` or `PeriodLocked` for a frozen voucher, and any
    /// error `create` can return.
    pub async fn update(
        &self,
        tenant_id: TenantId,
        voucher_id: VoucherId,
        input: VoucherInput,
    ) -> Result<VoucherWithLines, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let txn = scope.transaction();

        let (existing, existing_period) = lock_voucher_in_period(txn, tenant_id, voucher_id).await?;
        let target_period = if input.fiscal_period_id == existing.fiscal_period_id {
            existing_period.clone()
        } else {
            load_period(txn, tenant_id, input.fiscal_period_id).await?
        };
        let old_accounts = line_accounts(txn, voucher_id).await?;

        let lookup = load_posting_accounts(txn, tenant_id, &input).await?;
        let totals = VoucherService::validate_update(&existing, &existing_period, &input, &target_period, |id| {
            lookup.get(&id).cloned()
        })?;

        let voucher_number = match normalize_voucher_number(input.voucher_number.as_deref()) {
            Some(number) => number,
            None if input.voucher_type == existing.voucher_type => existing.voucher_number.clone(),
            None => self.next_number(txn, tenant_id, input.voucher_type, input.date).await?,
        };

        let mut header = header_active_model(tenant_id, voucher_id, &input, &voucher_number, totals);
        header.id = Unchanged(voucher_id.into_inner());
        header.tenant_id = Unchanged(tenant_id.into_inner());
        header
            .update(txn)
            .await
            .map_err(|e| duplicate_number_or(e, &voucher_number, input.voucher_type))?;

        voucher_lines::Entity::delete_many()
            .filter(voucher_lines::Column::VoucherId.eq(voucher_id.into_inner()))
            .exec(txn)
            .await?;
        insert_lines(txn, tenant_id, voucher_id, &input).await?;

        let affected = affected_accounts(old_accounts, input.lines.iter().map(|l| l.account_id));
        resum_accounts(txn, &affected).await?;

        let updated = fetch_with_lines(txn, tenant_id, voucher_id).await?;
        scope.commit().await?;

        info!(tenant_id = %tenant_id, voucher_id = %voucher_id, voucher_number = %voucher_number, "Voucher updated");
        Ok(updated)
    }

    /// Deletes an unlocked voucher and its lines.
    ///
    /// # Errors
    ///
    /// Returns `VoucherNotFound`, `VoucherLocked`, or `PeriodLocked`.
    pub async fn delete(&self, tenant_id: TenantId, voucher_id: VoucherId) -> Result<(), RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let txn = scope.transaction();

        let (existing, period) = lock_voucher_in_period(txn, tenant_id, voucher_id).await?;
        VoucherService::validate_delete(&existing, &period)?;

        let old_accounts = line_accounts(txn, voucher_id).await?;
        // Lines go with the header (ON DELETE CASCADE).
        vouchers::Entity::delete_by_id(voucher_id.into_inner()).exec(txn).await?;
        resum_accounts(txn, &affected_accounts(old_accounts, [])).await?;

        scope.commit().await?;
        info!(tenant_id = %tenant_id, voucher_id = %voucher_id, voucher_number = %existing.voucher_number, "Voucher deleted");
        Ok(())
    }

    /// Gets a voucher with its lines.
    ///
    /// # Errors
    ///
    /// Returns `VoucherNotFound` if it does not exist for the tenant.
    pub async fn get(&self, tenant_id: TenantId, voucher_id: VoucherId) -> Result<VoucherWithLines, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let voucher = fetch_with_lines(scope.transaction(), tenant_id, voucher_id).await?;
        scope.commit().await?;
        Ok(voucher)
    }

    /// Finds the voucher a producer module created for one of its records.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_source(
        &self,
        tenant_id: TenantId,
        source: &SourceRef,
    ) -> Result<Option<VoucherWithLines>, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let txn = scope.transaction();
        let found = vouchers::Entity::find()
            .filter(vouchers::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(vouchers::Column::SourceModule.eq(source.module.as_str()))
            .filter(vouchers::Column::SourceRecordId.eq(source.record_id))
            .one(txn)
            .await?;
        let result = match found {
            Some(model) => Some(fetch_with_lines(txn, tenant_id, VoucherId::from_uuid(model.id)).await?),
            None => None,
        };
        scope.commit().await?;
        Ok(result)
    }

    /// Lists voucher headers, by date then number.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list(&self, tenant_id: TenantId, filter: VoucherFilter) -> Result<Vec<Voucher>, RepositoryError> {
        let mut query = vouchers::Entity::find().filter(vouchers::Column::TenantId.eq(tenant_id.into_inner()));

        if let Some(period_id) = filter.fiscal_period_id {
            query = query.filter(vouchers::Column::FiscalPeriodId.eq(period_id.into_inner()));
        }
        if let Some(voucher_type) = filter.voucher_type {
            query = query.filter(vouchers::Column::VoucherType.eq(DbVoucherType::from(voucher_type)));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(vouchers::Column::VoucherDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(vouchers::Column::VoucherDate.lte(date_to));
        }
        if let Some(locked) = filter.locked {
            query = query.filter(vouchers::Column::Locked.eq(locked));
        }

        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let models = query
            .order_by_asc(vouchers::Column::VoucherDate)
            .order_by_asc(vouchers::Column::VoucherNumber)
            .all(scope.transaction())
            .await?;
        scope.commit().await?;

        Ok(models.into_iter().map(Voucher::from).collect())
    }

    async fn next_number<C: ConnectionTrait>(
        &self,
        conn: &C,
        tenant_id: TenantId,
        voucher_type: VoucherType,
        date: NaiveDate,
    ) -> Result<String, RepositoryError> {
        let sequence = counter::next_value(conn, tenant_id, CounterKey::for_voucher(voucher_type, date)).await?;
        Ok(format_voucher_number(voucher_type, sequence, self.number_digits))
    }
}

/// Loads a fiscal period with a shared row lock held until commit.
pub(crate) async fn load_period<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    period_id: FiscalPeriodId,
) -> Result<FiscalPeriod, RepositoryError> {
    let model = fiscal_periods::Entity::find_by_id(period_id.into_inner())
        .filter(fiscal_periods::Column::TenantId.eq(tenant_id.into_inner()))
        .lock_shared()
        .one(conn)
        .await?
        .ok_or(LedgerError::FiscalPeriodNotFound(period_id))?;
    Ok(model.into())
}

/// Share-locks the voucher's period, then loads the voucher `FOR UPDATE`.
///
/// The period id is read unlocked first so the period row is always locked
/// before the voucher row.
async fn lock_voucher_in_period<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    voucher_id: VoucherId,
) -> Result<(Voucher, FiscalPeriod), RepositoryError> {
    let period_id: Uuid = vouchers::Entity::find_by_id(voucher_id.into_inner())
        .filter(vouchers::Column::TenantId.eq(tenant_id.into_inner()))
        .select_only()
        .column(vouchers::Column::FiscalPeriodId)
        .into_tuple()
        .one(conn)
        .await?
        .ok_or(LedgerError::VoucherNotFound(voucher_id))?;
    let period = load_period(conn, tenant_id, FiscalPeriodId::from_uuid(period_id)).await?;

    let voucher: Voucher = vouchers::Entity::find_by_id(voucher_id.into_inner())
        .filter(vouchers::Column::TenantId.eq(tenant_id.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(LedgerError::VoucherNotFound(voucher_id))?
        .into();
    if voucher.fiscal_period_id != period.id {
        return Err(LedgerError::ConcurrentModification(voucher_id).into());
    }
    Ok((voucher, period))
}

/// Posting facts for every account the input references. Accounts of other
/// tenants are simply absent and fail validation as missing.
async fn load_posting_accounts<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    input: &VoucherInput,
) -> Result<HashMap<AccountId, PostingAccount>, RepositoryError> {
    let ids: Vec<Uuid> = input.lines.iter().map(|l| l.account_id.into_inner()).collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = accounts::Entity::find()
        .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(accounts::Column::Id.is_in(ids))
        .all(conn)
        .await?;

    models
        .into_iter()
        .map(|model| -> Result<(AccountId, PostingAccount), ChartError> {
            let account = Account::try_from(model)?;
            Ok((account.id, posting_account(&account)))
        })
        .collect::<Result<HashMap<_, _>, ChartError>>()
        .map_err(Into::into)
}

async fn line_accounts<C: ConnectionTrait>(conn: &C, voucher_id: VoucherId) -> Result<Vec<AccountId>, RepositoryError> {
    let ids: Vec<Uuid> = voucher_lines::Entity::find()
        .filter(voucher_lines::Column::VoucherId.eq(voucher_id.into_inner()))
        .select_only()
        .column(voucher_lines::Column::AccountId)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(ids.into_iter().map(AccountId::from_uuid).collect())
}

fn header_active_model(
    tenant_id: TenantId,
    voucher_id: VoucherId,
    input: &VoucherInput,
    voucher_number: &str,
    totals: VoucherTotals,
) -> vouchers::ActiveModel {
    vouchers::ActiveModel {
        id: Set(voucher_id.into_inner()),
        tenant_id: Set(tenant_id.into_inner()),
        fiscal_period_id: Set(input.fiscal_period_id.into_inner()),
        branch_id: Set(input.branch_id.into_inner()),
        voucher_type: Set(input.voucher_type.into()),
        voucher_number: Set(voucher_number.to_string()),
        voucher_date: Set(input.date),
        description: Set(input.description.trim().to_string()),
        total_debit: Set(totals.debit),
        total_credit: Set(totals.credit),
        sequence_number: Set(None),
        locked: Set(false),
        source_module: Set(input.source.as_ref().map(|s| s.module.clone())),
        source_record_id: Set(input.source.as_ref().map(|s| s.record_id)),
        ..Default::default()
    }
}

async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    voucher_id: VoucherId,
    input: &VoucherInput,
) -> Result<(), DbErr> {
    let models = input.lines.iter().enumerate().map(|(index, line)| voucher_lines::ActiveModel {
        id: Set(VoucherLineId::new().into_inner()),
        tenant_id: Set(tenant_id.into_inner()),
        voucher_id: Set(voucher_id.into_inner()),
        line_no: Set(i32::try_from(index + 1).unwrap_or(i32::MAX)),
        account_id: Set(line.account_id.into_inner()),
        debit: Set(line.debit),
        credit: Set(line.credit),
        description: Set(line.description.clone()),
        document_kind: Set(line.document.kind.map(Into::into)),
        document_number: Set(line.document.number.clone()),
        document_date: Set(line.document.date),
        settlement_method: Set(line.document.settlement.map(Into::into)),
    });
    voucher_lines::Entity::insert_many(models).exec(conn).await?;
    Ok(())
}

async fn fetch_with_lines<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    voucher_id: VoucherId,
) -> Result<VoucherWithLines, RepositoryError> {
    let header = vouchers::Entity::find_by_id(voucher_id.into_inner())
        .filter(vouchers::Column::TenantId.eq(tenant_id.into_inner()))
        .one(conn)
        .await?
        .ok_or(LedgerError::VoucherNotFound(voucher_id))?;
    let lines = voucher_lines::Entity::find()
        .filter(voucher_lines::Column::VoucherId.eq(voucher_id.into_inner()))
        .order_by_asc(voucher_lines::Column::LineNo)
        .all(conn)
        .await?;

    Ok(VoucherWithLines {
        voucher: header.into(),
        lines: lines.into_iter().map(VoucherLine::from).collect(),
    })
}

fn duplicate_number_or(err: DbErr, voucher_number: &str, voucher_type: VoucherType) -> RepositoryError {
    if is_unique_violation(&err) {
        LedgerError::DuplicateVoucherNumber {
            voucher_number: voucher_number.to_string(),
            voucher_type: voucher_type.to_string(),
        }
        .into()
    } else {
        err.into()
    }
}
