//! Fiscal period repository: period administration and finalization.
//!
//! Finalization locks the period row `FOR UPDATE` for the whole run. Voucher
//! writes hold a shared lock on the same row, so a finalize call waits for
//! in-flight writes and blocks new ones until it commits.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, sea_query::Expr,
};
use tracing::{info, warn};

use defter_core::fiscal::{
    FinalizationCandidate, FinalizationSummary, FiscalPeriod, NewFiscalPeriod, plan_finalization,
    validate_new_period,
};
use defter_core::ledger::LedgerError;
use defter_shared::types::{FiscalPeriodId, TenantId, VoucherId};

use super::error::RepositoryError;
use crate::entities::{fiscal_periods, vouchers};
use crate::rls::TenantTransaction;

/// Fiscal period repository.
#[derive(Debug, Clone)]
pub struct FiscalRepository {
    db: DatabaseConnection,
}

impl FiscalRepository {
    /// Creates a new fiscal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an open fiscal period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPeriodRange` or `OverlappingPeriod`.
    pub async fn create_period(
        &self,
        tenant_id: TenantId,
        input: NewFiscalPeriod,
    ) -> Result<FiscalPeriod, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let txn = scope.transaction();

        // Locked so two overlapping creates cannot both pass the check.
        let existing = periods_of(txn, tenant_id, true).await?;
        validate_new_period(&input, &existing)?;

        let model = fiscal_periods::ActiveModel {
            id: Set(FiscalPeriodId::new().into_inner()),
            tenant_id: Set(tenant_id.into_inner()),
            name: Set(input.name.trim().to_string()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            is_active: Set(true),
            lock_date: Set(None),
            last_sequence_number: Set(0),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        scope.commit().await?;
        info!(tenant_id = %tenant_id, period_id = %model.id, start = %model.start_date, end = %model.end_date, "Fiscal period created");
        Ok(model.into())
    }

    /// Lists the tenant's periods by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_periods(&self, tenant_id: TenantId) -> Result<Vec<FiscalPeriod>, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let periods = periods_of(scope.transaction(), tenant_id, false).await?;
        scope.commit().await?;
        Ok(periods)
    }

    /// Gets one period.
    ///
    /// # Errors
    ///
    /// Returns `FiscalPeriodNotFound` if it does not exist for the tenant.
    pub async fn get_period(
        &self,
        tenant_id: TenantId,
        period_id: FiscalPeriodId,
    ) -> Result<FiscalPeriod, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let model = fiscal_periods::Entity::find_by_id(period_id.into_inner())
            .filter(fiscal_periods::Column::TenantId.eq(tenant_id.into_inner()))
            .one(scope.transaction())
            .await?
            .ok_or(LedgerError::FiscalPeriodNotFound(period_id))?;
        scope.commit().await?;
        Ok(model.into())
    }

    /// Opens or closes a period for new vouchers.
    ///
    /// # Errors
    ///
    /// Returns `FiscalPeriodNotFound` if it does not exist for the tenant.
    pub async fn set_active(
        &self,
        tenant_id: TenantId,
        period_id: FiscalPeriodId,
        is_active: bool,
    ) -> Result<FiscalPeriod, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let txn = scope.transaction();
        lock_period(txn, tenant_id, period_id).await?;

        let model = fiscal_periods::ActiveModel {
            id: Unchanged(period_id.into_inner()),
            is_active: Set(is_active),
            ..Default::default()
        }
        .update(txn)
        .await?;

        scope.commit().await?;
        info!(tenant_id = %tenant_id, period_id = %period_id, is_active, "Fiscal period activation changed");
        Ok(model.into())
    }

    /// Finalizes a period up to `cutoff`.
    ///
    /// Every unlocked voucher dated on or before the cutoff gets the next
    /// statutory sequence number in canonical order and is locked; the
    /// period's lock date and last sequence number move forward. All of it
    /// commits together or not at all.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyFinalized`, `CutoffOutsidePeriod`,
    /// `NothingToFinalize`, or `InconsistentLockState`.
    pub async fn finalize(
        &self,
        tenant_id: TenantId,
        period_id: FiscalPeriodId,
        cutoff: NaiveDate,
    ) -> Result<FinalizationSummary, RepositoryError> {
        let scope = TenantTransaction::begin(&self.db, tenant_id).await?;
        let txn = scope.transaction();

        let period = lock_period(txn, tenant_id, period_id).await?;
        let candidates: Vec<FinalizationCandidate> = vouchers::Entity::find()
            .filter(vouchers::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(vouchers::Column::FiscalPeriodId.eq(period_id.into_inner()))
            .filter(vouchers::Column::VoucherDate.lte(cutoff))
            .lock_exclusive()
            .all(txn)
            .await?
            .into_iter()
            .map(|v| FinalizationCandidate {
                id: VoucherId::from_uuid(v.id),
                date: v.voucher_date,
                voucher_type: v.voucher_type.into(),
                voucher_number: v.voucher_number,
                locked: v.locked,
            })
            .collect();

        let plan = plan_finalization(&period, cutoff, &candidates)?;

        for assignment in &plan.assignments {
            let result = vouchers::Entity::update_many()
                .col_expr(vouchers::Column::SequenceNumber, Expr::value(assignment.sequence_number))
                .col_expr(vouchers::Column::Locked, Expr::value(true))
                .filter(vouchers::Column::Id.eq(assignment.voucher_id.into_inner()))
                .filter(vouchers::Column::Locked.eq(false))
                .exec(txn)
                .await?;
            if result.rows_affected != 1 {
                warn!(tenant_id = %tenant_id, voucher_id = %assignment.voucher_id, "Voucher changed lock state during finalization");
                return Err(LedgerError::InconsistentLockState {
                    voucher_id: assignment.voucher_id,
                }
                .into());
            }
        }

        fiscal_periods::ActiveModel {
            id: Unchanged(period_id.into_inner()),
            lock_date: Set(Some(plan.lock_date)),
            last_sequence_number: Set(plan.last_sequence_number),
            ..Default::default()
        }
        .update(txn)
        .await?;

        scope.commit().await?;

        let summary = plan.summary();
        info!(
            tenant_id = %tenant_id,
            period_id = %period_id,
            cutoff = %cutoff,
            finalized = summary.finalized_count,
            last_sequence_number = summary.last_sequence_number,
            "Fiscal period finalized"
        );
        Ok(summary)
    }
}

async fn periods_of<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    for_update: bool,
) -> Result<Vec<FiscalPeriod>, RepositoryError> {
    let mut query = fiscal_periods::Entity::find()
        .filter(fiscal_periods::Column::TenantId.eq(tenant_id.into_inner()))
        .order_by_asc(fiscal_periods::Column::StartDate);
    if for_update {
        query = query.lock_exclusive();
    }
    let models = query.all(conn).await?;
    Ok(models.into_iter().map(FiscalPeriod::from).collect())
}

async fn lock_period<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    period_id: FiscalPeriodId,
) -> Result<FiscalPeriod, RepositoryError> {
    let model = fiscal_periods::Entity::find_by_id(period_id.into_inner())
        .filter(fiscal_periods::Column::TenantId.eq(tenant_id.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(LedgerError::FiscalPeriodNotFound(period_id))?;
    Ok(model.into())
}
