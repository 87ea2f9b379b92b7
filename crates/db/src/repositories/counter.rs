//! Voucher number counters.
//!
//! One row per (tenant, voucher type, year). The row is created on first use
//! and then read `FOR UPDATE`, so two transactions numbering the same type in
//! the same year queue on the row lock instead of handing out one number twice.

use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ConnectionTrait, DbErr, EntityTrait, QuerySelect, Set,
    sea_query::OnConflict,
};

use defter_core::ledger::CounterKey;
use defter_shared::types::TenantId;

use crate::entities::{sea_orm_active_enums::VoucherType, voucher_counters};

/// Takes the next value of a counter inside the caller's transaction.
///
/// # Errors
///
/// Returns an error if the counter row cannot be created, locked, or updated.
pub async fn next_value<C: ConnectionTrait>(conn: &C, tenant_id: TenantId, key: CounterKey) -> Result<i64, DbErr> {
    let voucher_type: VoucherType = key.voucher_type.into();

    voucher_counters::Entity::insert(voucher_counters::ActiveModel {
        tenant_id: Set(tenant_id.into_inner()),
        voucher_type: Set(voucher_type),
        year: Set(key.year),
        last_value: Set(0),
    })
    .on_conflict(
        OnConflict::columns([
            voucher_counters::Column::TenantId,
            voucher_counters::Column::VoucherType,
            voucher_counters::Column::Year,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(conn)
    .await?;

    let counter = voucher_counters::Entity::find_by_id((tenant_id.into_inner(), voucher_type, key.year))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("voucher counter {voucher_type:?}/{}", key.year)))?;

    let next = counter.last_value + 1;
    voucher_counters::ActiveModel {
        tenant_id: Unchanged(counter.tenant_id),
        voucher_type: Unchanged(counter.voucher_type),
        year: Unchanged(counter.year),
        last_value: Set(next),
    }
    .update(conn)
    .await?;

    Ok(next)
}
