//! Row-level security for tenant isolation.
//!
//! Every ledger table is filtered on `app.current_tenant_id`, which
//! `TenantTransaction` sets with `SET LOCAL`. `FORCE` makes the policies
//! apply to the table owner as well.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(RLS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_RLS_SQL).await?;
        Ok(())
    }
}

const RLS_SQL: &str = r"
ALTER TABLE accounts ENABLE ROW LEVEL SECURITY;
ALTER TABLE fiscal_periods ENABLE ROW LEVEL SECURITY;
ALTER TABLE vouchers ENABLE ROW LEVEL SECURITY;
ALTER TABLE voucher_lines ENABLE ROW LEVEL SECURITY;
ALTER TABLE voucher_counters ENABLE ROW LEVEL SECURITY;

ALTER TABLE accounts FORCE ROW LEVEL SECURITY;
ALTER TABLE fiscal_periods FORCE ROW LEVEL SECURITY;
ALTER TABLE vouchers FORCE ROW LEVEL SECURITY;
ALTER TABLE voucher_lines FORCE ROW LEVEL SECURITY;
ALTER TABLE voucher_counters FORCE ROW LEVEL SECURITY;

CREATE POLICY tenant_isolation ON accounts
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);

CREATE POLICY tenant_isolation ON fiscal_periods
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);

CREATE POLICY tenant_isolation ON vouchers
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);

CREATE POLICY tenant_isolation ON voucher_lines
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);

CREATE POLICY tenant_isolation ON voucher_counters
    USING (tenant_id = current_setting('app.current_tenant_id', true)::UUID);
";

const DROP_RLS_SQL: &str = r"
DROP POLICY IF EXISTS tenant_isolation ON voucher_counters;
DROP POLICY IF EXISTS tenant_isolation ON voucher_lines;
DROP POLICY IF EXISTS tenant_isolation ON vouchers;
DROP POLICY IF EXISTS tenant_isolation ON fiscal_periods;
DROP POLICY IF EXISTS tenant_isolation ON accounts;

ALTER TABLE voucher_counters DISABLE ROW LEVEL SECURITY;
ALTER TABLE voucher_lines DISABLE ROW LEVEL SECURITY;
ALTER TABLE vouchers DISABLE ROW LEVEL SECURITY;
ALTER TABLE fiscal_periods DISABLE ROW LEVEL SECURITY;
ALTER TABLE accounts DISABLE ROW LEVEL SECURITY;
";
