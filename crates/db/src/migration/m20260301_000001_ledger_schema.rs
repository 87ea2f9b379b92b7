//! Ledger schema migration.
//!
//! Creates the enum types, the five ledger tables, their indexes, and the
//! `updated_at` trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: FISCAL PERIODS
        // ============================================================
        db.execute_unprepared(FISCAL_PERIODS_SQL).await?;

        // ============================================================
        // PART 4: VOUCHERS
        // ============================================================
        db.execute_unprepared(VOUCHERS_SQL).await?;
        db.execute_unprepared(VOUCHER_LINES_SQL).await?;
        db.execute_unprepared(VOUCHER_COUNTERS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_classification AS ENUM ('MAIN', 'GROUP', 'SUB_LEDGER');

CREATE TYPE balance_nature AS ENUM ('DEBIT_ONLY', 'CREDIT_ONLY', 'BOTH');

CREATE TYPE special_role AS ENUM (
    'standard', 'cash', 'bank', 'cheque',
    'input_vat', 'output_vat', 'return_vat', 'withholding'
);

CREATE TYPE voucher_type AS ENUM (
    'OPENING', 'CASH_RECEIPT', 'CASH_PAYMENT', 'GENERAL', 'CLOSING'
);

CREATE TYPE document_kind AS ENUM ('invoice', 'check', 'receipt', 'note', 'other');

CREATE TYPE settlement_method AS ENUM ('cash', 'bank', 'check', 'note', 'card');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id                  UUID PRIMARY KEY,
    tenant_id           UUID NOT NULL,
    code                VARCHAR(64) NOT NULL,
    name                VARCHAR(255) NOT NULL,
    parent_id           UUID REFERENCES accounts(id) ON DELETE RESTRICT,
    depth               INTEGER NOT NULL CHECK (depth >= 1),
    classification      account_classification NOT NULL,
    balance_nature      balance_nature NOT NULL DEFAULT 'BOTH',
    special_role        special_role NOT NULL DEFAULT 'standard',
    debit_total         NUMERIC(18, 2) NOT NULL DEFAULT 0,
    credit_total        NUMERIC(18, 2) NOT NULL DEFAULT 0,
    is_active           BOOLEAN NOT NULL DEFAULT true,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_accounts_tenant_code UNIQUE (tenant_id, code),
    CONSTRAINT chk_accounts_not_own_parent CHECK (parent_id IS DISTINCT FROM id)
);

CREATE INDEX idx_accounts_tenant ON accounts(tenant_id);
CREATE INDEX idx_accounts_parent ON accounts(parent_id);
";

const FISCAL_PERIODS_SQL: &str = r"
CREATE TABLE fiscal_periods (
    id                      UUID PRIMARY KEY,
    tenant_id               UUID NOT NULL,
    name                    VARCHAR(100) NOT NULL,
    start_date              DATE NOT NULL,
    end_date                DATE NOT NULL,
    is_active               BOOLEAN NOT NULL DEFAULT true,
    lock_date               DATE,
    last_sequence_number    BIGINT NOT NULL DEFAULT 0 CHECK (last_sequence_number >= 0),
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_fiscal_periods_range CHECK (start_date < end_date)
);

CREATE INDEX idx_fiscal_periods_tenant_dates ON fiscal_periods(tenant_id, start_date, end_date);
";

const VOUCHERS_SQL: &str = r"
CREATE TABLE vouchers (
    id                  UUID PRIMARY KEY,
    tenant_id           UUID NOT NULL,
    fiscal_period_id    UUID NOT NULL REFERENCES fiscal_periods(id) ON DELETE RESTRICT,
    branch_id           UUID NOT NULL,
    voucher_type        voucher_type NOT NULL,
    voucher_number      VARCHAR(50) NOT NULL,
    voucher_date        DATE NOT NULL,
    description         TEXT NOT NULL DEFAULT '',
    total_debit         NUMERIC(18, 2) NOT NULL DEFAULT 0,
    total_credit        NUMERIC(18, 2) NOT NULL DEFAULT 0,
    sequence_number     BIGINT,
    locked              BOOLEAN NOT NULL DEFAULT false,
    source_module       VARCHAR(50),
    source_record_id    UUID,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_vouchers_number UNIQUE (tenant_id, fiscal_period_id, voucher_type, voucher_number),
    CONSTRAINT uq_vouchers_sequence UNIQUE (fiscal_period_id, sequence_number),
    CONSTRAINT chk_vouchers_locked_sequence CHECK (locked = (sequence_number IS NOT NULL))
);

CREATE INDEX idx_vouchers_period_date ON vouchers(fiscal_period_id, voucher_date);
CREATE INDEX idx_vouchers_tenant_date ON vouchers(tenant_id, voucher_date);
CREATE INDEX idx_vouchers_source ON vouchers(tenant_id, source_module, source_record_id)
    WHERE source_module IS NOT NULL;
";

const VOUCHER_LINES_SQL: &str = r"
CREATE TABLE voucher_lines (
    id                  UUID PRIMARY KEY,
    tenant_id           UUID NOT NULL,
    voucher_id          UUID NOT NULL REFERENCES vouchers(id) ON DELETE CASCADE,
    line_no             INTEGER NOT NULL CHECK (line_no >= 1),
    account_id          UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    debit               NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit              NUMERIC(18, 2) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    description         TEXT NOT NULL DEFAULT '',
    document_kind       document_kind,
    document_number     VARCHAR(50),
    document_date       DATE,
    settlement_method   settlement_method,

    CONSTRAINT uq_voucher_lines_position UNIQUE (voucher_id, line_no),
    CONSTRAINT chk_voucher_lines_one_side CHECK ((debit = 0) <> (credit = 0))
);

CREATE INDEX idx_voucher_lines_account ON voucher_lines(account_id);
";

const VOUCHER_COUNTERS_SQL: &str = r"
CREATE TABLE voucher_counters (
    tenant_id           UUID NOT NULL,
    voucher_type        voucher_type NOT NULL,
    year                INTEGER NOT NULL,
    last_value          BIGINT NOT NULL DEFAULT 0,

    PRIMARY KEY (tenant_id, voucher_type, year)
);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_accounts_updated_at
    BEFORE UPDATE ON accounts
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_fiscal_periods_updated_at
    BEFORE UPDATE ON fiscal_periods
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_vouchers_updated_at
    BEFORE UPDATE ON vouchers
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- ============================================================

DROP TABLE IF EXISTS voucher_counters CASCADE;
DROP TABLE IF EXISTS voucher_lines CASCADE;
DROP TABLE IF EXISTS vouchers CASCADE;
DROP TABLE IF EXISTS fiscal_periods CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

DROP FUNCTION IF EXISTS set_updated_at() CASCADE;

DROP TYPE IF EXISTS settlement_method;
DROP TYPE IF EXISTS document_kind;
DROP TYPE IF EXISTS voucher_type;
DROP TYPE IF EXISTS special_role;
DROP TYPE IF EXISTS balance_nature;
DROP TYPE IF EXISTS account_classification;
";
