//! Shared setup for database integration tests.
//!
//! Tests run against `DATABASE_URL` and return early when it is unset.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

use defter_core::chart::{Account, BalanceNature, Classification, NewAccount, SpecialRole};
use defter_core::fiscal::{FiscalPeriod, NewFiscalPeriod};
use defter_core::ledger::{DocumentMetadata, VoucherInput, VoucherLineInput, VoucherType};
use defter_db::migration::{Migrator, MigratorTrait};
use defter_db::{AccountRepository, FiscalRepository};
use defter_shared::types::{AccountId, BranchId, TenantId};

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connects and applies migrations once per test binary.
pub async fn connect() -> Option<DatabaseConnection> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };
    let db = defter_db::connect(&url).await.expect("Failed to connect to database");
    MIGRATED
        .get_or_init(|| async {
            Migrator::up(&db, None).await.expect("Failed to run migrations");
        })
        .await;
    Some(db)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A fresh tenant with a small chart and an active 2025 period.
pub struct Books {
    pub tenant: TenantId,
    pub branch: BranchId,
    pub period: FiscalPeriod,
    pub cash: Account,
    pub bank: Account,
    pub receivable_a: Account,
    pub receivable_b: Account,
    pub sales: Account,
    pub receivables_group: Account,
}

pub async fn add_account(
    repo: &AccountRepository,
    tenant: TenantId,
    code: &str,
    name: &str,
    parent: Option<AccountId>,
    classification: Classification,
    special_role: SpecialRole,
) -> Account {
    repo.create(
        tenant,
        NewAccount {
            code: code.to_string(),
            name: name.to_string(),
            parent_id: parent,
            classification,
            balance_nature: BalanceNature::Both,
            special_role,
        },
    )
    .await
    .unwrap()
}

pub async fn open_books(db: &DatabaseConnection) -> Books {
    let tenant = TenantId::new();
    let repo = AccountRepository::new(db.clone());

    let cash_main = add_account(&repo, tenant, "100", "Cash", None, Classification::Main, SpecialRole::Standard).await;
    let cash = add_account(
        &repo,
        tenant,
        "100.01",
        "Main till",
        Some(cash_main.id),
        Classification::SubLedger,
        SpecialRole::Cash,
    )
    .await;
    let bank_main = add_account(&repo, tenant, "102", "Banks", None, Classification::Main, SpecialRole::Standard).await;
    let bank = add_account(
        &repo,
        tenant,
        "102.01",
        "Current account",
        Some(bank_main.id),
        Classification::SubLedger,
        SpecialRole::Bank,
    )
    .await;
    let receivables_group = add_account(
        &repo,
        tenant,
        "120",
        "Receivables",
        None,
        Classification::Main,
        SpecialRole::Standard,
    )
    .await;
    let receivable_a = add_account(
        &repo,
        tenant,
        "120.01",
        "Customer A",
        Some(receivables_group.id),
        Classification::SubLedger,
        SpecialRole::Standard,
    )
    .await;
    let receivable_b = add_account(
        &repo,
        tenant,
        "120.02",
        "Customer B",
        Some(receivables_group.id),
        Classification::SubLedger,
        SpecialRole::Standard,
    )
    .await;
    let sales_main = add_account(
        &repo,
        tenant,
        "600",
        "Domestic sales",
        None,
        Classification::Main,
        SpecialRole::Standard,
    )
    .await;
    let sales = add_account(
        &repo,
        tenant,
        "600.01",
        "Goods",
        Some(sales_main.id),
        Classification::SubLedger,
        SpecialRole::Standard,
    )
    .await;

    let period = FiscalRepository::new(db.clone())
        .create_period(
            tenant,
            NewFiscalPeriod {
                name: "2025".to_string(),
                start_date: date(2025, 1, 1),
                end_date: date(2025, 12, 31),
            },
        )
        .await
        .unwrap();

    Books {
        tenant,
        branch: BranchId::new(),
        period,
        cash,
        bank,
        receivable_a,
        receivable_b,
        sales,
        receivables_group,
    }
}

pub fn line(account: &Account, debit: Decimal, credit: Decimal) -> VoucherLineInput {
    VoucherLineInput {
        account_id: account.id,
        debit,
        credit,
        description: format!("{} posting", account.code),
        document: DocumentMetadata::default(),
    }
}

pub fn voucher(books: &Books, voucher_type: VoucherType, on: NaiveDate, lines: Vec<VoucherLineInput>) -> VoucherInput {
    VoucherInput {
        fiscal_period_id: books.period.id,
        branch_id: books.branch,
        voucher_type,
        voucher_number: None,
        date: on,
        description: format!("{voucher_type} on {on}"),
        source: None,
        lines,
    }
}
