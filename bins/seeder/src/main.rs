//! Database seeder for Defter development and testing.
//!
//! Seeds a demo tenant with a small chart of accounts, a fiscal period for
//! the current year, a handful of vouchers, and finalizes January so the
//! journal book has printed pages.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use defter_core::chart::{Account, BalanceNature, Classification, NewAccount, SpecialRole};
use defter_core::fiscal::NewFiscalPeriod;
use defter_core::ledger::{
    DocumentKind, DocumentMetadata, SettlementMethod, VoucherInput, VoucherLineInput, VoucherType,
};
use defter_db::{AccountRepository, FiscalRepository, VoucherRepository};
use defter_shared::LedgerConfig;
use defter_shared::types::{BranchId, TenantId};

/// Demo tenant ID (consistent for all seeds)
const DEMO_TENANT_ID: &str = "00000000-0000-0000-0000-00000000d0c5";
/// Demo branch ID
const DEMO_BRANCH_ID: &str = "00000000-0000-0000-0000-00000000b4a1";

/// Chart rows: code, name, parent code, classification, nature, role.
const CHART: &[(&str, &str, Option<&str>, Classification, BalanceNature, SpecialRole)] = &[
    ("100", "Cash", None, Classification::Main, BalanceNature::DebitOnly, SpecialRole::Standard),
    ("100.01", "Head office till", Some("100"), Classification::SubLedger, BalanceNature::DebitOnly, SpecialRole::Cash),
    ("102", "Banks", None, Classification::Main, BalanceNature::Both, SpecialRole::Standard),
    ("102.01", "Current account", Some("102"), Classification::SubLedger, BalanceNature::Both, SpecialRole::Bank),
    ("120", "Trade receivables", None, Classification::Main, BalanceNature::Both, SpecialRole::Standard),
    ("120.01", "Domestic customers", Some("120"), Classification::Group, BalanceNature::Both, SpecialRole::Standard),
    ("120.01.001", "Anadolu Textiles", Some("120.01"), Classification::SubLedger, BalanceNature::Both, SpecialRole::Standard),
    ("120.01.002", "Ege Foods", Some("120.01"), Classification::SubLedger, BalanceNature::Both, SpecialRole::Standard),
    ("191", "Deductible VAT", None, Classification::Main, BalanceNature::DebitOnly, SpecialRole::Standard),
    ("191.01", "Input VAT 20%", Some("191"), Classification::SubLedger, BalanceNature::DebitOnly, SpecialRole::InputVat),
    ("320", "Trade payables", None, Classification::Main, BalanceNature::Both, SpecialRole::Standard),
    ("320.01", "Office supplier", Some("320"), Classification::SubLedger, BalanceNature::Both, SpecialRole::Standard),
    ("391", "Calculated VAT", None, Classification::Main, BalanceNature::CreditOnly, SpecialRole::Standard),
    ("391.01", "Output VAT 20%", Some("391"), Classification::SubLedger, BalanceNature::CreditOnly, SpecialRole::OutputVat),
    ("600", "Domestic sales", None, Classification::Main, BalanceNature::CreditOnly, SpecialRole::Standard),
    ("600.01", "Goods sales", Some("600"), Classification::SubLedger, BalanceNature::CreditOnly, SpecialRole::Standard),
    ("770", "General administrative expenses", None, Classification::Main, BalanceNature::DebitOnly, SpecialRole::Standard),
    ("770.01", "Office expenses", Some("770"), Classification::SubLedger, BalanceNature::DebitOnly, SpecialRole::Standard),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = defter_db::connect(&database_url).await?;
    let tenant_id: TenantId = DEMO_TENANT_ID.parse()?;

    let accounts = AccountRepository::new(db.clone());
    if !accounts.list(tenant_id).await?.is_empty() {
        println!("Demo tenant {tenant_id} already seeded, skipping...");
        return Ok(());
    }

    println!("Seeding chart of accounts...");
    let chart = seed_chart(&accounts, tenant_id).await?;

    println!("Seeding fiscal period...");
    let year = Utc::now().year();
    let period = FiscalRepository::new(db.clone())
        .create_period(
            tenant_id,
            NewFiscalPeriod {
                name: format!("FY {year}"),
                start_date: day(year, 1, 1)?,
                end_date: day(year, 12, 31)?,
            },
        )
        .await?;

    println!("Seeding vouchers...");
    let count = seed_vouchers(&db, tenant_id, period.id, &chart, year).await?;
    println!("  Created {count} vouchers");

    println!("Finalizing January...");
    let summary = FiscalRepository::new(db.clone())
        .finalize(tenant_id, period.id, day(year, 1, 31)?)
        .await?;
    println!(
        "  Locked {} vouchers, sequence {}..={}",
        summary.finalized_count,
        summary.first_sequence_number.unwrap_or_default(),
        summary.last_sequence_number
    );

    println!("Seeding complete! Tenant: {tenant_id}");
    Ok(())
}

fn day(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).with_context(|| format!("invalid date {year}-{month}-{day}"))
}

/// Creates the chart rows in order, resolving parent codes as it goes.
async fn seed_chart(repo: &AccountRepository, tenant_id: TenantId) -> anyhow::Result<Vec<Account>> {
    let mut created: Vec<Account> = Vec::with_capacity(CHART.len());
    for &(code, name, parent, classification, balance_nature, special_role) in CHART {
        let parent_id = match parent {
            Some(parent_code) => Some(
                created
                    .iter()
                    .find(|a| a.code.as_str() == parent_code)
                    .map(|a| a.id)
                    .with_context(|| format!("parent {parent_code} of {code} not seeded"))?,
            ),
            None => None,
        };
        let account = repo
            .create(
                tenant_id,
                NewAccount {
                    code: code.to_string(),
                    name: name.to_string(),
                    parent_id,
                    classification,
                    balance_nature,
                    special_role,
                },
            )
            .await?;
        println!("  {}", account.display_name());
        created.push(account);
    }
    Ok(created)
}

fn account<'a>(chart: &'a [Account], code: &str) -> anyhow::Result<&'a Account> {
    chart
        .iter()
        .find(|a| a.code.as_str() == code)
        .with_context(|| format!("account {code} not seeded"))
}

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn invoice(number: &str, date: NaiveDate) -> DocumentMetadata {
    DocumentMetadata {
        kind: Some(DocumentKind::Invoice),
        number: Some(number.to_string()),
        date: Some(date),
        settlement: None,
    }
}

fn receipt(number: &str, date: NaiveDate, settlement: SettlementMethod) -> DocumentMetadata {
    DocumentMetadata {
        kind: Some(DocumentKind::Receipt),
        number: Some(number.to_string()),
        date: Some(date),
        settlement: Some(settlement),
    }
}

fn debit(account: &Account, amount: Decimal, description: &str, document: DocumentMetadata) -> VoucherLineInput {
    VoucherLineInput {
        account_id: account.id,
        debit: amount,
        credit: Decimal::ZERO,
        description: description.to_string(),
        document,
    }
}

fn credit(account: &Account, amount: Decimal, description: &str, document: DocumentMetadata) -> VoucherLineInput {
    VoucherLineInput {
        account_id: account.id,
        debit: Decimal::ZERO,
        credit: amount,
        description: description.to_string(),
        document,
    }
}

/// Posts a sales cycle for two customers plus an office expense, spread
/// over January and February.
async fn seed_vouchers(
    db: &DatabaseConnection,
    tenant_id: TenantId,
    period_id: defter_shared::types::FiscalPeriodId,
    chart: &[Account],
    year: i32,
) -> anyhow::Result<usize> {
    let repo = VoucherRepository::new(db.clone(), LedgerConfig::default().voucher_number_digits);
    let branch_id: BranchId = DEMO_BRANCH_ID.parse()?;

    let till = account(chart, "100.01")?;
    let bank = account(chart, "102.01")?;
    let anadolu = account(chart, "120.01.001")?;
    let ege = account(chart, "120.01.002")?;
    let input_vat = account(chart, "191.01")?;
    let supplier = account(chart, "320.01")?;
    let output_vat = account(chart, "391.01")?;
    let sales = account(chart, "600.01")?;
    let office = account(chart, "770.01")?;

    let mut vouchers = Vec::new();

    for (month, dd, customer, net, number) in [
        (1, 5, anadolu, 1_000_000, "INV-2001"),
        (1, 12, ege, 450_000, "INV-2002"),
        (2, 3, anadolu, 275_050, "INV-2003"),
    ] {
        let date = day(year, month, dd)?;
        let net = money(net);
        let vat = (net * Decimal::new(20, 2)).round_dp(2);
        let doc = invoice(number, date);
        vouchers.push(VoucherInput {
            fiscal_period_id: period_id,
            branch_id,
            voucher_type: VoucherType::General,
            voucher_number: None,
            date,
            description: format!("Sales invoice {number}"),
            source: Some(defter_core::ledger::SourceRef {
                module: "invoicing".to_string(),
                record_id: Uuid::now_v7(),
            }),
            lines: vec![
                debit(customer, net + vat, "Invoice total", doc.clone()),
                credit(sales, net, "Goods sold", doc.clone()),
                credit(output_vat, vat, "VAT 20%", doc),
            ],
        });
    }

    let collected = day(year, 1, 10)?;
    vouchers.push(VoucherInput {
        fiscal_period_id: period_id,
        branch_id,
        voucher_type: VoucherType::CashReceipt,
        voucher_number: None,
        date: collected,
        description: "Collection from Anadolu Textiles".to_string(),
        source: None,
        lines: vec![
            debit(till, money(200_000), "Cash collected", receipt("R-1", collected, SettlementMethod::Cash)),
            debit(bank, money(1_000_000), "Transfer received", receipt("R-1", collected, SettlementMethod::Bank)),
            credit(anadolu, money(1_200_000), "Invoice INV-2001", invoice("INV-2001", day(year, 1, 5)?)),
        ],
    });

    let bought = day(year, 1, 20)?;
    let doc = invoice("SUP-88", bought);
    vouchers.push(VoucherInput {
        fiscal_period_id: period_id,
        branch_id,
        voucher_type: VoucherType::General,
        voucher_number: None,
        date: bought,
        description: "Office supplies".to_string(),
        source: None,
        lines: vec![
            debit(office, money(50_000), "Paper and toner", doc.clone()),
            debit(input_vat, money(10_000), "VAT 20%", doc.clone()),
            credit(supplier, money(60_000), "Supplier invoice", doc),
        ],
    });

    let paid = day(year, 2, 15)?;
    vouchers.push(VoucherInput {
        fiscal_period_id: period_id,
        branch_id,
        voucher_type: VoucherType::CashPayment,
        voucher_number: None,
        date: paid,
        description: "Supplier payment".to_string(),
        source: None,
        lines: vec![
            debit(supplier, money(60_000), "Invoice SUP-88", invoice("SUP-88", bought)),
            credit(till, money(60_000), "Paid in cash", receipt("P-1", paid, SettlementMethod::Cash)),
        ],
    });

    let count = vouchers.len();
    for input in vouchers {
        let created = repo.create(tenant_id, input).await?;
        println!(
            "  {} {} {}",
            created.voucher.date, created.voucher.voucher_number, created.voucher.description
        );
    }
    Ok(count)
}
