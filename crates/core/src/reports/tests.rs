//! Scenario tests for the report generators.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use defter_shared::types::VoucherId;

use super::journal::{FOOTER_LINES, HEADER_LINES, JournalBookGenerator, paginate};
use super::render::{MAX_PAGE_WIDTH, MIN_PAGE_WIDTH, PAGE_BREAK, render_book, render_page};
use super::service::ReportService;
use super::types::{
    ExportLine, FooterKind, JournalBookRequest, JournalEntry, JournalLine, ReportScope, RowTier, Side,
};
use super::{ReportError, UNDEFINED_ACCOUNT};
use crate::chart::{AccountCode, BalanceNature, ChartOfAccounts, Classification, NewAccount, SpecialRole};
use crate::ledger::{DocumentKind, DocumentMetadata, SettlementMethod, VoucherType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn line(code: &str, debit: Decimal, credit: Decimal) -> JournalLine {
    JournalLine {
        account_code: AccountCode::parse(code).unwrap(),
        account_name: format!("Name {code}"),
        description: format!("Line {code}"),
        debit,
        credit,
    }
}

fn entry(d: NaiveDate, voucher_type: VoucherType, number: &str, lines: Vec<JournalLine>) -> JournalEntry {
    JournalEntry {
        voucher_id: VoucherId::new(),
        sequence_number: None,
        voucher_type,
        voucher_number: number.to_string(),
        date: d,
        description: format!("Voucher {number}"),
        locked: true,
        lines,
    }
}

/// A two-line voucher: 5 printed lines.
fn small(d: NaiveDate, number: &str, amount: Decimal) -> JournalEntry {
    entry(
        d,
        VoucherType::General,
        number,
        vec![line("100.01", amount, dec!(0)), line("600.01", dec!(0), amount)],
    )
}

fn names() -> HashMap<String, String> {
    [("100", "Cash"), ("120", "Receivables"), ("600", "Sales")]
        .into_iter()
        .map(|(c, n)| (c.to_string(), n.to_string()))
        .collect()
}

fn request(limit: usize) -> JournalBookRequest {
    JournalBookRequest {
        start: date(2025, 1, 1),
        end: date(2025, 12, 31),
        scope: ReportScope::FinalizedOnly,
        page_line_limit: limit,
    }
}

// ============================================================================
// Hierarchy collapsing
// ============================================================================

#[test]
fn test_group_header_and_collapsed_rows() {
    let voucher = entry(
        date(2025, 1, 10),
        VoucherType::General,
        "M-000001",
        vec![
            line("120.02", dec!(300), dec!(0)),
            line("600.01", dec!(0), dec!(1000)),
            line("120.01", dec!(500), dec!(0)),
            line("100.01", dec!(200), dec!(0)),
        ],
    );
    let block = JournalBookGenerator::build_block(&voucher, &names());

    let summary: Vec<(RowTier, Side, &str, Option<Decimal>, Option<Decimal>)> = block
        .rows
        .iter()
        .map(|r| (r.tier, r.side, r.account_code.as_str(), r.main_amount, r.detail_amount))
        .collect();
    assert_eq!(
        summary,
        vec![
            (RowTier::Collapsed, Side::Debit, "100", Some(dec!(200)), None),
            (RowTier::GroupHeader, Side::Debit, "120", Some(dec!(800)), None),
            (RowTier::Leaf, Side::Debit, "120.01", None, Some(dec!(500))),
            (RowTier::Leaf, Side::Debit, "120.02", None, Some(dec!(300))),
            (RowTier::Collapsed, Side::Credit, "600", Some(dec!(1000)), None),
        ]
    );
    assert_eq!(block.rows[0].account_name, "Cash");
    assert_eq!(block.rows[0].description, "Line 100.01");
    assert_eq!(block.rows[1].account_name, "Receivables");
    assert_eq!(block.rows[2].account_name, "Name 120.01");
    assert_eq!(block.totals.debit, dec!(1000));
    assert_eq!(block.line_count(), 8);
}

#[test]
fn test_deep_codes_still_two_tiers() {
    let voucher = entry(
        date(2025, 1, 10),
        VoucherType::General,
        "M-1",
        vec![
            line("120.01.001", dec!(10), dec!(0)),
            line("120.02.003.9", dec!(15), dec!(0)),
            line("600.01", dec!(0), dec!(25)),
        ],
    );
    let block = JournalBookGenerator::build_block(&voucher, &names());
    let tiers: Vec<RowTier> = block.rows.iter().map(|r| r.tier).collect();
    assert_eq!(
        tiers,
        vec![RowTier::GroupHeader, RowTier::Leaf, RowTier::Leaf, RowTier::Collapsed]
    );
}

#[test]
fn test_missing_top_level_name() {
    let voucher = entry(
        date(2025, 1, 10),
        VoucherType::General,
        "M-1",
        vec![line("999.01", dec!(5), dec!(0)), line("600.01", dec!(0), dec!(5))],
    );
    let block = JournalBookGenerator::build_block(&voucher, &names());
    assert_eq!(block.rows[0].account_name, UNDEFINED_ACCOUNT);
}

// ============================================================================
// Ordering and selection
// ============================================================================

#[test]
fn test_canonical_order_regardless_of_input_order() {
    let general = entry(
        date(2025, 1, 5),
        VoucherType::General,
        "M-1",
        vec![line("100.01", dec!(1), dec!(0)), line("600.01", dec!(0), dec!(1))],
    );
    let receipt = entry(
        date(2025, 1, 3),
        VoucherType::CashReceipt,
        "T-1",
        vec![line("100.01", dec!(2), dec!(0)), line("600.01", dec!(0), dec!(2))],
    );
    let pages =
        JournalBookGenerator::generate(vec![general.clone(), receipt.clone()], &names(), &request(40)).unwrap();
    let ids: Vec<VoucherId> = pages.iter().flat_map(|p| p.blocks.iter().map(|b| b.voucher_id)).collect();
    assert_eq!(ids, vec![receipt.voucher_id, general.voucher_id]);
}

#[test]
fn test_scope_and_range_filter() {
    let mut draft = small(date(2025, 2, 1), "M-2", dec!(10));
    draft.locked = false;
    let finalized = small(date(2025, 1, 15), "M-1", dec!(20));
    let outside = small(date(2026, 1, 1), "M-3", dec!(30));
    let entries = vec![draft.clone(), finalized.clone(), outside];

    let pages = JournalBookGenerator::generate(entries.clone(), &names(), &request(40)).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].blocks.len(), 1);
    assert_eq!(pages[0].blocks[0].voucher_id, finalized.voucher_id);

    let mut with_drafts = request(40);
    with_drafts.scope = ReportScope::IncludeDrafts;
    let pages = JournalBookGenerator::generate(entries, &names(), &with_drafts).unwrap();
    assert_eq!(pages[0].blocks.len(), 2);
}

#[test]
fn test_empty_range_yields_no_pages() {
    let pages = JournalBookGenerator::generate(vec![], &names(), &request(40)).unwrap();
    assert!(pages.is_empty());
}

#[test]
fn test_invalid_requests() {
    let mut backwards = request(40);
    backwards.start = date(2025, 12, 31);
    backwards.end = date(2025, 1, 1);
    assert!(matches!(
        JournalBookGenerator::generate(vec![], &names(), &backwards),
        Err(ReportError::InvalidDateRange { .. })
    ));
    assert!(matches!(
        JournalBookGenerator::generate(vec![], &names(), &request(5)),
        Err(ReportError::PageTooShort { limit: 5, minimum: 6 })
    ));
}

// ============================================================================
// Pagination
// ============================================================================

#[test]
fn test_carry_forward_across_pages() {
    // Capacity 20 - 5 = 15 body lines: three 5-line vouchers per page.
    let entries: Vec<JournalEntry> = (1..=7)
        .map(|i| small(date(2025, 1, i), &format!("M-{i}"), Decimal::from(i * 100)))
        .collect();
    let pages = JournalBookGenerator::generate(entries, &names(), &request(20)).unwrap();

    assert_eq!(pages.len(), 3);
    assert_eq!(pages.iter().map(|p| p.blocks.len()).collect::<Vec<_>>(), vec![3, 3, 1]);

    assert_eq!(pages[0].brought_forward.debit, dec!(0));
    assert_eq!(pages[0].footer.kind, FooterKind::CarriedForward);
    assert_eq!(pages[0].footer.totals.debit, dec!(600));
    assert_eq!(pages[1].brought_forward, pages[0].footer.totals);
    assert_eq!(pages[1].footer.totals.debit, dec!(2100));
    assert_eq!(pages[2].brought_forward, pages[1].footer.totals);
    assert_eq!(pages[2].footer.kind, FooterKind::GrandTotal);
    assert_eq!(pages[2].footer.totals.debit, dec!(2800));
    assert_eq!(pages[2].footer.totals.credit, dec!(2800));
    assert!(pages[2].is_last());
    assert_eq!(pages.iter().map(|p| p.page_number).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn test_block_that_does_not_fit_moves_to_next_page() {
    // Capacity 12: 5 + 5 fit, a third 5-line block does not.
    let entries: Vec<JournalEntry> = (1..=3)
        .map(|i| small(date(2025, 1, i), &format!("M-{i}"), dec!(1)))
        .collect();
    let pages = JournalBookGenerator::generate(entries, &names(), &request(17)).unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].body_lines(), 10);
    assert_eq!(pages[1].blocks.len(), 1);
}

#[test]
fn test_oversized_voucher_gets_own_page() {
    let mut lines: Vec<JournalLine> = (1..=10)
        .map(|i| line(&format!("120.{i:02}"), dec!(10), dec!(0)))
        .collect();
    lines.push(line("600.01", dec!(0), dec!(100)));
    let big = entry(date(2025, 1, 2), VoucherType::General, "M-2", lines);
    let before = small(date(2025, 1, 1), "M-1", dec!(5));
    let after = small(date(2025, 1, 3), "M-3", dec!(5));

    // Capacity 10; the big block needs 12 + 3 = 15.
    let pages = JournalBookGenerator::generate(vec![after, big, before], &names(), &request(15)).unwrap();
    assert_eq!(pages.len(), 3);
    assert!(!pages[0].overflow);
    assert!(pages[1].overflow);
    assert_eq!(pages[1].blocks.len(), 1);
    assert!(!pages[2].overflow);
    assert_eq!(pages[2].footer.totals.debit, dec!(110));
}

#[test]
fn test_paginate_rejects_tiny_pages() {
    assert!(paginate(vec![], HEADER_LINES + FOOTER_LINES).is_err());
    assert!(paginate(vec![], HEADER_LINES + FOOTER_LINES + 1).unwrap().is_empty());
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_rendered_pages_respect_line_limit() {
    let entries: Vec<JournalEntry> = (1..=9)
        .map(|i| small(date(2025, 1, i), &format!("M-{i}"), dec!(12.5)))
        .collect();
    let pages = JournalBookGenerator::generate(entries, &names(), &request(20)).unwrap();
    for page in &pages {
        let lines = render_page(page, 120);
        assert!(lines.len() <= 20);
        assert_eq!(lines.len(), HEADER_LINES + page.body_lines() + FOOTER_LINES);
    }

    let book = render_book(&pages, 120);
    assert_eq!(book.matches(PAGE_BREAK).count(), pages.len() - 1);
    assert!(book.contains("Carried forward"));
    assert!(book.contains("Brought forward"));
    assert!(book.contains("Grand total"));
    assert!(book.contains("112.50"));
}

#[test]
fn test_rendered_width_is_clamped() {
    let pages = JournalBookGenerator::generate(vec![small(date(2025, 1, 1), "M-1", dec!(3))], &names(), &request(40)).unwrap();

    let wide = render_book(&pages, usize::MAX);
    assert!(wide.lines().all(|l| l.trim_start_matches(PAGE_BREAK).chars().count() <= MAX_PAGE_WIDTH));
    assert!(wide.lines().any(|l| l.chars().count() == MAX_PAGE_WIDTH));

    let narrow = render_page(&pages[0], 0);
    assert!(narrow.iter().all(|l| l.chars().count() <= MIN_PAGE_WIDTH));
}

#[test]
fn test_rendered_unfinalized_voucher_has_no_sequence() {
    let mut draft = small(date(2025, 1, 1), "M-1", dec!(1));
    draft.locked = false;
    let mut with_drafts = request(40);
    with_drafts.scope = ReportScope::IncludeDrafts;
    let pages = JournalBookGenerator::generate(vec![draft], &names(), &with_drafts).unwrap();
    let lines = render_page(&pages[0], 120);
    assert!(lines[2].starts_with("No: ------"));
}

// ============================================================================
// Trial balance
// ============================================================================

fn new_account(code: &str, parent: Option<defter_shared::types::AccountId>, class: Classification) -> NewAccount {
    NewAccount {
        code: code.to_string(),
        name: format!("Account {code}"),
        parent_id: parent,
        classification: class,
        balance_nature: BalanceNature::Both,
        special_role: SpecialRole::Standard,
    }
}

#[test]
fn test_trial_balance_rolls_up() {
    let mut chart = ChartOfAccounts::new();
    let main = chart.create(new_account("120", None, Classification::Main)).unwrap();
    let mut a = chart.create(new_account("120.01", Some(main.id), Classification::SubLedger)).unwrap();
    let mut b = chart.create(new_account("120.02", Some(main.id), Classification::SubLedger)).unwrap();
    let sales = chart.create(new_account("600", None, Classification::Main)).unwrap();
    let mut s = chart.create(new_account("600.01", Some(sales.id), Classification::SubLedger)).unwrap();

    a.debit_total = dec!(500);
    b.debit_total = dec!(300);
    b.credit_total = dec!(50);
    s.credit_total = dec!(750);
    let accounts: Vec<_> = chart
        .iter()
        .cloned()
        .map(|acc| match acc.code.as_str() {
            "120.01" => a.clone(),
            "120.02" => b.clone(),
            "600.01" => s.clone(),
            _ => acc,
        })
        .collect();
    let chart = ChartOfAccounts::from_accounts(accounts).unwrap();

    let report = ReportService::generate_trial_balance(&chart, None);
    let row_120 = report.rows.iter().find(|r| r.code == "120").unwrap();
    assert_eq!(row_120.total_debit, dec!(800));
    assert_eq!(row_120.total_credit, dec!(50));
    assert_eq!(row_120.debit_balance, dec!(750));
    assert_eq!(row_120.credit_balance, dec!(0));
    let row_600 = report.rows.iter().find(|r| r.code == "600").unwrap();
    assert_eq!(row_600.credit_balance, dec!(750));

    assert_eq!(report.totals.total_debit, dec!(800));
    assert_eq!(report.totals.total_credit, dec!(800));
    assert!(report.totals.is_balanced);

    let top_only = ReportService::generate_trial_balance(&chart, Some(1));
    assert_eq!(top_only.rows.len(), 2);
    assert_eq!(top_only.totals, report.totals);
}

// ============================================================================
// Export readiness
// ============================================================================

#[test]
fn test_export_readiness() {
    let complete = DocumentMetadata {
        kind: Some(DocumentKind::Receipt),
        number: Some("R-1".to_string()),
        date: Some(date(2025, 1, 3)),
        settlement: None,
    };
    let export_line = |role: SpecialRole, document: DocumentMetadata, line_no: u32| ExportLine {
        voucher_id: VoucherId::new(),
        voucher_number: "T-000001".to_string(),
        date: date(2025, 1, 3),
        line_no,
        account_code: "100.01".to_string(),
        special_role: role,
        document,
    };

    let lines = vec![
        export_line(SpecialRole::Standard, complete.clone(), 1),
        export_line(SpecialRole::Cash, complete.clone(), 2),
        export_line(
            SpecialRole::Bank,
            DocumentMetadata {
                settlement: Some(SettlementMethod::Bank),
                ..complete
            },
            3,
        ),
        export_line(SpecialRole::Standard, DocumentMetadata::default(), 4),
    ];
    let readiness = ReportService::check_export_readiness(&lines);
    assert_eq!(readiness.checked_lines, 4);
    assert!(!readiness.is_ready());
    assert_eq!(readiness.issues.len(), 2);
    assert_eq!(readiness.issues[0].line_no, 2);
    assert_eq!(readiness.issues[0].missing, vec!["settlement_method"]);
    assert_eq!(readiness.issues[1].missing.len(), 3);
}
