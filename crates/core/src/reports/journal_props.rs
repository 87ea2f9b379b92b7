//! Property-based tests for journal book pagination.

use std::collections::HashMap;

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use defter_shared::types::VoucherId;

use super::journal::{FOOTER_LINES, HEADER_LINES, JournalBookGenerator};
use super::render::render_page;
use super::types::{FooterKind, JournalBookRequest, JournalEntry, JournalLine, PageTotals, ReportScope};
use crate::chart::AccountCode;
use crate::ledger::VoucherType;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// A balanced voucher: `debit_lines` debits spread over a few top-level
/// accounts against one credit line.
fn arb_entry() -> impl Strategy<Value = JournalEntry> {
    (
        0u64..60,
        0usize..VoucherType::ALL.len(),
        1u32..500,
        prop::collection::vec((0u8..3, 1u8..20, 1i64..100_000), 1..8),
        any::<bool>(),
    )
        .prop_map(|(day, type_idx, number, debits, locked)| {
            let mut lines: Vec<JournalLine> = debits
                .iter()
                .map(|(top, sub, cents)| JournalLine {
                    account_code: AccountCode::parse(&format!("{}.{sub:02}", 100 + u32::from(*top) * 10)).unwrap(),
                    account_name: "Leaf".to_string(),
                    description: String::new(),
                    debit: Decimal::new(*cents, 2),
                    credit: Decimal::ZERO,
                })
                .collect();
            let total: Decimal = lines.iter().map(|l| l.debit).sum();
            lines.push(JournalLine {
                account_code: AccountCode::parse("600.01").unwrap(),
                account_name: "Sales".to_string(),
                description: String::new(),
                debit: Decimal::ZERO,
                credit: total,
            });
            JournalEntry {
                voucher_id: VoucherId::new(),
                sequence_number: None,
                voucher_type: VoucherType::ALL[type_idx],
                voucher_number: format!("N-{number}"),
                date: base_date() + Days::new(day),
                description: "Generated".to_string(),
                locked,
                lines,
            }
        })
}

fn request(limit: usize, scope: ReportScope) -> JournalBookRequest {
    JournalBookRequest {
        start: base_date() + Days::new(5),
        end: base_date() + Days::new(50),
        scope,
        page_line_limit: limit,
    }
}

fn scope_strategy() -> impl Strategy<Value = ReportScope> {
    prop_oneof![Just(ReportScope::FinalizedOnly), Just(ReportScope::IncludeDrafts)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Pages hold exactly the selected vouchers, in canonical order, each once.
    #[test]
    fn prop_pages_preserve_canonical_sequence(
        entries in prop::collection::vec(arb_entry(), 0..40),
        limit in 6usize..60,
        scope in scope_strategy(),
    ) {
        let req = request(limit, scope);
        let pages = JournalBookGenerator::generate(entries.clone(), &HashMap::new(), &req).unwrap();

        let mut expected: Vec<JournalEntry> = entries
            .into_iter()
            .filter(|e| e.date >= req.start && e.date <= req.end && scope.includes(e.locked))
            .collect();
        expected.sort_by_cached_key(JournalEntry::canonical_key);

        let printed: Vec<VoucherId> = pages.iter().flat_map(|p| p.blocks.iter().map(|b| b.voucher_id)).collect();
        let wanted: Vec<VoucherId> = expected.iter().map(|e| e.voucher_id).collect();
        prop_assert_eq!(printed, wanted);
    }

    /// Every page fits its limit unless it holds a single oversized voucher.
    #[test]
    fn prop_pages_respect_limit(
        entries in prop::collection::vec(arb_entry(), 1..40),
        limit in 6usize..40,
    ) {
        let req = request(limit, ReportScope::IncludeDrafts);
        let pages = JournalBookGenerator::generate(entries, &HashMap::new(), &req).unwrap();
        let capacity = limit - HEADER_LINES - FOOTER_LINES;

        for page in &pages {
            prop_assert!(!page.blocks.is_empty());
            if page.overflow {
                prop_assert_eq!(page.blocks.len(), 1);
                prop_assert!(page.body_lines() > capacity);
            } else {
                prop_assert!(page.body_lines() <= capacity);
                prop_assert!(render_page(page, 120).len() <= limit);
            }
        }
    }

    /// Brought-forward equals the previous footer; the last footer is the grand total.
    #[test]
    fn prop_carry_forward_chain(
        entries in prop::collection::vec(arb_entry(), 1..40),
        limit in 6usize..30,
    ) {
        let req = request(limit, ReportScope::IncludeDrafts);
        let pages = JournalBookGenerator::generate(entries, &HashMap::new(), &req).unwrap();

        let mut running = PageTotals::default();
        let mut grand = PageTotals::default();
        for (i, page) in pages.iter().enumerate() {
            prop_assert_eq!(page.brought_forward, running);
            for block in &page.blocks {
                grand.add(block.totals);
            }
            running.add(page.page_totals);
            prop_assert_eq!(page.footer.totals, running);

            let expected_kind = if i + 1 == pages.len() {
                FooterKind::GrandTotal
            } else {
                FooterKind::CarriedForward
            };
            prop_assert_eq!(page.footer.kind, expected_kind);
        }
        if let Some(last) = pages.last() {
            prop_assert_eq!(last.footer.totals, grand);
            prop_assert_eq!(last.footer.totals.debit, last.footer.totals.credit);
        }
    }
}
