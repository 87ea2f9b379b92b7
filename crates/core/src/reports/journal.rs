//! Journal book generation.
//!
//! Turns vouchers into fixed-height pages. Each voucher becomes a block of
//! rows: its debit lines, then its credit lines, each side grouped by
//! top-level account. A top-level group with one line prints as a single
//! collapsed row; a larger group prints a total row followed by its lines.
//!
//! Pages carry a running total. A page's footer carries it forward and the
//! next page repeats it as brought-forward; the last page prints the grand
//! total instead. A block is never split across pages.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{
    FooterKind, JournalBookRequest, JournalEntry, JournalLine, JournalPage, PageFooter, PageTotals,
    PostingRow, RowTier, Side, VoucherBlock,
};
use crate::fiscal::sort_canonically;

/// Lines at the top of every page: column header and brought-forward row.
pub const HEADER_LINES: usize = 2;

/// Lines reserved at the bottom of every page for the footer.
pub const FOOTER_LINES: usize = 3;

/// Smallest page that fits a header, a footer, and one body line.
pub const MIN_PAGE_LINES: usize = HEADER_LINES + FOOTER_LINES + 1;

/// Printed for a top-level code with no account in the chart.
pub const UNDEFINED_ACCOUNT: &str = "UNDEFINED ACCOUNT";

/// Journal book generator.
pub struct JournalBookGenerator;

impl JournalBookGenerator {
    /// Generates the journal book pages for a date range.
    ///
    /// `entries` may arrive in any order and may include vouchers outside the
    /// request; they are filtered by date and scope and put into canonical
    /// order here. `top_level_names` maps top-level account codes to names.
    ///
    /// An empty selection yields no pages.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `PageTooShort`.
    pub fn generate(
        entries: Vec<JournalEntry>,
        top_level_names: &HashMap<String, String>,
        request: &JournalBookRequest,
    ) -> Result<Vec<JournalPage>, ReportError> {
        if request.start > request.end {
            return Err(ReportError::InvalidDateRange {
                start: request.start,
                end: request.end,
            });
        }

        let mut selected: Vec<JournalEntry> = entries
            .into_iter()
            .filter(|e| e.date >= request.start && e.date <= request.end)
            .filter(|e| request.scope.includes(e.locked))
            .collect();
        sort_canonically(&mut selected, JournalEntry::canonical_key);

        let blocks = selected
            .iter()
            .map(|entry| Self::build_block(entry, top_level_names))
            .collect();

        paginate(blocks, request.page_line_limit)
    }

    /// Builds the printable block of one voucher.
    #[must_use]
    pub fn build_block(entry: &JournalEntry, top_level_names: &HashMap<String, String>) -> VoucherBlock {
        let debit_lines: Vec<&JournalLine> = entry.lines.iter().filter(|l| l.debit > Decimal::ZERO).collect();
        let credit_lines: Vec<&JournalLine> = entry.lines.iter().filter(|l| l.credit > Decimal::ZERO).collect();

        let mut rows = build_side(debit_lines, Side::Debit, top_level_names);
        rows.extend(build_side(credit_lines, Side::Credit, top_level_names));

        VoucherBlock {
            voucher_id: entry.voucher_id,
            sequence_number: entry.sequence_number,
            date: entry.date,
            voucher_type: entry.voucher_type,
            voucher_number: entry.voucher_number.clone(),
            description: entry.description.clone(),
            rows,
            totals: entry.totals(),
        }
    }
}

fn side_amount(line: &JournalLine, side: Side) -> Decimal {
    match side {
        Side::Debit => line.debit,
        Side::Credit => line.credit,
    }
}

/// Rows for one side of a voucher, grouped by top-level account.
fn build_side(mut lines: Vec<&JournalLine>, side: Side, top_level_names: &HashMap<String, String>) -> Vec<PostingRow> {
    // Stable: lines on the same account keep their entry order.
    lines.sort_by(|a, b| a.account_code.cmp(&b.account_code));

    let mut rows = Vec::with_capacity(lines.len() + 2);
    let mut rest = lines.as_slice();
    while let Some(first) = rest.first() {
        let top = first.account_code.top_level();
        let group_len = rest
            .iter()
            .take_while(|l| l.account_code.top_level() == top)
            .count();
        let (group, tail) = rest.split_at(group_len);
        rest = tail;

        let top_name = top_level_names
            .get(top)
            .map_or(UNDEFINED_ACCOUNT, String::as_str)
            .to_string();

        if let [only] = group {
            rows.push(PostingRow {
                tier: RowTier::Collapsed,
                side,
                account_code: top.to_string(),
                account_name: top_name,
                description: only.description.clone(),
                detail_amount: None,
                main_amount: Some(side_amount(only, side)),
            });
            continue;
        }

        let group_total: Decimal = group.iter().map(|l| side_amount(l, side)).sum();
        rows.push(PostingRow {
            tier: RowTier::GroupHeader,
            side,
            account_code: top.to_string(),
            account_name: top_name,
            description: String::new(),
            detail_amount: None,
            main_amount: Some(group_total),
        });
        rows.extend(group.iter().map(|line| PostingRow {
            tier: RowTier::Leaf,
            side,
            account_code: line.account_code.to_string(),
            account_name: line.account_name.clone(),
            description: line.description.clone(),
            detail_amount: Some(side_amount(line, side)),
            main_amount: None,
        }));
    }
    rows
}

/// Lays blocks out on pages of at most `page_line_limit` lines.
///
/// A block that does not fit in the space left closes the page. A block
/// taller than an empty page gets a page of its own, flagged `overflow`.
///
/// # Errors
///
/// Returns `PageTooShort` if the limit cannot hold a header, a footer, and
/// one body line.
pub fn paginate(blocks: Vec<VoucherBlock>, page_line_limit: usize) -> Result<Vec<JournalPage>, ReportError> {
    if page_line_limit < MIN_PAGE_LINES {
        return Err(ReportError::PageTooShort {
            limit: page_line_limit,
            minimum: MIN_PAGE_LINES,
        });
    }
    let capacity = page_line_limit - HEADER_LINES - FOOTER_LINES;

    let mut pages: Vec<JournalPage> = Vec::new();
    let mut running = PageTotals::default();
    let mut current: Vec<VoucherBlock> = Vec::new();
    let mut used = 0usize;

    for block in blocks {
        let needed = block.line_count();
        if used > 0 && used + needed > capacity {
            close_page(&mut pages, &mut running, std::mem::take(&mut current), capacity);
            used = 0;
        }
        used += needed;
        current.push(block);
    }
    if !current.is_empty() {
        close_page(&mut pages, &mut running, current, capacity);
    }

    if let Some(last) = pages.last_mut() {
        last.footer.kind = FooterKind::GrandTotal;
    }
    Ok(pages)
}

fn close_page(pages: &mut Vec<JournalPage>, running: &mut PageTotals, blocks: Vec<VoucherBlock>, capacity: usize) {
    let brought_forward = *running;
    let mut page_totals = PageTotals::default();
    for block in &blocks {
        page_totals.add(block.totals);
    }
    running.add(page_totals);

    let body: usize = blocks.iter().map(VoucherBlock::line_count).sum();
    let page_number = u32::try_from(pages.len() + 1).unwrap_or(u32::MAX);

    pages.push(JournalPage {
        page_number,
        brought_forward,
        overflow: body > capacity,
        blocks,
        page_totals,
        footer: PageFooter {
            kind: FooterKind::CarriedForward,
            totals: *running,
        },
    });
}
