//! Fixed-width text rendering of journal book pages.
//!
//! Every rendered page has exactly the line count the paginator budgeted:
//! two header lines, the blocks, and three footer lines.

use rust_decimal::Decimal;

use super::journal::{FOOTER_LINES, HEADER_LINES};
use super::types::{FooterKind, JournalPage, PageTotals, PostingRow, RowTier, Side, VoucherBlock};

const CODE_WIDTH: usize = 16;
const NAME_WIDTH: usize = 28;
const AMOUNT_WIDTH: usize = 15;
const MIN_DESCRIPTION_WIDTH: usize = 10;
const FIXED_WIDTH: usize = CODE_WIDTH + NAME_WIDTH + 3 * AMOUNT_WIDTH + 5;

/// Narrowest line the layout produces; smaller widths are widened to it.
pub const MIN_PAGE_WIDTH: usize = FIXED_WIDTH + MIN_DESCRIPTION_WIDTH;

/// Widest line the layout produces; larger widths are clamped to it.
pub const MAX_PAGE_WIDTH: usize = 400;

/// Separator between pages in a rendered book.
pub const PAGE_BREAK: char = '\u{c}';

/// Column widths for a given line width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    width: usize,
    description: usize,
}

impl Layout {
    /// Layout for lines `width` characters wide, clamped to
    /// `MIN_PAGE_WIDTH..=MAX_PAGE_WIDTH`.
    #[must_use]
    pub fn new(width: usize) -> Self {
        let width = width.clamp(MIN_PAGE_WIDTH, MAX_PAGE_WIDTH);
        let description = width - FIXED_WIDTH;
        Self { width, description }
    }

    /// Total line width.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    fn row(&self, code: &str, name: &str, description: &str, detail: &str, debit: &str, credit: &str) -> String {
        format!(
            "{} {} {} {} {} {}",
            fit(code, CODE_WIDTH),
            fit(name, NAME_WIDTH),
            fit(description, self.description),
            right(detail, AMOUNT_WIDTH),
            right(debit, AMOUNT_WIDTH),
            right(credit, AMOUNT_WIDTH),
        )
    }

    fn totals_row(&self, label: &str, totals: PageTotals) -> String {
        self.row("", label, "", "", &amount(totals.debit), &amount(totals.credit))
    }
}

/// Pads or truncates `text` to exactly `width` characters.
fn fit(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{truncated:<width$}")
}

fn right(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    format!("{truncated:>width$}")
}

fn amount(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

fn posting_row(layout: &Layout, row: &PostingRow) -> String {
    let code = match row.tier {
        RowTier::Leaf => format!("  {}", row.account_code),
        RowTier::GroupHeader | RowTier::Collapsed => row.account_code.clone(),
    };
    let detail = row.detail_amount.map(amount).unwrap_or_default();
    let main = row.main_amount.map(amount).unwrap_or_default();
    let (debit, credit) = match row.side {
        Side::Debit => (main, String::new()),
        Side::Credit => (String::new(), main),
    };
    layout.row(&code, &row.account_name, &row.description, &detail, &debit, &credit)
}

fn block_lines(layout: &Layout, block: &VoucherBlock) -> Vec<String> {
    let sequence = block
        .sequence_number
        .map_or_else(|| "------".to_string(), |n| format!("{n:06}"));
    let header = format!(
        "No: {sequence}  {}  {}  {}  {}",
        block.date.format("%d.%m.%Y"),
        block.voucher_type,
        block.voucher_number,
        block.description
    );

    let mut lines = Vec::with_capacity(block.line_count());
    lines.push(fit(&header, layout.width()));
    lines.extend(block.rows.iter().map(|row| posting_row(layout, row)));
    lines.push(layout.totals_row("Voucher total", block.totals));
    lines.push(String::new());
    lines
}

/// Renders one page as its lines.
#[must_use]
pub fn render_page(page: &JournalPage, width: usize) -> Vec<String> {
    let layout = Layout::new(width);
    let mut lines = Vec::with_capacity(HEADER_LINES + page.body_lines() + FOOTER_LINES);

    lines.push(layout.row("Code", "Account", "Description", "Detail", "Debit", "Credit"));
    lines.push(layout.totals_row("Brought forward", page.brought_forward));

    for block in &page.blocks {
        lines.extend(block_lines(&layout, block));
    }

    let label = match page.footer.kind {
        FooterKind::CarriedForward => "Carried forward",
        FooterKind::GrandTotal => "Grand total",
    };
    lines.push("-".repeat(layout.width()));
    lines.push(layout.totals_row(label, page.footer.totals));
    lines.push(format!("{:>width$}", format!("Page {}", page.page_number), width = layout.width()));
    lines
}

/// Renders a whole book, pages separated by form feeds.
#[must_use]
pub fn render_book(pages: &[JournalPage], width: usize) -> String {
    pages
        .iter()
        .map(|page| render_page(page, width).join("\n"))
        .collect::<Vec<_>>()
        .join(&format!("\n{PAGE_BREAK}"))
}
