//! Ledger report generation.
//!
//! This module provides pure business logic for generating reports:
//! - Journal book (paginated, with carried-forward totals)
//! - Fixed-width text rendering
//! - Trial balance rolled up the account hierarchy
//! - Statutory export readiness

pub mod error;
pub mod journal;
pub mod render;
pub mod service;
pub mod types;

#[cfg(test)]
mod journal_props;
#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use journal::{JournalBookGenerator, UNDEFINED_ACCOUNT, paginate};
pub use render::{MAX_PAGE_WIDTH, MIN_PAGE_WIDTH, render_book, render_page};
pub use service::ReportService;
pub use types::*;
