//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Page too short to hold a header, a footer, and one body line.
    #[error("Page line limit {limit} is below the minimum of {minimum}")]
    PageTooShort {
        /// Requested limit.
        limit: usize,
        /// Smallest usable limit.
        minimum: usize,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::PageTooShort { .. } => "PAGE_TOO_SHORT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } | Self::PageTooShort { .. } => 400,
            Self::Database(_) => 500,
        }
    }
}

impl From<ReportError> for defter_shared::AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Database(msg) => Self::Database(msg),
            other => Self::Ledger {
                code: other.error_code(),
                status: other.http_status_code(),
                message: other.to_string(),
            },
        }
    }
}
