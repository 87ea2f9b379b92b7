//! Repository error type.
//!
//! Wraps the domain errors raised by `defter-core` and the store's own
//! failures. Any error aborts the surrounding tenant transaction.

use sea_orm::{DbErr, SqlErr};

use defter_core::chart::ChartError;
use defter_core::ledger::LedgerError;
use defter_core::reports::ReportError;
use defter_shared::AppError;

/// Error returned by every repository operation.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Chart of accounts rule violation.
    #[error(transparent)]
    Chart(#[from] ChartError),

    /// Voucher, balance, or finalization rule violation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Report request rejected.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepositoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Chart(e) => e.error_code(),
            Self::Ledger(e) => e.error_code(),
            Self::Report(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Chart(e) => e.http_status_code(),
            Self::Ledger(e) => e.http_status_code(),
            Self::Report(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Chart(e) => e.into(),
            RepositoryError::Ledger(e) => e.into(),
            RepositoryError::Report(e) => e.into(),
            RepositoryError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// True if the error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_codes_pass_through() {
        let err: RepositoryError = ChartError::DuplicateCode("100".into()).into();
        assert_eq!(err.error_code(), "DUPLICATE_ACCOUNT_CODE");
        assert_eq!(err.http_status_code(), 409);

        let app: AppError = err.into();
        assert_eq!(app.status_code(), 409);
    }

    #[test]
    fn test_database_error_is_internal() {
        let err: RepositoryError = DbErr::Custom("connection reset".into()).into();
        assert_eq!(err.http_status_code(), 500);
        assert!(!is_unique_violation(&DbErr::Custom("x".into())));
        let app: AppError = err.into();
        assert_eq!(app.error_code(), "DATABASE_ERROR");
    }
}
