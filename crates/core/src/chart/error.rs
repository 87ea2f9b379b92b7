//! Chart of accounts errors.

use defter_shared::types::AccountId;
use thiserror::Error;

/// Errors raised while maintaining the chart of accounts.
#[derive(Debug, Error)]
pub enum ChartError {
    // ========== Code Errors ==========
    /// The account code is malformed.
    #[error("Invalid account code '{code}': {reason}")]
    InvalidCode {
        /// The rejected code.
        code: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Another account of the tenant already uses this code.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Account name is blank.
    #[error("Account name cannot be empty")]
    EmptyName,

    // ========== Hierarchy Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// No account of the tenant has this code.
    #[error("Account not found: code '{0}'")]
    CodeNotFound(String),

    /// Parent account not found.
    #[error("Parent account not found: {0}")]
    ParentNotFound(AccountId),

    /// Sub-ledger accounts are leaves and cannot have children.
    #[error("Account '{parent_code}' is a sub-ledger account and cannot have children")]
    ParentIsSubLedger {
        /// Code of the rejected parent.
        parent_code: String,
    },

    /// Reparenting would make the account its own ancestor.
    #[error("Moving account '{account_code}' under '{parent_code}' would create a cycle")]
    CycleDetected {
        /// Code of the account being moved.
        account_code: String,
        /// Code of the requested parent.
        parent_code: String,
    },

    // ========== Deletion / Reclassification Errors ==========
    /// Account still has child accounts.
    #[error("Account '{code}' has {children} child account(s)")]
    HasChildren {
        /// Code of the account.
        code: String,
        /// Number of direct children.
        children: usize,
    },

    /// Account is referenced by voucher lines.
    #[error("Account '{code}' has {lines} posted voucher line(s)")]
    HasPostedLines {
        /// Code of the account.
        code: String,
        /// Number of voucher lines referencing it.
        lines: u64,
    },

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ChartError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCode { .. } => "INVALID_ACCOUNT_CODE",
            Self::DuplicateCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::EmptyName => "EMPTY_ACCOUNT_NAME",
            Self::AccountNotFound(_) | Self::CodeNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::ParentIsSubLedger { .. } => "PARENT_IS_SUB_LEDGER",
            Self::CycleDetected { .. } => "ACCOUNT_CYCLE",
            Self::HasChildren { .. } => "HAS_CHILDREN",
            Self::HasPostedLines { .. } => "HAS_POSTED_LINES",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidCode { .. } | Self::EmptyName | Self::ParentNotFound(_) => 400,
            Self::AccountNotFound(_) | Self::CodeNotFound(_) => 404,
            Self::DuplicateCode(_) => 409,
            Self::ParentIsSubLedger { .. }
            | Self::CycleDetected { .. }
            | Self::HasChildren { .. }
            | Self::HasPostedLines { .. } => 422,
            Self::Database(_) => 500,
        }
    }
}

impl From<ChartError> for defter_shared::AppError {
    fn from(err: ChartError) -> Self {
        match err {
            ChartError::Database(msg) => Self::Database(msg),
            other => Self::Ledger {
                code: other.error_code(),
                status: other.http_status_code(),
                message: other.to_string(),
            },
        }
    }
}
