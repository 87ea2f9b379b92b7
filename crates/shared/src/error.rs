//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Tenant context missing or malformed.
    #[error("Tenant context required: {0}")]
    MissingTenant(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Ledger rule violation raised by the domain layer.
    ///
    /// Carries the domain's own stable code and status so callers can
    /// distinguish `PERIOD_LOCKED` from `UNBALANCED_VOUCHER` without parsing text.
    #[error("{message}")]
    Ledger {
        /// Stable machine-readable code.
        code: &'static str,
        /// HTTP status to report.
        status: u16,
        /// Human-readable message with full context.
        message: String,
    },

    /// Conflict (e.g., duplicate entry).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingTenant(_) | Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Ledger { status, .. } => *status,
            Self::Conflict(_) => 409,
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::MissingTenant(_) => "MISSING_TENANT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Ledger { code, .. } => *code,
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the message is safe to show to API callers.
    ///
    /// Database and internal failures are reported generically.
    #[must_use]
    pub const fn is_client_facing(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Config(_) | Self::Internal(_))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
