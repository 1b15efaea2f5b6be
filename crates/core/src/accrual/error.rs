//! Accrual error types.

use thiserror::Error;

/// Errors that can occur while computing accruals.
#[derive(Debug, Error)]
pub enum AccrualError {
    /// The month is not 1-12 or the year is out of range.
    #[error("Invalid accrual period {year}-{month}")]
    InvalidPeriod {
        /// Year.
        year: i32,
        /// Month.
        month: u32,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AccrualError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidPeriod { .. } => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
