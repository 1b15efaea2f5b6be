//! Ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::leave::LeaveType;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Amount must be strictly positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Amount is not a multiple of half a day.
    #[error("Amount {0} is not a multiple of half a day")]
    NotHalfDayMultiple(Decimal),

    /// Debit would drive `available` below zero.
    #[error("Insufficient {leave_type} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// The ledger the debit targeted.
        leave_type: LeaveType,
        /// Requested amount.
        requested: Decimal,
        /// Available amount at the time of the check.
        available: Decimal,
    },

    /// Reversal larger than what was used.
    #[error("Cannot reverse {requested}: only {used} used")]
    ReversalExceedsUsed {
        /// Requested reversal.
        requested: Decimal,
        /// Amount currently used.
        used: Decimal,
    },

    /// The balance row kept changing underneath the write.
    #[error("Balance changed concurrently after {attempts} attempts")]
    Conflict {
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::NotHalfDayMultiple(_) => "NOT_HALF_DAY_MULTIPLE",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::ReversalExceedsUsed { .. } => "REVERSAL_EXCEEDS_USED",
            Self::Conflict { .. } => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NonPositiveAmount(_)
            | Self::NotHalfDayMultiple(_)
            | Self::ReversalExceedsUsed { .. } => 400,
            Self::InsufficientBalance { .. } => 422,
            Self::Conflict { .. } => 409,
            Self::Database(_) => 500,
        }
    }
}
