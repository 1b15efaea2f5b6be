//! Storage error type.

use leaveledger_core::ledger::LedgerError;
use leaveledger_core::validation::ValidationIssue;
use leaveledger_core::workflow::WorkflowError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned by the repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A ledger rule rejected the change (insufficient balance, conflict).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A workflow rule rejected the change.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Row not found.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Table or aggregate name.
        entity: &'static str,
        /// Missing id.
        id: Uuid,
    },

    /// Re-validation inside the transaction failed.
    #[error("Request rejected: {}", .0.iter().map(|i| i.message.as_str()).collect::<Vec<_>>().join("; "))]
    Rejected(Vec<ValidationIssue>),

    /// A stored value could not be mapped back to the domain.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl StoreError {
    /// Shorthand for [`StoreError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// True for optimistic-lock exhaustion, the only failure worth retrying.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Ledger(LedgerError::Conflict { .. }))
    }
}
