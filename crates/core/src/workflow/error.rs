//! Workflow error types for the leave request lifecycle.

use thiserror::Error;

use leaveledger_shared::types::EmployeeId;

use crate::workflow::types::RequestStatus;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: RequestStatus,
        /// The attempted target status.
        to: RequestStatus,
    },

    /// A lower level has not been decided yet.
    #[error("Level {level} cannot be decided before level {pending_level}")]
    OutOfOrder {
        /// The level the caller tried to decide.
        level: i32,
        /// The lowest level still pending.
        pending_level: i32,
    },

    /// The request has no approval row at this level.
    #[error("Approval level {0} not found")]
    LevelNotFound(i32),

    /// The caller is not the approver assigned to this level.
    #[error("User {approver_id} is not the approver for level {level}")]
    NotApprover {
        /// The user who attempted the decision.
        approver_id: EmployeeId,
        /// The level.
        level: i32,
    },

    /// The level was already decided.
    #[error("Approval level {0} has already been decided")]
    AlreadyDecided(i32),

    /// The caller may not cancel this request.
    #[error("User {0} may not cancel this request")]
    NotAllowedToCancel(EmployeeId),

    /// No eligible approver could be found.
    #[error("No eligible approver found")]
    NoApprover,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl WorkflowError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } | Self::OutOfOrder { .. } => 400,
            Self::NotApprover { .. } | Self::NotAllowedToCancel(_) => 403,
            Self::LevelNotFound(_) => 404,
            Self::AlreadyDecided(_) => 409,
            Self::NoApprover => 422,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } | Self::OutOfOrder { .. } => "INVALID_TRANSITION",
            Self::LevelNotFound(_) => "NOT_FOUND",
            Self::NotApprover { .. } | Self::NotAllowedToCancel(_) => "UNAUTHORIZED",
            Self::AlreadyDecided(_) => "ALREADY_DECIDED",
            Self::NoApprover => "NO_APPROVER",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
