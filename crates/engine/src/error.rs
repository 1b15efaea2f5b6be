//! Engine error type.
//!
//! Repository and domain errors are folded into one taxonomy here so
//! callers match on what went wrong, not on which layer noticed.

use rust_decimal::Decimal;
use thiserror::Error;

use leaveledger_core::leave::LeaveType;
use leaveledger_core::ledger::LedgerError;
use leaveledger_core::ports::CollaboratorError;
use leaveledger_core::validation::{IssueCategory, IssueKind, ValidationIssue};
use leaveledger_core::workflow::WorkflowError;
use leaveledger_db::StoreError;
use leaveledger_shared::AppError;

/// Errors returned by [`crate::LeaveEngine`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// User-correctable input problems, all of them at once.
    #[error("Validation failed: {}", describe(.issues))]
    ValidationFailed {
        /// Every issue found.
        issues: Vec<ValidationIssue>,
    },

    /// A debit would drive `available` below zero.
    #[error("Insufficient {leave_type} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Ledger.
        leave_type: LeaveType,
        /// Requested amount.
        requested: Decimal,
        /// Available at the time of the check.
        available: Decimal,
    },

    /// The claim overlaps an existing one.
    #[error("Overlap: {0}")]
    Overlap(String),

    /// State-machine misuse.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// The approval level was already decided.
    #[error("Approval level {level} has already been decided")]
    AlreadyDecided {
        /// Level.
        level: i32,
    },

    /// Unknown request, employee, level or work log.
    #[error("{entity} {key} not found")]
    NotFound {
        /// What was looked up.
        entity: &'static str,
        /// Lookup key.
        key: String,
    },

    /// The caller may not act on this resource.
    #[error("Not permitted: {0}")]
    Unauthorized(String),

    /// Concurrent modification; safe to retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Eligibility or ledger policy rule.
    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Directory, calendar or notification failure.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

fn describe(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl EngineError {
    /// Shorthand for [`EngineError::NotFound`].
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// A single-issue validation failure.
    pub fn invalid(kind: IssueKind, field: &str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            issues: vec![ValidationIssue::new(kind, field, message)],
        }
    }

    /// True only for concurrency conflicts.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Returns the HTTP-equivalent status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ValidationFailed { .. } => 400,
            Self::Unauthorized(_) => 403,
            Self::NotFound { .. } => 404,
            Self::Overlap(_) | Self::AlreadyDecided { .. } | Self::Conflict(_) => 409,
            Self::InsufficientBalance { .. }
            | Self::InvalidTransition(_)
            | Self::PolicyViolation(_) => 422,
            Self::Database(_) | Self::Collaborator(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::Overlap(_) => "OVERLAP",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::AlreadyDecided { .. } => "ALREADY_DECIDED",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Conflict(_) => "CONFLICT",
            Self::PolicyViolation(_) => "POLICY_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Collaborator(_) => "COLLABORATOR_ERROR",
        }
    }

    /// True if a validation failure carries an issue of `kind`.
    #[must_use]
    pub fn has_issue(&self, kind: IssueKind) -> bool {
        matches!(self, Self::ValidationFailed { issues } if issues.iter().any(|i| i.kind == kind))
    }

    /// Issues grouped under `category`, empty for other variants.
    #[must_use]
    pub fn issues_in(&self, category: IssueCategory) -> Vec<&ValidationIssue> {
        match self {
            Self::ValidationFailed { issues } => issues
                .iter()
                .filter(|issue| issue.kind.category() == category)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl From<LedgerError> for EngineError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientBalance {
                leave_type,
                requested,
                available,
            } => Self::InsufficientBalance {
                leave_type,
                requested,
                available,
            },
            LedgerError::NonPositiveAmount(_) | LedgerError::NotHalfDayMultiple(_) => {
                Self::invalid(IssueKind::InvalidAmount, "amount", err.to_string())
            }
            LedgerError::ReversalExceedsUsed { .. } => Self::PolicyViolation(err.to_string()),
            LedgerError::Conflict { .. } => Self::Conflict(err.to_string()),
            LedgerError::Database(message) => Self::Database(message),
        }
    }
}

impl From<WorkflowError> for EngineError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidTransition { .. }
            | WorkflowError::OutOfOrder { .. }
            | WorkflowError::NotAllowedToCancel(_) => Self::InvalidTransition(err.to_string()),
            WorkflowError::LevelNotFound(level) => Self::not_found("approval level", level),
            WorkflowError::NotApprover { .. } => Self::Unauthorized(err.to_string()),
            WorkflowError::AlreadyDecided(level) => Self::AlreadyDecided { level },
            WorkflowError::NoApprover => {
                Self::invalid(IssueKind::NoApprover, "employee_id", err.to_string())
            }
            WorkflowError::Database(message) => Self::Database(message),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Ledger(e) => e.into(),
            StoreError::Workflow(e) => e.into(),
            StoreError::NotFound { entity, id } => Self::not_found(entity, id),
            StoreError::Rejected(issues) => Self::ValidationFailed { issues },
            StoreError::Corrupt(message) => Self::Database(message),
            StoreError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ValidationFailed { issues } => {
                Self::Validation(issues.into_iter().map(|i| i.message).collect())
            }
            EngineError::NotFound { .. } => Self::NotFound(err.to_string()),
            EngineError::Unauthorized(message) => Self::Unauthorized(message),
            EngineError::Conflict(message) => Self::Conflict(message),
            EngineError::InsufficientBalance { .. }
            | EngineError::Overlap(_)
            | EngineError::InvalidTransition(_)
            | EngineError::AlreadyDecided { .. }
            | EngineError::PolicyViolation(_) => Self::BusinessRule(err.to_string()),
            EngineError::Database(message) => Self::Database(message),
            EngineError::Collaborator(e) => Self::ExternalService(e.to_string()),
        }
    }
}
