//! Boundary error vocabulary.
//!
//! Layer-specific errors (ledger, workflow, engine) fold into [`AppError`]
//! where results leave the process, so job runners and any future API
//! report one set of codes.

use serde::Serialize;
use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Errors as reported outside the engine.
#[derive(Debug, Error)]
pub enum AppError {
    /// The caller may not act on this resource.
    #[error("Not permitted: {0}")]
    Unauthorized(String),

    /// Unknown employee, request, level or claim.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User-correctable input problems, one message per issue.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Eligibility, balance or state machine rule.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Lost a race on a ledger row; the same call may be repeated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Directory, calendar or notification transport failure.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Serializable form of an [`AppError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub code: &'static str,
    /// HTTP-equivalent status.
    pub status: u16,
    /// Human-readable summary.
    pub message: String,
    /// Individual validation messages; empty for other errors.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl AppError {
    const fn classify(&self) -> (u16, &'static str) {
        match self {
            Self::Validation(_) => (400, "VALIDATION_FAILED"),
            Self::Unauthorized(_) => (403, "UNAUTHORIZED"),
            Self::NotFound(_) => (404, "NOT_FOUND"),
            Self::Conflict(_) => (409, "CONFLICT"),
            Self::BusinessRule(_) => (422, "BUSINESS_RULE_VIOLATION"),
            Self::Database(_) => (500, "DATABASE_ERROR"),
            Self::ExternalService(_) => (500, "EXTERNAL_SERVICE_ERROR"),
            Self::Internal(_) => (500, "INTERNAL_ERROR"),
        }
    }

    /// HTTP-equivalent status code.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.classify().0
    }

    /// Stable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        self.classify().1
    }

    /// True if the caller may repeat the same operation unchanged.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// The error as a serializable body.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        let (status, code) = self.classify();
        ErrorBody {
            code,
            status,
            message: self.to_string(),
            details: match self {
                Self::Validation(messages) => messages.clone(),
                _ => Vec::new(),
            },
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
