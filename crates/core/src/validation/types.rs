//! Validation domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use leaveledger_shared::types::{EmployeeId, LeaveRequestId};

use crate::calendar::DateRange;
use crate::employee::Employee;
use crate::leave::{HalfDaySession, LeaveType};
use crate::workflow::{ApproverPool, ChainLevel, RequestStatus};

/// A leave request as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequestInput {
    /// Requester.
    pub employee_id: EmployeeId,
    /// Leave type.
    pub leave_type: LeaveType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Half-day session for single-day requests.
    pub half_day: Option<HalfDaySession>,
    /// Free-text reason.
    pub reason: String,
    /// Supporting documents were attached.
    pub has_documentation: bool,
}

impl LeaveRequestInput {
    /// The requested date range.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Balance year the request draws on.
    #[must_use]
    pub fn balance_year(&self) -> i32 {
        chrono::Datelike::year(&self.start_date)
    }
}

/// Broad error category an issue reports under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCategory {
    /// User-correctable input problem.
    Validation,
    /// Not enough balance.
    InsufficientBalance,
    /// Date range collides with another request.
    Overlap,
    /// Eligibility or documentation rule.
    PolicyViolation,
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    /// Start after end.
    InvalidDateRange,
    /// Starts too far ahead.
    TooFarInFuture,
    /// Starts too far back.
    TooFarInPast,
    /// The range has no working days.
    NoWorkingDays,
    /// Half-day session on a request spanning more than one working day.
    InvalidHalfDay,
    /// Requested days exceed available minus pending.
    InsufficientBalance,
    /// Gender or marital status does not qualify.
    NotEligible,
    /// A maternity/paternity request already exists this year.
    ParentalLimitReached,
    /// CL/PL during an approved maternity/paternity leave.
    ParentalConflict,
    /// Collides with a pending or approved request.
    Overlap,
    /// Longer than the leave type allows in one go.
    ExceedsMaxConsecutive,
    /// Documentation must be attached.
    DocumentationRequired,
    /// No one can approve the request.
    NoApprover,
    /// Requester is not active.
    InactiveEmployee,
    /// Comp-off work date is not a weekend day or holiday.
    NotNonWorkingDay,
    /// Comp-off amount is not half or one day.
    InvalidAmount,
}

impl IssueKind {
    /// Returns the stable code for this issue.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange => "INVALID_DATE_RANGE",
            Self::TooFarInFuture => "TOO_FAR_IN_FUTURE",
            Self::TooFarInPast => "TOO_FAR_IN_PAST",
            Self::NoWorkingDays => "NO_WORKING_DAYS",
            Self::InvalidHalfDay => "INVALID_HALF_DAY",
            Self::InsufficientBalance => "INSUFFICIENT_BALANCE",
            Self::NotEligible => "NOT_ELIGIBLE",
            Self::ParentalLimitReached => "PARENTAL_LIMIT_REACHED",
            Self::ParentalConflict => "PARENTAL_CONFLICT",
            Self::Overlap => "OVERLAP",
            Self::ExceedsMaxConsecutive => "EXCEEDS_MAX_CONSECUTIVE",
            Self::DocumentationRequired => "DOCUMENTATION_REQUIRED",
            Self::NoApprover => "NO_APPROVER",
            Self::InactiveEmployee => "INACTIVE_EMPLOYEE",
            Self::NotNonWorkingDay => "NOT_NON_WORKING_DAY",
            Self::InvalidAmount => "INVALID_AMOUNT",
        }
    }

    /// Error category the issue belongs to.
    #[must_use]
    pub const fn category(&self) -> IssueCategory {
        match self {
            Self::InsufficientBalance => IssueCategory::InsufficientBalance,
            Self::Overlap => IssueCategory::Overlap,
            Self::NotEligible
            | Self::ParentalLimitReached
            | Self::ParentalConflict
            | Self::ExceedsMaxConsecutive
            | Self::DocumentationRequired
            | Self::InactiveEmployee => IssueCategory::PolicyViolation,
            Self::InvalidDateRange
            | Self::TooFarInFuture
            | Self::TooFarInPast
            | Self::NoWorkingDays
            | Self::InvalidHalfDay
            | Self::NoApprover
            | Self::NotNonWorkingDay
            | Self::InvalidAmount => IssueCategory::Validation,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// What went wrong.
    pub kind: IssueKind,
    /// Input field the issue refers to.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

impl ValidationIssue {
    /// Creates an issue.
    pub fn new(kind: IssueKind, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind, self.field, self.message)
    }
}

/// Another request of the same employee, as the validator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistingRequest {
    /// Request id.
    pub id: LeaveRequestId,
    /// Leave type.
    pub leave_type: LeaveType,
    /// Date range.
    pub range: DateRange,
    /// Working days.
    pub total_days: Decimal,
    /// Status.
    pub status: RequestStatus,
}

/// Everything the validator needs besides the request itself.
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    /// Requester.
    pub employee: &'a Employee,
    /// Requester's local date.
    pub today: NaiveDate,
    /// Holidays for the requester's location covering the range.
    pub holidays: &'a HashSet<NaiveDate>,
    /// Available balance for the leave type and balance year.
    pub available: Decimal,
    /// Requester's other requests.
    pub existing: &'a [ExistingRequest],
    /// Candidate approvers.
    pub approvers: ApproverPool,
    /// Furthest a request may start in the future, in days.
    pub max_future_days: i64,
    /// Furthest a request may start in the past, in days.
    pub max_past_days: i64,
}

/// Result of validating a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    /// No errors.
    pub valid: bool,
    /// Blocking issues.
    pub errors: Vec<ValidationIssue>,
    /// Non-blocking issues.
    pub warnings: Vec<ValidationIssue>,
    /// Working days requested.
    pub total_days: Decimal,
    /// Documentation is required for this request.
    pub required_documentation: bool,
    /// May be finalized without approvers.
    pub auto_approval_eligible: bool,
    /// Approval chain.
    pub approval_chain: Vec<ChainLevel>,
}

impl ValidationVerdict {
    /// True if any error has the given kind.
    #[must_use]
    pub fn has_error(&self, kind: IssueKind) -> bool {
        self.errors.iter().any(|issue| issue.kind == kind)
    }
}
