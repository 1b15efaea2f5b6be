//! Workflow domain types for the leave request lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use leaveledger_shared::types::EmployeeId;

/// Leave request status.
///
/// The valid transitions are:
/// - Pending → Approved (every level approved)
/// - Pending → Rejected (any level rejected)
/// - Pending → Cancelled (withdrawn by the requester)
/// - Approved → Cancelled (future-dated leave only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Awaiting one or more approval levels.
    Pending,
    /// Every level approved; the ledger has been debited.
    Approved,
    /// Rejected at some level.
    Rejected,
    /// Withdrawn or cancelled.
    Cancelled,
}

impl RequestStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            "CANCELLED" | "CANCELED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Requests that occupy their date range and reserve balance.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single approval level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    /// Not decided yet.
    Pending,
    /// Approved by the level's approver.
    Approved,
    /// Rejected by the level's approver.
    Rejected,
}

impl ApprovalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An approver's decision on one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Approve the level.
    Approve,
    /// Reject the level, and with it the request.
    Reject,
}

impl Verdict {
    /// The approval status this verdict writes.
    #[must_use]
    pub const fn approval_status(&self) -> ApprovalStatus {
        match self {
            Self::Approve => ApprovalStatus::Approved,
            Self::Reject => ApprovalStatus::Rejected,
        }
    }

    /// Parses a verdict from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "APPROVE" | "APPROVED" => Some(Self::Approve),
            "REJECT" | "REJECTED" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// Snapshot of one approval row as the decision logic sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApprovalState {
    /// Level number, starting at 1.
    pub level: i32,
    /// Assigned approver.
    pub approver_id: EmployeeId,
    /// Current status.
    pub status: ApprovalStatus,
}

/// Outcome of a valid per-level decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Level decided.
    pub level: i32,
    /// Status written to the level.
    pub level_status: ApprovalStatus,
    /// Aggregate request status after the decision.
    pub request_status: RequestStatus,
}

impl Decision {
    /// True when this decision moves the request to `Approved` and the
    /// ledger must be debited in the same transaction.
    #[must_use]
    pub fn finalizes_approval(&self) -> bool {
        self.request_status == RequestStatus::Approved
    }
}
