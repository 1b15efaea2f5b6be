//! Approval chain construction.
//!
//! The chain is built once, at submission, from a fixed set of candidate
//! approvers resolved by the caller. Depth is capped at
//! [`ApprovalChainBuilder::MAX_DEPTH`] and the reporting hierarchy is never
//! walked, so a cyclic manager graph cannot affect the result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use leaveledger_shared::types::EmployeeId;

use crate::leave::LeaveType;
use crate::workflow::error::WorkflowError;

/// When a chain grows beyond the manager level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainThresholds {
    /// HR level regardless of length.
    pub hr_always: bool,
    /// HR level when the request is longer than this.
    pub hr_above_days: Option<Decimal>,
    /// Third level when the request is longer than this.
    pub third_level_above_days: Option<Decimal>,
}

impl ChainThresholds {
    /// HR above 10 days, third level above 30 days.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            hr_always: false,
            hr_above_days: Some(Decimal::from(10)),
            third_level_above_days: Some(Decimal::from(30)),
        }
    }

    /// Returns true if a request of `days` needs the HR level.
    #[must_use]
    pub fn needs_hr(&self, days: Decimal) -> bool {
        self.hr_always || self.hr_above_days.is_some_and(|t| days > t)
    }

    /// Returns true if a request of `days` needs the third level.
    #[must_use]
    pub fn needs_third_level(&self, days: Decimal) -> bool {
        self.third_level_above_days.is_some_and(|t| days > t)
    }
}

/// The role an approver fills in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApproverRole {
    /// Direct reporting manager.
    Manager,
    /// HR administrator.
    HrAdmin,
    /// IT administrator.
    ItAdmin,
}

impl ApproverRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "MANAGER",
            Self::HrAdmin => "HR_ADMIN",
            Self::ItAdmin => "IT_ADMIN",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MANAGER" => Some(Self::Manager),
            "HR_ADMIN" => Some(Self::HrAdmin),
            "IT_ADMIN" => Some(Self::ItAdmin),
            _ => None,
        }
    }
}

impl fmt::Display for ApproverRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One level of a built chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainLevel {
    /// Level number, consecutive from 1.
    pub level: i32,
    /// Assigned approver.
    pub approver_id: EmployeeId,
    /// Role the approver fills.
    pub role: ApproverRole,
}

/// Candidate approvers for one requester.
///
/// The caller fills this from the employee directory: the manager only if
/// active, admins as the first active holder of the role other than the
/// requester.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApproverPool {
    /// Active direct manager.
    pub manager: Option<EmployeeId>,
    /// An active HR admin.
    pub hr_admin: Option<EmployeeId>,
    /// An active IT admin.
    pub it_admin: Option<EmployeeId>,
}

/// Builds approval chains.
pub struct ApprovalChainBuilder;

impl ApprovalChainBuilder {
    /// Maximum chain depth.
    pub const MAX_DEPTH: usize = 3;

    /// Builds the chain for a request of `total_days` of `leave_type`.
    ///
    /// Levels: manager, then HR when the leave type's thresholds require
    /// it, then IT admin for long leave. Missing approvers are skipped and
    /// the remaining levels renumbered. The requester and repeated
    /// approvers never appear. An otherwise empty chain falls back to HR.
    pub fn build(
        requester: EmployeeId,
        leave_type: LeaveType,
        total_days: Decimal,
        pool: &ApproverPool,
    ) -> Result<Vec<ChainLevel>, WorkflowError> {
        let thresholds = leave_type.policy().chain;

        let mut candidates = vec![(ApproverRole::Manager, pool.manager)];
        if thresholds.needs_hr(total_days) {
            candidates.push((ApproverRole::HrAdmin, pool.hr_admin));
        }
        if thresholds.needs_third_level(total_days) {
            candidates.push((ApproverRole::ItAdmin, pool.it_admin));
        }

        let chain = Self::number(requester, candidates);
        if !chain.is_empty() {
            return Ok(chain);
        }

        let fallback = Self::number(requester, vec![(ApproverRole::HrAdmin, pool.hr_admin)]);
        if fallback.is_empty() {
            Err(WorkflowError::NoApprover)
        } else {
            Ok(fallback)
        }
    }

    /// Single-level chain: the manager, or HR when there is none.
    pub fn single_approver(
        requester: EmployeeId,
        pool: &ApproverPool,
    ) -> Result<ChainLevel, WorkflowError> {
        Self::number(
            requester,
            vec![
                (ApproverRole::Manager, pool.manager),
                (ApproverRole::HrAdmin, pool.hr_admin),
            ],
        )
        .into_iter()
        .next()
        .ok_or(WorkflowError::NoApprover)
    }

    fn number(
        requester: EmployeeId,
        candidates: Vec<(ApproverRole, Option<EmployeeId>)>,
    ) -> Vec<ChainLevel> {
        let mut seen: Vec<EmployeeId> = Vec::with_capacity(Self::MAX_DEPTH);
        let mut chain = Vec::with_capacity(Self::MAX_DEPTH);

        for (role, approver) in candidates {
            let Some(approver_id) = approver else {
                continue;
            };
            if approver_id == requester || seen.contains(&approver_id) {
                continue;
            }
            if chain.len() == Self::MAX_DEPTH {
                break;
            }
            seen.push(approver_id);
            chain.push(ChainLevel {
                level: i32::try_from(chain.len()).unwrap_or(i32::MAX) + 1,
                approver_id,
                role,
            });
        }
        chain
    }
}
