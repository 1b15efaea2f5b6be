//! Workflow service for leave request state transitions.
//!
//! This module implements the state machine logic for deciding approval
//! levels, deriving the aggregate request status, and cancelling.
//! Storage applies the returned outcomes inside one transaction.

use leaveledger_shared::types::EmployeeId;

use crate::workflow::error::WorkflowError;
use crate::workflow::types::{ApprovalState, ApprovalStatus, Decision, RequestStatus, Verdict};

/// Who is asking to cancel a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelActor {
    /// The caller.
    pub actor_id: EmployeeId,
    /// The caller owns the request.
    pub is_owner: bool,
    /// The caller is an HR admin.
    pub is_hr_admin: bool,
}

/// Side effects a valid cancellation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelEffect {
    /// Status before cancellation.
    pub previous: RequestStatus,
    /// The approved debit must be reversed.
    pub reverse_debit: bool,
}

/// Stateless service for managing leave request workflow transitions.
///
/// All methods are associated functions that validate a transition and
/// return what the caller must persist.
pub struct WorkflowService;

impl WorkflowService {
    /// Derives a request's status from its approval levels.
    ///
    /// `Rejected` if any level is rejected, `Approved` only when there is
    /// at least one level and all are approved, otherwise `Pending`.
    #[must_use]
    pub fn aggregate_status(levels: &[ApprovalStatus]) -> RequestStatus {
        if levels.contains(&ApprovalStatus::Rejected) {
            RequestStatus::Rejected
        } else if !levels.is_empty() && levels.iter().all(|s| *s == ApprovalStatus::Approved) {
            RequestStatus::Approved
        } else {
            RequestStatus::Pending
        }
    }

    /// Decide one approval level.
    ///
    /// # Arguments
    /// * `request_status` - The current status of the request
    /// * `approvals` - Every approval level of the request
    /// * `level` - The level being decided
    /// * `approver_id` - The caller
    /// * `verdict` - Approve or reject
    ///
    /// # Returns
    /// * `Ok(Decision)` with the level status and the new aggregate status
    /// * `Err(WorkflowError::LevelNotFound)` if the level does not exist
    /// * `Err(WorkflowError::NotApprover)` if the caller is not assigned
    /// * `Err(WorkflowError::AlreadyDecided)` if the level is not pending
    /// * `Err(WorkflowError::InvalidTransition)` if the request is not pending
    /// * `Err(WorkflowError::OutOfOrder)` if a lower level is still pending
    pub fn decide(
        request_status: RequestStatus,
        approvals: &[ApprovalState],
        level: i32,
        approver_id: EmployeeId,
        verdict: Verdict,
    ) -> Result<Decision, WorkflowError> {
        let row = approvals
            .iter()
            .find(|a| a.level == level)
            .ok_or(WorkflowError::LevelNotFound(level))?;

        if row.approver_id != approver_id {
            return Err(WorkflowError::NotApprover { approver_id, level });
        }
        if row.status != ApprovalStatus::Pending {
            return Err(WorkflowError::AlreadyDecided(level));
        }

        let level_status = verdict.approval_status();
        let target = match verdict {
            Verdict::Approve => RequestStatus::Approved,
            Verdict::Reject => RequestStatus::Rejected,
        };
        if request_status != RequestStatus::Pending {
            return Err(WorkflowError::InvalidTransition {
                from: request_status,
                to: target,
            });
        }

        if let Some(lower) = approvals
            .iter()
            .filter(|a| a.level < level && a.status == ApprovalStatus::Pending)
            .map(|a| a.level)
            .min()
        {
            return Err(WorkflowError::OutOfOrder {
                level,
                pending_level: lower,
            });
        }

        let statuses: Vec<ApprovalStatus> = approvals
            .iter()
            .map(|a| if a.level == level { level_status } else { a.status })
            .collect();

        Ok(Decision {
            level,
            level_status,
            request_status: Self::aggregate_status(&statuses),
        })
    }

    /// Cancel a request.
    ///
    /// # Arguments
    /// * `current_status` - The current status of the request
    /// * `actor` - Who is cancelling
    /// * `starts_after_today` - The leave has not started in the
    ///   requester's local calendar
    ///
    /// # Returns
    /// * `Ok(CancelEffect)` describing the ledger effect
    /// * `Err(WorkflowError::InvalidTransition)` for started or terminal requests
    /// * `Err(WorkflowError::NotAllowedToCancel)` if the actor may not cancel
    pub fn cancel(
        current_status: RequestStatus,
        actor: CancelActor,
        starts_after_today: bool,
    ) -> Result<CancelEffect, WorkflowError> {
        let invalid = WorkflowError::InvalidTransition {
            from: current_status,
            to: RequestStatus::Cancelled,
        };
        match current_status {
            RequestStatus::Pending => {
                if !actor.is_owner {
                    return Err(WorkflowError::NotAllowedToCancel(actor.actor_id));
                }
                Ok(CancelEffect {
                    previous: current_status,
                    reverse_debit: false,
                })
            }
            RequestStatus::Approved => {
                if !starts_after_today {
                    return Err(invalid);
                }
                if !(actor.is_owner || actor.is_hr_admin) {
                    return Err(WorkflowError::NotAllowedToCancel(actor.actor_id));
                }
                Ok(CancelEffect {
                    previous: current_status,
                    reverse_debit: true,
                })
            }
            RequestStatus::Rejected | RequestStatus::Cancelled => Err(invalid),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Approved | Rejected | Cancelled
    /// - Approved → Cancelled
    #[must_use]
    pub fn is_valid_transition(from: RequestStatus, to: RequestStatus) -> bool {
        matches!(
            (from, to),
            (
                RequestStatus::Pending,
                RequestStatus::Approved | RequestStatus::Rejected | RequestStatus::Cancelled
            ) | (RequestStatus::Approved, RequestStatus::Cancelled)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(approvers: &[EmployeeId]) -> Vec<ApprovalState> {
        approvers
            .iter()
            .zip(1..)
            .map(|(id, level)| ApprovalState {
                level,
                approver_id: *id,
                status: ApprovalStatus::Pending,
            })
            .collect()
    }

    fn owner(id: EmployeeId) -> CancelActor {
        CancelActor {
            actor_id: id,
            is_owner: true,
            is_hr_admin: false,
        }
    }

    #[test]
    fn test_single_level_approve_finalizes() {
        let manager = EmployeeId::new();
        let approvals = chain(&[manager]);
        let decision =
            WorkflowService::decide(RequestStatus::Pending, &approvals, 1, manager, Verdict::Approve)
                .unwrap();
        assert_eq!(decision.request_status, RequestStatus::Approved);
        assert!(decision.finalizes_approval());
    }

    #[test]
    fn test_first_of_two_levels_stays_pending() {
        let (manager, hr) = (EmployeeId::new(), EmployeeId::new());
        let approvals = chain(&[manager, hr]);
        let decision =
            WorkflowService::decide(RequestStatus::Pending, &approvals, 1, manager, Verdict::Approve)
                .unwrap();
        assert_eq!(decision.request_status, RequestStatus::Pending);
        assert!(!decision.finalizes_approval());
    }

    #[test]
    fn test_reject_at_any_level_rejects_request() {
        let (manager, hr) = (EmployeeId::new(), EmployeeId::new());
        let mut approvals = chain(&[manager, hr]);
        approvals[0].status = ApprovalStatus::Approved;
        let decision =
            WorkflowService::decide(RequestStatus::Pending, &approvals, 2, hr, Verdict::Reject)
                .unwrap();
        assert_eq!(decision.request_status, RequestStatus::Rejected);
    }

    #[test]
    fn test_second_decision_is_already_decided() {
        let manager = EmployeeId::new();
        let mut approvals = chain(&[manager, EmployeeId::new()]);
        approvals[0].status = ApprovalStatus::Approved;
        let err =
            WorkflowService::decide(RequestStatus::Pending, &approvals, 1, manager, Verdict::Reject)
                .unwrap_err();
        assert!(matches!(err, WorkflowError::AlreadyDecided(1)));
    }

    #[test]
    fn test_wrong_approver_is_rejected() {
        let approvals = chain(&[EmployeeId::new()]);
        let err = WorkflowService::decide(
            RequestStatus::Pending,
            &approvals,
            1,
            EmployeeId::new(),
            Verdict::Approve,
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::NotApprover { level: 1, .. }));
    }

    #[test]
    fn test_missing_level() {
        let manager = EmployeeId::new();
        let err = WorkflowService::decide(
            RequestStatus::Pending,
            &chain(&[manager]),
            2,
            manager,
            Verdict::Approve,
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::LevelNotFound(2)));
    }

    #[test]
    fn test_levels_decided_in_order() {
        let (manager, hr) = (EmployeeId::new(), EmployeeId::new());
        let err = WorkflowService::decide(
            RequestStatus::Pending,
            &chain(&[manager, hr]),
            2,
            hr,
            Verdict::Approve,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::OutOfOrder {
                level: 2,
                pending_level: 1
            }
        ));
    }

    #[test]
    fn test_decide_on_rejected_request_is_invalid() {
        let (manager, hr) = (EmployeeId::new(), EmployeeId::new());
        let mut approvals = chain(&[manager, hr]);
        approvals[0].status = ApprovalStatus::Rejected;
        let err =
            WorkflowService::decide(RequestStatus::Rejected, &approvals, 2, hr, Verdict::Approve)
                .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[test]
    fn test_cancel_approved_future_reverses() {
        let id = EmployeeId::new();
        let effect = WorkflowService::cancel(RequestStatus::Approved, owner(id), true).unwrap();
        assert!(effect.reverse_debit);
    }

    #[test]
    fn test_cancel_started_leave_fails() {
        let id = EmployeeId::new();
        let err = WorkflowService::cancel(RequestStatus::Approved, owner(id), false).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[test]
    fn test_cancel_pending_by_owner_has_no_ledger_effect() {
        let id = EmployeeId::new();
        let effect = WorkflowService::cancel(RequestStatus::Pending, owner(id), true).unwrap();
        assert!(!effect.reverse_debit);
    }

    #[test]
    fn test_hr_may_cancel_approved_but_not_pending() {
        let hr = CancelActor {
            actor_id: EmployeeId::new(),
            is_owner: false,
            is_hr_admin: true,
        };
        assert!(WorkflowService::cancel(RequestStatus::Approved, hr, true).is_ok());
        assert!(matches!(
            WorkflowService::cancel(RequestStatus::Pending, hr, true),
            Err(WorkflowError::NotAllowedToCancel(_))
        ));
    }

    #[test]
    fn test_cancel_terminal_fails() {
        let id = EmployeeId::new();
        for status in [RequestStatus::Rejected, RequestStatus::Cancelled] {
            assert!(matches!(
                WorkflowService::cancel(status, owner(id), true),
                Err(WorkflowError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn test_valid_transitions() {
        assert!(WorkflowService::is_valid_transition(
            RequestStatus::Pending,
            RequestStatus::Approved
        ));
        assert!(WorkflowService::is_valid_transition(
            RequestStatus::Approved,
            RequestStatus::Cancelled
        ));
        assert!(!WorkflowService::is_valid_transition(
            RequestStatus::Approved,
            RequestStatus::Rejected
        ));
        assert!(!WorkflowService::is_valid_transition(
            RequestStatus::Rejected,
            RequestStatus::Pending
        ));
    }
}
