//! Property-based tests for WorkflowService.
//!
//! Feature: approval-workflow
//! - Property 8: Aggregate Status Derivation
//! - Property 9: No Double Decision
//! - Property 10: Transition Validity

use proptest::prelude::*;

use leaveledger_shared::types::EmployeeId;

use super::error::WorkflowError;
use super::service::WorkflowService;
use super::types::{ApprovalState, ApprovalStatus, RequestStatus, Verdict};

fn approval_status_strategy() -> impl Strategy<Value = ApprovalStatus> {
    prop_oneof![
        Just(ApprovalStatus::Pending),
        Just(ApprovalStatus::Approved),
        Just(ApprovalStatus::Rejected),
    ]
}

fn request_status_strategy() -> impl Strategy<Value = RequestStatus> {
    prop_oneof![
        Just(RequestStatus::Pending),
        Just(RequestStatus::Approved),
        Just(RequestStatus::Rejected),
        Just(RequestStatus::Cancelled),
    ]
}

fn verdict_strategy() -> impl Strategy<Value = Verdict> {
    prop_oneof![Just(Verdict::Approve), Just(Verdict::Reject)]
}

fn pending_chain(len: usize) -> Vec<ApprovalState> {
    (1..=len)
        .map(|level| ApprovalState {
            level: i32::try_from(level).unwrap(),
            approver_id: EmployeeId::new(),
            status: ApprovalStatus::Pending,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 8: Aggregate Status Derivation**
    ///
    /// *For any* set of level statuses, the request is Rejected iff some
    /// level is rejected, Approved iff all levels are approved, and Pending
    /// otherwise.
    #[test]
    fn prop_aggregate_status(levels in prop::collection::vec(approval_status_strategy(), 1..=3)) {
        let status = WorkflowService::aggregate_status(&levels);
        let any_rejected = levels.contains(&ApprovalStatus::Rejected);
        let all_approved = levels.iter().all(|s| *s == ApprovalStatus::Approved);

        match status {
            RequestStatus::Rejected => prop_assert!(any_rejected),
            RequestStatus::Approved => prop_assert!(all_approved && !any_rejected),
            RequestStatus::Pending => prop_assert!(!any_rejected && !all_approved),
            RequestStatus::Cancelled => prop_assert!(false, "never derived"),
        }
    }

    /// **Property 9: No Double Decision**
    ///
    /// *For any* chain decided level by level, applying a verdict to a
    /// level that was already decided fails with AlreadyDecided.
    #[test]
    fn prop_second_decision_fails(
        len in 1usize..=3,
        verdicts in prop::collection::vec(verdict_strategy(), 3),
        second in verdict_strategy(),
    ) {
        let mut approvals = pending_chain(len);
        let mut request_status = RequestStatus::Pending;

        for i in 0..len {
            if request_status != RequestStatus::Pending {
                break;
            }
            let row = approvals[i];
            let decision = WorkflowService::decide(
                request_status, &approvals, row.level, row.approver_id, verdicts[i],
            ).unwrap();
            approvals[i].status = decision.level_status;
            request_status = decision.request_status;

            let again = WorkflowService::decide(
                request_status, &approvals, row.level, row.approver_id, second,
            );
            prop_assert!(matches!(again, Err(WorkflowError::AlreadyDecided(level)) if level == row.level));
        }

        prop_assert_ne!(request_status, RequestStatus::Cancelled);
    }

    /// **Property 10: Transition Validity**
    ///
    /// *For any* pair of statuses, a transition is valid only out of
    /// Pending, or from Approved into Cancelled.
    #[test]
    fn prop_transition_validity(from in request_status_strategy(), to in request_status_strategy()) {
        let valid = WorkflowService::is_valid_transition(from, to);
        if valid {
            prop_assert!(
                from == RequestStatus::Pending
                    || (from == RequestStatus::Approved && to == RequestStatus::Cancelled)
            );
            prop_assert_ne!(from, to);
        }
        if from == RequestStatus::Rejected || from == RequestStatus::Cancelled {
            prop_assert!(!valid);
        }
    }
}
