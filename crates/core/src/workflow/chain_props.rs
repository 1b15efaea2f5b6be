//! Property-based tests for approval chain construction.
//!
//! Feature: approval-workflow
//! - Property 5: Chain Depth Is Bounded
//! - Property 6: Requester Never Approves Own Request
//! - Property 7: Levels Are Consecutive And Distinct

use proptest::prelude::*;
use rust_decimal::Decimal;

use leaveledger_shared::types::EmployeeId;

use super::chain::{ApprovalChainBuilder, ApproverPool};
use crate::leave::LeaveType;

fn leave_type_strategy() -> impl Strategy<Value = LeaveType> {
    prop::sample::select(LeaveType::ALL.to_vec())
}

/// Strategy to generate request lengths in half days (0.5 to 200).
fn days_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=400i64).prop_map(|halves| Decimal::new(halves * 5, 1))
}

/// Pick each slot from a tiny id pool so collisions with each other and
/// with the requester are common.
fn pool_strategy(ids: [EmployeeId; 3]) -> impl Strategy<Value = ApproverPool> {
    let slot = prop::option::of(prop::sample::select(ids.to_vec()));
    (slot.clone(), slot.clone(), slot).prop_map(|(manager, hr_admin, it_admin)| ApproverPool {
        manager,
        hr_admin,
        it_admin,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 5/6/7: Chain shape**
    ///
    /// *For any* pool, leave type and length, a built chain has 1..=3
    /// levels, numbered 1..n, with distinct approvers none of whom is the
    /// requester.
    #[test]
    fn prop_chain_shape(
        (ids, pool) in Just([EmployeeId::new(), EmployeeId::new(), EmployeeId::new()])
            .prop_flat_map(|ids| (Just(ids), pool_strategy(ids))),
        leave_type in leave_type_strategy(),
        days in days_strategy(),
        requester_slot in 0usize..4,
    ) {
        let requester = ids.get(requester_slot).copied().unwrap_or_else(EmployeeId::new);

        if let Ok(chain) = ApprovalChainBuilder::build(requester, leave_type, days, &pool) {
            prop_assert!(!chain.is_empty());
            prop_assert!(chain.len() <= ApprovalChainBuilder::MAX_DEPTH);
            for (i, level) in chain.iter().enumerate() {
                prop_assert_eq!(level.level, i32::try_from(i).unwrap() + 1);
                prop_assert_ne!(level.approver_id, requester);
            }
            let mut approvers: Vec<_> = chain.iter().map(|l| l.approver_id).collect();
            approvers.sort();
            approvers.dedup();
            prop_assert_eq!(approvers.len(), chain.len());
        } else {
            // Only possible when neither manager nor HR is usable.
            prop_assert!(pool.manager.is_none_or(|m| m == requester));
            prop_assert!(pool.hr_admin.is_none_or(|h| h == requester));
        }
    }
}
