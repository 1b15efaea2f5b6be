//! Property-based tests for balance arithmetic.
//!
//! Feature: balance-ledger
//! - Property 1: Balance Invariant Preservation
//! - Property 2: Debit Never Overdraws
//! - Property 3: Debit/Reverse Symmetry
//! - Property 4: Reconciliation Always Restores Invariants

use proptest::prelude::*;
use rust_decimal::Decimal;

use leaveledger_shared::types::EmployeeId;

use super::balance::LeaveBalance;
use super::error::LedgerError;
use crate::leave::LeaveType;

/// Strategy to generate half-day amounts (0.5 to 50.0).
fn half_day_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=100i64).prop_map(|halves| Decimal::new(halves * 5, 1))
}

/// Strategy to generate arbitrary (possibly negative) stored quantities.
fn stored_quantity() -> impl Strategy<Value = Decimal> {
    (-40i64..=200i64).prop_map(|halves| Decimal::new(halves * 5, 1))
}

#[derive(Debug, Clone)]
enum Op {
    Credit(Decimal),
    Debit(Decimal),
    Reverse(Decimal),
    CarryIn(Decimal),
    Extinguish(Decimal),
    CloseOut,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        half_day_amount().prop_map(Op::Credit),
        half_day_amount().prop_map(Op::Debit),
        half_day_amount().prop_map(Op::Reverse),
        half_day_amount().prop_map(Op::CarryIn),
        half_day_amount().prop_map(Op::Extinguish),
        Just(Op::CloseOut),
    ]
}

fn apply(balance: &mut LeaveBalance, op: &Op) {
    // Rejected operations must leave the record as it was.
    let before = balance.clone();
    let result = match op {
        Op::Credit(a) => balance.credit(*a),
        Op::Debit(a) => balance.debit(*a),
        Op::Reverse(a) => balance.reverse(*a),
        Op::CarryIn(a) => balance.carry_in(*a),
        Op::Extinguish(a) => {
            balance.extinguish(*a);
            Ok(())
        }
        Op::CloseOut => {
            balance.close_out();
            Ok(())
        }
    };
    if result.is_err() {
        assert_eq!(*balance, before);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 1: Balance Invariant Preservation**
    ///
    /// *For any* sequence of ledger operations starting from a zero record,
    /// `available = total_entitlement - used` and `available >= 0` hold
    /// after every step.
    #[test]
    fn prop_invariant_holds_after_any_sequence(
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut balance = LeaveBalance::zero(EmployeeId::new(), LeaveType::Privilege, 2024);
        for op in &ops {
            apply(&mut balance, op);
            prop_assert!(balance.is_consistent(), "broken after {:?}: {:?}", op, balance);
        }
    }

    /// **Property 2: Debit Never Overdraws**
    ///
    /// *For any* available amount and request, a debit succeeds iff the
    /// request does not exceed available.
    #[test]
    fn prop_debit_succeeds_iff_sufficient(
        credited in half_day_amount(),
        requested in half_day_amount(),
    ) {
        let mut balance = LeaveBalance::zero(EmployeeId::new(), LeaveType::Casual, 2024);
        balance.credit(credited).unwrap();

        match balance.debit(requested) {
            Ok(()) => {
                prop_assert!(requested <= credited);
                prop_assert_eq!(balance.available, credited - requested);
            }
            Err(LedgerError::InsufficientBalance { available, .. }) => {
                prop_assert!(requested > credited);
                prop_assert_eq!(available, credited);
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    /// **Property 3: Debit/Reverse Symmetry**
    ///
    /// *For any* successful debit, reversing the same amount restores the
    /// record exactly.
    #[test]
    fn prop_reverse_undoes_debit(
        credited in half_day_amount(),
        requested in half_day_amount(),
    ) {
        prop_assume!(requested <= credited);
        let mut balance = LeaveBalance::zero(EmployeeId::new(), LeaveType::Pto, 2024);
        balance.credit(credited).unwrap();
        let before = balance.clone();

        balance.debit(requested).unwrap();
        balance.reverse(requested).unwrap();
        prop_assert_eq!(balance, before);
    }

    /// **Property 4: Reconciliation Always Restores Invariants**
    ///
    /// *For any* stored record, however corrupt, the reconciled record is
    /// consistent and an anomaly is reported iff the input was not.
    #[test]
    fn prop_reconciliation_restores_invariants(
        total in stored_quantity(),
        used in stored_quantity(),
        available in stored_quantity(),
        carry in stored_quantity(),
    ) {
        let stored = LeaveBalance {
            total_entitlement: total,
            used,
            available,
            carry_forward: carry,
            ..LeaveBalance::zero(EmployeeId::new(), LeaveType::Sick, 2024)
        };
        let r = stored.reconciled();
        prop_assert!(r.balance.is_consistent());
        prop_assert_eq!(r.anomaly.is_some(), !stored.is_consistent());
        prop_assert!(r.balance.used == used.max(Decimal::ZERO));
    }
}
