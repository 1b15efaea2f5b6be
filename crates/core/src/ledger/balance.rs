//! Balance record arithmetic.
//!
//! A [`LeaveBalance`] is keyed by (employee, leave type, year). Every
//! mutation goes through one of the methods below, which reject anything
//! that would break `available = total_entitlement - used` or drive
//! `available` below zero. Storage applies the same methods inside a
//! version-guarded write.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use leaveledger_shared::types::{EmployeeId, is_half_day_multiple};

use super::error::LedgerError;
use crate::leave::LeaveType;

/// A per-employee, per-leave-type, per-year ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveBalance {
    /// Owner.
    pub employee_id: EmployeeId,
    /// Leave type.
    pub leave_type: LeaveType,
    /// Balance year.
    pub year: i32,
    /// Everything credited for the year, carry-in included.
    pub total_entitlement: Decimal,
    /// Consumed by approved requests.
    pub used: Decimal,
    /// `total_entitlement - used`.
    pub available: Decimal,
    /// Portion of the entitlement that arrived from the previous year.
    pub carry_forward: Decimal,
    /// Optimistic concurrency version; zero for a record not yet stored.
    pub version: i64,
}

/// What kind of invariant violation reconciliation found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyKind {
    /// `available` disagreed with `total_entitlement - used`.
    AvailableMismatch,
    /// A stored quantity was negative.
    NegativeQuantity,
    /// `used` exceeded `total_entitlement`.
    UsedExceedsEntitlement,
}

impl AnomalyKind {
    /// Returns the string representation stored for operators.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AvailableMismatch => "AVAILABLE_MISMATCH",
            Self::NegativeQuantity => "NEGATIVE_QUANTITY",
            Self::UsedExceedsEntitlement => "USED_EXCEEDS_ENTITLEMENT",
        }
    }

    /// Parses an anomaly kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AVAILABLE_MISMATCH" => Some(Self::AvailableMismatch),
            "NEGATIVE_QUANTITY" => Some(Self::NegativeQuantity),
            "USED_EXCEEDS_ENTITLEMENT" => Some(Self::UsedExceedsEntitlement),
            _ => None,
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An invariant violation found on a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAnomaly {
    /// Violation kind.
    pub kind: AnomalyKind,
    /// Stored `total_entitlement`.
    pub recorded_total: Decimal,
    /// Stored `used`.
    pub recorded_used: Decimal,
    /// Stored `available`.
    pub recorded_available: Decimal,
    /// `available` after clamping.
    pub repaired_available: Decimal,
}

impl BalanceAnomaly {
    /// Human-readable description for logs and the operator table.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{}: total={} used={} available={} repaired_available={}",
            self.kind,
            self.recorded_total,
            self.recorded_used,
            self.recorded_available,
            self.repaired_available
        )
    }
}

/// Result of reconciling a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The record with invariants restored.
    pub balance: LeaveBalance,
    /// What was wrong, if anything.
    pub anomaly: Option<BalanceAnomaly>,
}

fn check_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    if !is_half_day_multiple(amount) {
        return Err(LedgerError::NotHalfDayMultiple(amount));
    }
    Ok(())
}

impl LeaveBalance {
    /// An empty record; what readers see before the first credit or debit.
    #[must_use]
    pub const fn zero(employee_id: EmployeeId, leave_type: LeaveType, year: i32) -> Self {
        Self {
            employee_id,
            leave_type,
            year,
            total_entitlement: Decimal::ZERO,
            used: Decimal::ZERO,
            available: Decimal::ZERO,
            carry_forward: Decimal::ZERO,
            version: 0,
        }
    }

    /// Returns true if both ledger invariants hold.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.available == self.total_entitlement - self.used
            && self.available >= Decimal::ZERO
            && self.used >= Decimal::ZERO
            && self.carry_forward >= Decimal::ZERO
    }

    /// Increases entitlement and available by `amount`.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        check_amount(amount)?;
        self.total_entitlement += amount;
        self.available += amount;
        Ok(())
    }

    /// Consumes `amount`; fails without mutating if available is short.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        check_amount(amount)?;
        if amount > self.available {
            return Err(LedgerError::InsufficientBalance {
                leave_type: self.leave_type,
                requested: amount,
                available: self.available,
            });
        }
        self.used += amount;
        self.available -= amount;
        Ok(())
    }

    /// Undoes a previous debit of `amount`.
    pub fn reverse(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        check_amount(amount)?;
        if amount > self.used {
            return Err(LedgerError::ReversalExceedsUsed {
                requested: amount,
                used: self.used,
            });
        }
        self.used -= amount;
        self.available += amount;
        Ok(())
    }

    /// Credits a carried amount and records it as carry-forward.
    pub fn carry_in(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.credit(amount)?;
        self.carry_forward += amount;
        Ok(())
    }

    /// Closes the year: removes whatever is still available from the
    /// entitlement and returns that amount.
    pub fn close_out(&mut self) -> Decimal {
        let closing = self.available.max(Decimal::ZERO);
        self.total_entitlement -= closing;
        self.available -= closing;
        closing
    }

    /// Removes up to `amount` of available entitlement; returns what was
    /// actually removed.
    pub fn extinguish(&mut self, amount: Decimal) -> Decimal {
        let taken = amount.min(self.available).max(Decimal::ZERO);
        self.total_entitlement -= taken;
        self.available -= taken;
        taken
    }

    /// Carry-forward that has not been consumed yet.
    ///
    /// Usage is attributed to carried days first.
    #[must_use]
    pub fn unused_carry_forward(&self) -> Decimal {
        (self.carry_forward - self.used)
            .max(Decimal::ZERO)
            .min(self.available.max(Decimal::ZERO))
    }

    /// Restores both invariants on a possibly corrupt stored record.
    ///
    /// `total_entitlement` and `used` are journaled and treated as the
    /// source of truth. Negative quantities clamp to zero; if `used`
    /// exceeds the entitlement the entitlement is raised to match, so
    /// `available` clamps to zero rather than going negative.
    #[must_use]
    pub fn reconciled(&self) -> Reconciliation {
        if self.is_consistent() {
            return Reconciliation {
                balance: self.clone(),
                anomaly: None,
            };
        }

        let negative = self.total_entitlement < Decimal::ZERO
            || self.used < Decimal::ZERO
            || self.available < Decimal::ZERO
            || self.carry_forward < Decimal::ZERO;

        let mut repaired = self.clone();
        repaired.total_entitlement = self.total_entitlement.max(Decimal::ZERO);
        repaired.used = self.used.max(Decimal::ZERO);
        repaired.carry_forward = self.carry_forward.max(Decimal::ZERO);

        let over_used = repaired.used > repaired.total_entitlement;
        if over_used {
            repaired.total_entitlement = repaired.used;
        }
        repaired.available = repaired.total_entitlement - repaired.used;

        let kind = if over_used {
            AnomalyKind::UsedExceedsEntitlement
        } else if negative {
            AnomalyKind::NegativeQuantity
        } else {
            AnomalyKind::AvailableMismatch
        };

        Reconciliation {
            anomaly: Some(BalanceAnomaly {
                kind,
                recorded_total: self.total_entitlement,
                recorded_used: self.used,
                recorded_available: self.available,
                repaired_available: repaired.available,
            }),
            balance: repaired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn balance(total: Decimal, used: Decimal) -> LeaveBalance {
        LeaveBalance {
            total_entitlement: total,
            used,
            available: total - used,
            ..LeaveBalance::zero(EmployeeId::new(), LeaveType::Privilege, 2024)
        }
    }

    #[test]
    fn test_zero_is_consistent() {
        let zero = LeaveBalance::zero(EmployeeId::new(), LeaveType::Casual, 2024);
        assert!(zero.is_consistent());
        assert_eq!(zero.available, Decimal::ZERO);
    }

    #[test]
    fn test_credit_then_debit() {
        let mut b = balance(dec!(0), dec!(0));
        b.credit(dec!(10)).unwrap();
        b.debit(dec!(2)).unwrap();
        assert_eq!(b.total_entitlement, dec!(10));
        assert_eq!(b.used, dec!(2));
        assert_eq!(b.available, dec!(8));
        assert!(b.is_consistent());
    }

    #[test]
    fn test_debit_insufficient_leaves_record_untouched() {
        let mut b = balance(dec!(1), dec!(0));
        let before = b.clone();
        let err = b.debit(dec!(1.5)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
        assert_eq!(b, before);
    }

    #[test]
    fn test_debit_exact_available_succeeds() {
        let mut b = balance(dec!(1), dec!(0));
        b.debit(dec!(1)).unwrap();
        assert_eq!(b.available, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_bad_amounts() {
        let mut b = balance(dec!(5), dec!(0));
        assert!(matches!(
            b.credit(dec!(0)),
            Err(LedgerError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            b.debit(dec!(-1)),
            Err(LedgerError::NonPositiveAmount(_))
        ));
        assert!(matches!(
            b.credit(dec!(0.25)),
            Err(LedgerError::NotHalfDayMultiple(_))
        ));
    }

    #[test]
    fn test_reverse_restores_available() {
        let mut b = balance(dec!(10), dec!(0));
        b.debit(dec!(2)).unwrap();
        b.reverse(dec!(2)).unwrap();
        assert_eq!(b.available, dec!(10));
        assert_eq!(b.used, Decimal::ZERO);
        assert!(matches!(
            b.reverse(dec!(0.5)),
            Err(LedgerError::ReversalExceedsUsed { .. })
        ));
    }

    #[test]
    fn test_close_out_zeroes_available() {
        let mut b = balance(dec!(40), dec!(5));
        let closing = b.close_out();
        assert_eq!(closing, dec!(35));
        assert_eq!(b.available, Decimal::ZERO);
        assert_eq!(b.total_entitlement, dec!(5));
        assert!(b.is_consistent());
    }

    #[test]
    fn test_carry_in_tracks_carry_forward() {
        let mut b = balance(dec!(0), dec!(0));
        b.carry_in(dec!(5)).unwrap();
        b.credit(dec!(15)).unwrap();
        assert_eq!(b.carry_forward, dec!(5));
        assert_eq!(b.available, dec!(20));
    }

    #[test]
    fn test_unused_carry_forward_attributes_usage_first() {
        let mut b = balance(dec!(0), dec!(0));
        b.carry_in(dec!(5)).unwrap();
        b.credit(dec!(15)).unwrap();
        b.debit(dec!(3)).unwrap();
        assert_eq!(b.unused_carry_forward(), dec!(2));
        b.debit(dec!(4)).unwrap();
        assert_eq!(b.unused_carry_forward(), Decimal::ZERO);
    }

    #[test]
    fn test_extinguish_caps_at_available() {
        let mut b = balance(dec!(3), dec!(2));
        assert_eq!(b.extinguish(dec!(5)), dec!(1));
        assert_eq!(b.available, Decimal::ZERO);
        assert!(b.is_consistent());
    }

    #[test]
    fn test_reconcile_clean_record_has_no_anomaly() {
        let b = balance(dec!(10), dec!(4));
        let r = b.reconciled();
        assert!(r.anomaly.is_none());
        assert_eq!(r.balance, b);
    }

    #[test]
    fn test_reconcile_mismatch() {
        let mut b = balance(dec!(10), dec!(4));
        b.available = dec!(7);
        let r = b.reconciled();
        let anomaly = r.anomaly.unwrap();
        assert_eq!(anomaly.kind, AnomalyKind::AvailableMismatch);
        assert_eq!(r.balance.available, dec!(6));
        assert!(r.balance.is_consistent());
    }

    #[test]
    fn test_reconcile_negative_available_clamps_to_zero() {
        let mut b = balance(dec!(2), dec!(3));
        b.available = dec!(-1);
        let r = b.reconciled();
        assert_eq!(
            r.anomaly.unwrap().kind,
            AnomalyKind::UsedExceedsEntitlement
        );
        assert_eq!(r.balance.available, Decimal::ZERO);
        assert_eq!(r.balance.total_entitlement, dec!(3));
        assert!(r.balance.is_consistent());
    }
}
