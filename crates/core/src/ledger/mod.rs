//! Leave balance ledger logic.
//!
//! This module implements the arithmetic of the balance ledger:
//! - Balance records keyed by (employee, leave type, year)
//! - Credit, debit, reverse, close-out and expiry operations
//! - Invariant reconciliation (`available = total - used`, `available >= 0`)
//! - Journal movement kinds
//! - Error types for ledger operations
//!
//! Storage code applies these operations and persists the result behind a
//! version check, so the rules live in exactly one place.

pub mod balance;
pub mod error;
pub mod journal;

#[cfg(test)]
mod balance_props;

pub use balance::{AnomalyKind, BalanceAnomaly, LeaveBalance, Reconciliation};
pub use error::LedgerError;
pub use journal::MovementKind;
