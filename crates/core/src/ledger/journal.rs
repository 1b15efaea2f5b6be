//! Journal movement kinds.
//!
//! Every ledger mutation is journaled with one of these kinds and a
//! reference string naming what caused it (request, accrual period, run).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    /// Entitlement increase (accrual, grant, manual credit).
    Credit,
    /// Consumption by an approved request.
    Debit,
    /// Undo of a debit (cancellation).
    Reversal,
    /// Carried balance arriving in a new year.
    CarryIn,
    /// Remaining balance leaving a closed year.
    CloseOut,
    /// Balance extinguished by an expiry rule.
    Expiry,
    /// Invariant repair by the reconciliation job.
    Adjustment,
}

impl MovementKind {
    /// Returns the string representation stored in the journal.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "CREDIT",
            Self::Debit => "DEBIT",
            Self::Reversal => "REVERSAL",
            Self::CarryIn => "CARRY_IN",
            Self::CloseOut => "CLOSE_OUT",
            Self::Expiry => "EXPIRY",
            Self::Adjustment => "ADJUSTMENT",
        }
    }

    /// Parses a movement kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CREDIT" => Some(Self::Credit),
            "DEBIT" => Some(Self::Debit),
            "REVERSAL" => Some(Self::Reversal),
            "CARRY_IN" => Some(Self::CarryIn),
            "CLOSE_OUT" => Some(Self::CloseOut),
            "EXPIRY" => Some(Self::Expiry),
            "ADJUSTMENT" => Some(Self::Adjustment),
            _ => None,
        }
    }

    /// Sign of the movement's effect on `available`.
    #[must_use]
    pub const fn increases_available(&self) -> bool {
        matches!(self, Self::Credit | Self::Reversal | Self::CarryIn)
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
