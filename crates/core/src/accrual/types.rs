//! Accrual domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::leave::LeaveType;

/// The period an accrual run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccrualPeriod {
    /// A calendar month (India monthly accrual).
    Month {
        /// Year.
        year: i32,
        /// Month, 1-12.
        month: u32,
    },
    /// A calendar year (USA annual PTO).
    Year(i32),
}

impl AccrualPeriod {
    /// The balance year the accrual lands in.
    #[must_use]
    pub const fn year(&self) -> i32 {
        match self {
            Self::Month { year, .. } | Self::Year(year) => *year,
        }
    }
}

impl fmt::Display for AccrualPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Month { year, month } => write!(f, "{year}-{month:02}"),
            Self::Year(year) => write!(f, "{year}"),
        }
    }
}

/// One ledger credit the calculator asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualInstruction {
    /// Ledger to credit.
    pub leave_type: LeaveType,
    /// Amount in days.
    pub amount: Decimal,
    /// Reduced for a partial period.
    pub pro_rated: bool,
    /// Why this amount.
    pub reason: String,
}

/// Status recorded on a period's idempotency marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccrualStatus {
    /// Credited.
    Processed,
    /// Nothing credited because of an approved parental leave.
    SkippedMaternity,
}

impl AccrualStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "PROCESSED",
            Self::SkippedMaternity => "SKIPPED_MATERNITY",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PROCESSED" => Some(Self::Processed),
            "SKIPPED_MATERNITY" => Some(Self::SkippedMaternity),
            _ => None,
        }
    }
}

impl fmt::Display for AccrualStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why an employee earns nothing and gets no marker for a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ineligibility {
    /// The period's rule belongs to another country.
    OtherCountry,
    /// The employee is not active.
    Inactive,
    /// The period ends before the employee joined.
    BeforeJoining,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::OtherCountry => "policy does not apply to employee's country",
            Self::Inactive => "employee is not active",
            Self::BeforeJoining => "period precedes joining date",
        };
        f.write_str(text)
    }
}

/// What the calculator decided for one employee and period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccrualOutcome {
    /// Credit these amounts and record the period as processed.
    Credit(Vec<AccrualInstruction>),
    /// Credit nothing, but record the period as skipped.
    SkippedMaternity,
    /// Credit nothing and record nothing.
    NotEligible(Ineligibility),
}

impl AccrualOutcome {
    /// The marker status to record, if any.
    #[must_use]
    pub const fn status(&self) -> Option<AccrualStatus> {
        match self {
            Self::Credit(_) => Some(AccrualStatus::Processed),
            Self::SkippedMaternity => Some(AccrualStatus::SkippedMaternity),
            Self::NotEligible(_) => None,
        }
    }

    /// True if any instruction was pro-rated.
    #[must_use]
    pub fn is_pro_rated(&self) -> bool {
        match self {
            Self::Credit(instructions) => instructions.iter().any(|i| i.pro_rated),
            _ => false,
        }
    }

    /// Instructions to apply, empty unless crediting.
    #[must_use]
    pub fn instructions(&self) -> &[AccrualInstruction] {
        match self {
            Self::Credit(instructions) => instructions,
            _ => &[],
        }
    }
}
