//! Leave type catalogue and the per-type policy table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::workflow::chain::ChainThresholds;

/// Kinds of leave the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeaveType {
    /// Casual leave (CL).
    #[serde(rename = "CL")]
    Casual,
    /// Privilege / earned leave (PL).
    #[serde(rename = "PL")]
    Privilege,
    /// Sick leave (SL).
    #[serde(rename = "SL")]
    Sick,
    /// Maternity leave (ML).
    #[serde(rename = "ML")]
    Maternity,
    /// Paternity leave (PTL).
    #[serde(rename = "PTL")]
    Paternity,
    /// Bereavement leave (BL).
    #[serde(rename = "BL")]
    Bereavement,
    /// Marriage leave (MRL).
    #[serde(rename = "MRL")]
    Marriage,
    /// Compensatory off (CO), earned by weekend/holiday work.
    #[serde(rename = "CO")]
    CompOff,
    /// Leave without pay (LWP).
    #[serde(rename = "LWP")]
    LeaveWithoutPay,
    /// USA paid time off (PTO).
    #[serde(rename = "PTO")]
    Pto,
}

/// When a request must be backed by documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentationRule {
    /// Never required.
    Never,
    /// Always required.
    Always,
    /// Required when the request exceeds this many working days.
    AboveDays(Decimal),
}

impl DocumentationRule {
    /// Returns true if a request of `days` needs documentation.
    #[must_use]
    pub fn requires(&self, days: Decimal) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::AboveDays(threshold) => days > *threshold,
        }
    }
}

/// Policy attached to a leave type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeavePolicy {
    /// Whether requests draw down a ledger balance.
    pub ledger_tracked: bool,
    /// Longest single request, in working days.
    pub max_consecutive_days: Decimal,
    /// Documentation requirement.
    pub documentation: DocumentationRule,
    /// Approval chain thresholds.
    pub chain: ChainThresholds,
    /// Short requests of this type may skip the approval chain.
    pub auto_approvable: bool,
}

impl LeaveType {
    /// All leave types, in catalogue order.
    pub const ALL: [Self; 10] = [
        Self::Casual,
        Self::Privilege,
        Self::Sick,
        Self::Maternity,
        Self::Paternity,
        Self::Bereavement,
        Self::Marriage,
        Self::CompOff,
        Self::LeaveWithoutPay,
        Self::Pto,
    ];

    /// Returns the short code stored in the database.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Casual => "CL",
            Self::Privilege => "PL",
            Self::Sick => "SL",
            Self::Maternity => "ML",
            Self::Paternity => "PTL",
            Self::Bereavement => "BL",
            Self::Marriage => "MRL",
            Self::CompOff => "CO",
            Self::LeaveWithoutPay => "LWP",
            Self::Pto => "PTO",
        }
    }

    /// Parses a leave type from its code or long name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CL" | "CASUAL" => Some(Self::Casual),
            "PL" | "EL" | "PRIVILEGE" | "EARNED" => Some(Self::Privilege),
            "SL" | "SICK" => Some(Self::Sick),
            "ML" | "MATERNITY" => Some(Self::Maternity),
            "PTL" | "PATERNITY" => Some(Self::Paternity),
            "BL" | "BEREAVEMENT" => Some(Self::Bereavement),
            "MRL" | "MARRIAGE" => Some(Self::Marriage),
            "CO" | "COMP_OFF" | "COMPOFF" => Some(Self::CompOff),
            "LWP" => Some(Self::LeaveWithoutPay),
            "PTO" => Some(Self::Pto),
            _ => None,
        }
    }

    /// Maternity or paternity leave.
    #[must_use]
    pub const fn is_parental(&self) -> bool {
        matches!(self, Self::Maternity | Self::Paternity)
    }

    /// Types that may not overlap an approved parental leave.
    #[must_use]
    pub const fn excluded_during_parental(&self) -> bool {
        matches!(self, Self::Casual | Self::Privilege)
    }

    /// Returns true if requests of this type debit a ledger balance.
    #[must_use]
    pub fn is_ledger_tracked(&self) -> bool {
        self.policy().ledger_tracked
    }

    /// Returns the policy for this leave type.
    #[must_use]
    pub fn policy(&self) -> LeavePolicy {
        let standard = ChainThresholds::standard();
        let hr_always = ChainThresholds {
            hr_always: true,
            ..standard
        };

        match self {
            Self::Casual => LeavePolicy {
                ledger_tracked: true,
                max_consecutive_days: Decimal::from(5),
                documentation: DocumentationRule::Never,
                chain: standard,
                auto_approvable: true,
            },
            Self::Privilege | Self::Pto => LeavePolicy {
                ledger_tracked: true,
                max_consecutive_days: Decimal::from(30),
                documentation: DocumentationRule::Never,
                chain: standard,
                auto_approvable: false,
            },
            Self::Sick => LeavePolicy {
                ledger_tracked: true,
                max_consecutive_days: Decimal::from(15),
                documentation: DocumentationRule::AboveDays(Decimal::from(3)),
                chain: standard,
                auto_approvable: false,
            },
            Self::Maternity => LeavePolicy {
                ledger_tracked: false,
                max_consecutive_days: Decimal::from(182),
                documentation: DocumentationRule::Always,
                chain: hr_always,
                auto_approvable: false,
            },
            Self::Paternity => LeavePolicy {
                ledger_tracked: false,
                max_consecutive_days: Decimal::from(15),
                documentation: DocumentationRule::Never,
                chain: hr_always,
                auto_approvable: false,
            },
            Self::Bereavement | Self::Marriage => LeavePolicy {
                ledger_tracked: false,
                max_consecutive_days: Decimal::from(5),
                documentation: DocumentationRule::Never,
                chain: hr_always,
                auto_approvable: false,
            },
            Self::CompOff => LeavePolicy {
                ledger_tracked: true,
                max_consecutive_days: Decimal::from(5),
                documentation: DocumentationRule::Never,
                chain: ChainThresholds {
                    hr_always: false,
                    hr_above_days: Some(Decimal::from(3)),
                    third_level_above_days: None,
                },
                auto_approvable: true,
            },
            Self::LeaveWithoutPay => LeavePolicy {
                ledger_tracked: false,
                max_consecutive_days: Decimal::from(180),
                documentation: DocumentationRule::AboveDays(Decimal::from(30)),
                chain: ChainThresholds {
                    hr_always: true,
                    hr_above_days: None,
                    third_level_above_days: Some(Decimal::from(90)),
                },
                auto_approvable: false,
            },
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Which half of a single day a half-day request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HalfDaySession {
    /// Morning.
    FirstHalf,
    /// Afternoon.
    SecondHalf,
}

impl HalfDaySession {
    /// Returns the string representation of the session.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FirstHalf => "FIRST_HALF",
            Self::SecondHalf => "SECOND_HALF",
        }
    }

    /// Parses a session from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "FIRST_HALF" => Some(Self::FirstHalf),
            "SECOND_HALF" => Some(Self::SecondHalf),
            _ => None,
        }
    }
}
