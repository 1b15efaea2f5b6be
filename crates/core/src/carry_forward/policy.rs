//! Carry-forward rules.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use leaveledger_shared::PolicyConfig;

use crate::employee::{Country, Employee};
use crate::leave::LeaveType;

/// How a leave type behaves at year end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarryForwardRule {
    /// Not ledger-tracked, or not applicable to the employee's country.
    Skip,
    /// The whole closing balance lapses.
    Lapse,
    /// Carry up to the cap, the rest lapses.
    Capped(Decimal),
    /// Carry everything.
    Full,
}

/// Status of a carry-forward run record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarryForwardStatus {
    /// Some amount moved to the next year.
    Carried,
    /// Nothing moved.
    Lapsed,
    /// Carried amount later extinguished by the expiry job.
    Expired,
}

impl CarryForwardStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Carried => "CARRIED",
            Self::Lapsed => "LAPSED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "CARRIED" => Some(Self::Carried),
            "LAPSED" => Some(Self::Lapsed),
            "EXPIRED" => Some(Self::Expired),
            _ => None,
        }
    }
}

impl fmt::Display for CarryForwardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Split of a closing balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarryForwardPlan {
    /// Amount removed from the closing year.
    pub closing: Decimal,
    /// Amount credited to the next year.
    pub carried: Decimal,
    /// Amount that lapses.
    pub lapsed: Decimal,
}

impl CarryForwardPlan {
    /// Run-record status for this plan.
    #[must_use]
    pub fn status(&self) -> CarryForwardStatus {
        if self.carried > Decimal::ZERO {
            CarryForwardStatus::Carried
        } else {
            CarryForwardStatus::Lapsed
        }
    }
}

/// Carry-forward policy parameterized by configuration.
#[derive(Debug, Clone)]
pub struct CarryForwardPolicy {
    config: PolicyConfig,
}

impl CarryForwardPolicy {
    /// Creates a policy from configuration.
    #[must_use]
    pub const fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Leave types the year-end job looks at for `country`.
    #[must_use]
    pub fn types_for(country: Country) -> &'static [LeaveType] {
        match country {
            Country::India => &[
                LeaveType::Casual,
                LeaveType::Privilege,
                LeaveType::Sick,
                LeaveType::CompOff,
            ],
            Country::Usa => &[LeaveType::Pto, LeaveType::Sick, LeaveType::CompOff],
        }
    }

    /// Year-end rule for one employee and leave type.
    #[must_use]
    pub fn rule_for(&self, employee: &Employee, leave_type: LeaveType) -> CarryForwardRule {
        if !leave_type.is_ledger_tracked() {
            return CarryForwardRule::Skip;
        }
        match (employee.country, leave_type) {
            (Country::India, LeaveType::Privilege) => {
                CarryForwardRule::Capped(self.config.india_privilege_carry_forward_cap)
            }
            (Country::Usa, LeaveType::Pto) => {
                if employee.designation.is_vp_or_above() {
                    CarryForwardRule::Capped(self.config.usa_carry_forward_cap_senior)
                } else {
                    CarryForwardRule::Capped(self.config.usa_carry_forward_cap_standard)
                }
            }
            (_, LeaveType::CompOff) => CarryForwardRule::Full,
            (Country::India, LeaveType::Pto) | (Country::Usa, LeaveType::Casual | LeaveType::Privilege) => {
                CarryForwardRule::Skip
            }
            _ => CarryForwardRule::Lapse,
        }
    }

    /// Splits a closing available balance according to `rule`.
    #[must_use]
    pub fn plan(rule: CarryForwardRule, closing_available: Decimal) -> CarryForwardPlan {
        let closing = closing_available.max(Decimal::ZERO);
        let carried = match rule {
            CarryForwardRule::Skip | CarryForwardRule::Lapse => Decimal::ZERO,
            CarryForwardRule::Capped(cap) => closing.min(cap.max(Decimal::ZERO)),
            CarryForwardRule::Full => closing,
        };
        CarryForwardPlan {
            closing,
            carried,
            lapsed: closing - carried,
        }
    }

    /// Last day carried USA PTO may be used in `year`.
    #[must_use]
    pub fn usa_expiry_date(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(
            year,
            self.config.usa_carry_forward_expiry_month,
            self.config.usa_carry_forward_expiry_day,
        )
    }

    /// True once carried PTO for `year` has expired as of `today`.
    #[must_use]
    pub fn usa_carry_forward_expired(&self, year: i32, today: NaiveDate) -> bool {
        self.usa_expiry_date(year).is_some_and(|last| today > last)
    }
}
