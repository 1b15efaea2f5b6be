//! Comp-off eligibility, expiry and lot allocation.

use chrono::{Duration, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use leaveledger_shared::types::{CompOffGrantId, HALF_DAY};

use crate::calendar::is_weekend;
use crate::validation::{IssueKind, ValidationIssue};

/// Lifecycle of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantStatus {
    /// Has remaining days.
    Active,
    /// Fully consumed.
    Exhausted,
    /// Lapsed with its remainder extinguished.
    Expired,
}

impl GrantStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Exhausted => "EXHAUSTED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "EXHAUSTED" => Some(Self::Exhausted),
            "EXPIRED" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Status for a lot holding `remaining` days.
    #[must_use]
    pub fn for_remaining(remaining: Decimal) -> Self {
        if remaining > Decimal::ZERO {
            Self::Active
        } else {
            Self::Exhausted
        }
    }
}

impl fmt::Display for GrantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A grant as the allocation logic sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantLot {
    /// Grant id.
    pub id: CompOffGrantId,
    /// Last day the grant may be used.
    pub expires_on: NaiveDate,
    /// Days originally granted.
    pub granted: Decimal,
    /// Days not yet consumed.
    pub remaining: Decimal,
}

/// Amount taken from or returned to one lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotAllocation {
    /// Grant id.
    pub grant_id: CompOffGrantId,
    /// Days.
    pub amount: Decimal,
    /// Remaining days after the allocation.
    pub remaining_after: Decimal,
}

/// How a redemption is spread across lots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionPlan {
    /// Per-lot allocations.
    pub allocations: Vec<LotAllocation>,
    /// Part of the request no lot could cover.
    pub uncovered: Decimal,
}

/// Stateless comp-off rules.
pub struct CompOffRules;

impl CompOffRules {
    /// Oldest work date that may still be claimed, in days before today.
    pub const MAX_CLAIM_AGE_DAYS: i64 = 30;

    /// Validates a work-log claim.
    #[must_use]
    pub fn validate_work_log(
        work_date: NaiveDate,
        days: Decimal,
        today: NaiveDate,
        holidays: &HashSet<NaiveDate>,
    ) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if !is_weekend(work_date) && !holidays.contains(&work_date) {
            issues.push(ValidationIssue::new(
                IssueKind::NotNonWorkingDay,
                "work_date",
                format!("{work_date} is neither a weekend day nor a holiday"),
            ));
        }
        if work_date > today {
            issues.push(ValidationIssue::new(
                IssueKind::TooFarInFuture,
                "work_date",
                "work date is in the future",
            ));
        }
        if work_date < today - Duration::days(Self::MAX_CLAIM_AGE_DAYS) {
            issues.push(ValidationIssue::new(
                IssueKind::TooFarInPast,
                "work_date",
                format!(
                    "work date is more than {} days in the past",
                    Self::MAX_CLAIM_AGE_DAYS
                ),
            ));
        }
        if days != HALF_DAY && days != Decimal::ONE {
            issues.push(ValidationIssue::new(
                IssueKind::InvalidAmount,
                "days",
                format!("comp-off must be 0.5 or 1 day, got {days}"),
            ));
        }
        issues
    }

    /// Last redeemable day of a grant approved on `approved_on`.
    #[must_use]
    pub fn grant_expiry(approved_on: NaiveDate, months: u32) -> Option<NaiveDate> {
        approved_on.checked_add_months(Months::new(months))
    }

    /// True once a grant expiring on `expires_on` has lapsed.
    #[must_use]
    pub fn is_expired(expires_on: NaiveDate, today: NaiveDate) -> bool {
        today > expires_on
    }

    /// True if the grant is still valid but lapses within `window_days`.
    #[must_use]
    pub fn expires_within(expires_on: NaiveDate, today: NaiveDate, window_days: i64) -> bool {
        !Self::is_expired(expires_on, today) && expires_on <= today + Duration::days(window_days)
    }

    /// Consumes `amount` from lots, earliest expiry first.
    ///
    /// Lots already expired as of `today` are not used.
    #[must_use]
    pub fn redemption_plan(lots: &[GrantLot], amount: Decimal, today: NaiveDate) -> RedemptionPlan {
        let mut usable: Vec<&GrantLot> = lots
            .iter()
            .filter(|lot| lot.remaining > Decimal::ZERO && !Self::is_expired(lot.expires_on, today))
            .collect();
        usable.sort_by_key(|lot| (lot.expires_on, lot.id));

        let mut outstanding = amount.max(Decimal::ZERO);
        let mut allocations = Vec::new();
        for lot in usable {
            if outstanding.is_zero() {
                break;
            }
            let take = outstanding.min(lot.remaining);
            outstanding -= take;
            allocations.push(LotAllocation {
                grant_id: lot.id,
                amount: take,
                remaining_after: lot.remaining - take,
            });
        }

        RedemptionPlan {
            allocations,
            uncovered: outstanding,
        }
    }

    /// Returns `amount` to consumed lots, latest expiry first.
    ///
    /// A lot never receives more than it has had consumed. Whatever no lot
    /// can absorb is reported as uncovered.
    #[must_use]
    pub fn restoration_plan(lots: &[GrantLot], amount: Decimal) -> RedemptionPlan {
        let mut consumed: Vec<&GrantLot> = lots
            .iter()
            .filter(|lot| lot.granted > lot.remaining)
            .collect();
        consumed.sort_by_key(|lot| std::cmp::Reverse((lot.expires_on, lot.id)));

        let mut outstanding = amount.max(Decimal::ZERO);
        let mut allocations = Vec::new();
        for lot in consumed {
            if outstanding.is_zero() {
                break;
            }
            let give = outstanding.min(lot.granted - lot.remaining);
            outstanding -= give;
            allocations.push(LotAllocation {
                grant_id: lot.id,
                amount: give,
                remaining_after: lot.remaining + give,
            });
        }

        RedemptionPlan {
            allocations,
            uncovered: outstanding,
        }
    }
}
