//! Date ranges and working-day counting.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use leaveledger_shared::types::HALF_DAY;

use crate::leave::HalfDaySession;

/// An inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive).
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range; `start` may be after `end`, see [`DateRange::is_ordered`].
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The whole calendar month `year-month`, or `None` for an invalid month.
    #[must_use]
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self { start, end })
    }

    /// Returns true if `start <= end`.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// Returns true if `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Three-way interval overlap test against an existing range.
    ///
    /// The ranges overlap when this range starts inside the other, ends
    /// inside the other, or encloses it entirely.
    #[must_use]
    pub fn overlaps(&self, existing: &Self) -> bool {
        let starts_inside = existing.contains(self.start);
        let ends_inside = existing.contains(self.end);
        let encloses = self.start <= existing.start && self.end >= existing.end;
        starts_inside || ends_inside || encloses
    }

    /// Calendar days in the range, inclusive.
    #[must_use]
    pub fn calendar_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Iterates over every date in the range.
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start
            .iter_days()
            .take_while(move |day| *day <= self.end)
    }
}

/// Returns true for Saturday and Sunday.
#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Counts business days in `range`, excluding weekends and `holidays`.
///
/// Whole weeks are counted arithmetically, so the cost does not grow with
/// the length of the range.
#[must_use]
pub fn working_days(range: &DateRange, holidays: &HashSet<NaiveDate>) -> u32 {
    if !range.is_ordered() {
        return 0;
    }
    let full_weeks = range.calendar_days() / 7;
    let tail = DateRange::new(range.start + Duration::days(full_weeks * 7), range.end);
    let tail_weekdays = tail.iter_days().filter(|day| !is_weekend(*day)).count();
    let closed = holidays
        .iter()
        .filter(|day| range.contains(**day) && !is_weekend(**day))
        .count();
    let count = full_weeks * 5 + i64::try_from(tail_weekdays).unwrap_or(0)
        - i64::try_from(closed).unwrap_or(0);
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Working days a request consumes.
///
/// A half-day session halves a single working day; it is ignored by the
/// caller's validation for multi-day ranges, so here it only applies when
/// the range has exactly one working day.
#[must_use]
pub fn requested_days(
    range: &DateRange,
    half_day: Option<HalfDaySession>,
    holidays: &HashSet<NaiveDate>,
) -> Decimal {
    let days = working_days(range, holidays);
    match (half_day, days) {
        (Some(_), 1) => HALF_DAY,
        _ => Decimal::from(days),
    }
}
