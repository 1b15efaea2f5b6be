//! Accrual calculator.
//!
//! India: 1 CL + 1 PL per month; in the joining month 1 day each if the
//! employee joined on or before the 15th, otherwise half a day; nothing
//! before the joining month; nothing for a month touched by an approved
//! maternity or paternity leave.
//!
//! USA: one PTO credit per year, 15 days below VP and 20 days from VP up,
//! pro-rated by remaining months (joining month included) and rounded to a
//! whole day.

use chrono::Datelike;
use rust_decimal::{Decimal, RoundingStrategy};

use leaveledger_shared::types::HALF_DAY;

use crate::accrual::error::AccrualError;
use crate::accrual::types::{AccrualInstruction, AccrualOutcome, AccrualPeriod, Ineligibility};
use crate::calendar::DateRange;
use crate::employee::{Country, Employee};
use crate::leave::LeaveType;

/// Last joining day that still earns a full first month.
const FULL_MONTH_CUTOFF_DAY: u32 = 15;

/// Stateless accrual calculator.
pub struct AccrualCalculator;

impl AccrualCalculator {
    /// Types credited by India monthly accrual.
    pub const MONTHLY_TYPES: [LeaveType; 2] = [LeaveType::Casual, LeaveType::Privilege];

    /// Computes the accrual for `employee` over `period`.
    ///
    /// `parental_leaves` are the employee's approved maternity/paternity
    /// date ranges; any overlap with a monthly period suspends it.
    pub fn compute(
        employee: &Employee,
        period: AccrualPeriod,
        parental_leaves: &[DateRange],
    ) -> Result<AccrualOutcome, AccrualError> {
        match period {
            AccrualPeriod::Month { year, month } => {
                Self::monthly(employee, year, month, parental_leaves)
            }
            AccrualPeriod::Year(year) => Ok(Self::annual_pto(employee, year)),
        }
    }

    /// India monthly CL/PL accrual.
    pub fn monthly(
        employee: &Employee,
        year: i32,
        month: u32,
        parental_leaves: &[DateRange],
    ) -> Result<AccrualOutcome, AccrualError> {
        let range = DateRange::month(year, month).ok_or(AccrualError::InvalidPeriod { year, month })?;

        if employee.country != Country::India {
            return Ok(AccrualOutcome::NotEligible(Ineligibility::OtherCountry));
        }
        if !employee.is_active() {
            return Ok(AccrualOutcome::NotEligible(Ineligibility::Inactive));
        }

        let joining = employee.joining_date;
        if joining > range.end {
            return Ok(AccrualOutcome::NotEligible(Ineligibility::BeforeJoining));
        }

        if parental_leaves.iter().any(|leave| range.overlaps(leave)) {
            return Ok(AccrualOutcome::SkippedMaternity);
        }

        let (amount, reason) = if range.contains(joining) {
            if joining.day() <= FULL_MONTH_CUTOFF_DAY {
                (Decimal::ONE, format!("joined {joining}, on or before the 15th"))
            } else {
                (HALF_DAY, format!("joined {joining}, after the 15th"))
            }
        } else {
            (Decimal::ONE, format!("monthly accrual {year}-{month:02}"))
        };

        Ok(AccrualOutcome::Credit(
            Self::MONTHLY_TYPES
                .iter()
                .map(|leave_type| AccrualInstruction {
                    leave_type: *leave_type,
                    amount,
                    pro_rated: amount < Decimal::ONE,
                    reason: reason.clone(),
                })
                .collect(),
        ))
    }

    /// USA annual PTO accrual.
    #[must_use]
    pub fn annual_pto(employee: &Employee, year: i32) -> AccrualOutcome {
        if employee.country != Country::Usa {
            return AccrualOutcome::NotEligible(Ineligibility::OtherCountry);
        }
        if !employee.is_active() {
            return AccrualOutcome::NotEligible(Ineligibility::Inactive);
        }

        let joining = employee.joining_date;
        if joining.year() > year {
            return AccrualOutcome::NotEligible(Ineligibility::BeforeJoining);
        }

        let rate = Self::annual_pto_rate(employee);
        let remaining_months = if joining.year() == year {
            12 - joining.month() + 1
        } else {
            12
        };

        let amount = (rate * Decimal::from(remaining_months) / Decimal::from(12))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let pro_rated = remaining_months < 12;
        let reason = if pro_rated {
            format!("{rate} days pro-rated over {remaining_months} of 12 months")
        } else {
            format!("{rate} days annual entitlement")
        };

        AccrualOutcome::Credit(vec![AccrualInstruction {
            leave_type: LeaveType::Pto,
            amount,
            pro_rated,
            reason,
        }])
    }

    /// Full-year PTO entitlement for the employee's designation.
    #[must_use]
    pub fn annual_pto_rate(employee: &Employee) -> Decimal {
        if employee.designation.is_vp_or_above() {
            Decimal::from(20)
        } else {
            Decimal::from(15)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::{Designation, EmployeeStatus, Gender, MaritalStatus, Role};
    use crate::accrual::types::AccrualStatus;
    use chrono::NaiveDate;
    use leaveledger_shared::types::EmployeeId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee(country: Country, joining: NaiveDate) -> Employee {
        Employee {
            id: EmployeeId::new(),
            name: "Asha".to_string(),
            country,
            location: "BLR".to_string(),
            designation: Designation::Associate,
            joining_date: joining,
            gender: Gender::Female,
            marital_status: MaritalStatus::Married,
            status: EmployeeStatus::Active,
            role: Role::Employee,
            manager_id: None,
        }
    }

    fn amounts(outcome: &AccrualOutcome) -> Vec<(LeaveType, Decimal)> {
        outcome
            .instructions()
            .iter()
            .map(|i| (i.leave_type, i.amount))
            .collect()
    }

    #[rstest]
    #[case(date(2024, 3, 10), dec!(1))]
    #[case(date(2024, 3, 15), dec!(1))]
    #[case(date(2024, 3, 16), dec!(0.5))]
    #[case(date(2024, 3, 20), dec!(0.5))]
    fn test_joining_month_pro_ration(#[case] joining: NaiveDate, #[case] expected: Decimal) {
        let e = employee(Country::India, joining);
        let outcome = AccrualCalculator::monthly(&e, 2024, 3, &[]).unwrap();
        assert_eq!(
            amounts(&outcome),
            vec![(LeaveType::Casual, expected), (LeaveType::Privilege, expected)]
        );
        assert_eq!(outcome.is_pro_rated(), expected < Decimal::ONE);
    }

    #[test]
    fn test_regular_month() {
        let e = employee(Country::India, date(2020, 1, 1));
        let outcome = AccrualCalculator::monthly(&e, 2024, 3, &[]).unwrap();
        assert_eq!(outcome.status(), Some(AccrualStatus::Processed));
        assert_eq!(
            amounts(&outcome),
            vec![(LeaveType::Casual, dec!(1)), (LeaveType::Privilege, dec!(1))]
        );
    }

    #[test]
    fn test_no_accrual_before_joining_month() {
        let e = employee(Country::India, date(2024, 4, 1));
        let outcome = AccrualCalculator::monthly(&e, 2024, 3, &[]).unwrap();
        assert_eq!(
            outcome,
            AccrualOutcome::NotEligible(Ineligibility::BeforeJoining)
        );
        assert_eq!(outcome.status(), None);
    }

    #[test]
    fn test_maternity_suspends_every_touched_month() {
        let e = employee(Country::India, date(2020, 1, 1));
        let leave = [DateRange::new(date(2024, 4, 1), date(2024, 9, 30))];
        for month in 4..=9 {
            let outcome = AccrualCalculator::monthly(&e, 2024, month, &leave).unwrap();
            assert_eq!(outcome, AccrualOutcome::SkippedMaternity, "month {month}");
        }
        assert!(matches!(
            AccrualCalculator::monthly(&e, 2024, 3, &leave).unwrap(),
            AccrualOutcome::Credit(_)
        ));
        assert!(matches!(
            AccrualCalculator::monthly(&e, 2024, 10, &leave).unwrap(),
            AccrualOutcome::Credit(_)
        ));
    }

    #[test]
    fn test_partial_overlap_still_suspends() {
        let e = employee(Country::India, date(2020, 1, 1));
        let leave = [DateRange::new(date(2024, 2, 20), date(2024, 3, 1))];
        assert_eq!(
            AccrualCalculator::monthly(&e, 2024, 3, &leave).unwrap(),
            AccrualOutcome::SkippedMaternity
        );
    }

    #[test]
    fn test_inactive_and_other_country() {
        let mut e = employee(Country::India, date(2020, 1, 1));
        e.status = EmployeeStatus::Inactive;
        assert_eq!(
            AccrualCalculator::monthly(&e, 2024, 3, &[]).unwrap(),
            AccrualOutcome::NotEligible(Ineligibility::Inactive)
        );
        let us = employee(Country::Usa, date(2020, 1, 1));
        assert_eq!(
            AccrualCalculator::monthly(&us, 2024, 3, &[]).unwrap(),
            AccrualOutcome::NotEligible(Ineligibility::OtherCountry)
        );
    }

    #[test]
    fn test_invalid_month() {
        let e = employee(Country::India, date(2020, 1, 1));
        assert!(matches!(
            AccrualCalculator::monthly(&e, 2024, 13, &[]),
            Err(AccrualError::InvalidPeriod { month: 13, .. })
        ));
    }

    #[rstest]
    #[case(Designation::Associate, date(2020, 5, 1), dec!(15))]
    #[case(Designation::Avp, date(2020, 5, 1), dec!(15))]
    #[case(Designation::Vp, date(2020, 5, 1), dec!(20))]
    #[case(Designation::Associate, date(2024, 1, 20), dec!(15))]
    // 15 * 7 / 12 = 8.75
    #[case(Designation::Associate, date(2024, 6, 3), dec!(9))]
    // 20 * 6 / 12 = 10
    #[case(Designation::Svp, date(2024, 7, 1), dec!(10))]
    // 15 * 1 / 12 = 1.25
    #[case(Designation::Manager, date(2024, 12, 31), dec!(1))]
    // 15 * 2 / 12 = 2.5 rounds away from zero
    #[case(Designation::Manager, date(2024, 11, 1), dec!(3))]
    fn test_annual_pto(
        #[case] designation: Designation,
        #[case] joining: NaiveDate,
        #[case] expected: Decimal,
    ) {
        let mut e = employee(Country::Usa, joining);
        e.designation = designation;
        let outcome = AccrualCalculator::annual_pto(&e, 2024);
        assert_eq!(amounts(&outcome), vec![(LeaveType::Pto, expected)]);
    }

    #[test]
    fn test_annual_pto_not_before_joining_year() {
        let e = employee(Country::Usa, date(2025, 2, 1));
        assert_eq!(
            AccrualCalculator::annual_pto(&e, 2024),
            AccrualOutcome::NotEligible(Ineligibility::BeforeJoining)
        );
    }
}
