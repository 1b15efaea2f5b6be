//! Property-based tests for the accrual calculator.
//!
//! Feature: accrual
//! - Property 11: Monthly Accrual Bounds
//! - Property 12: Annual PTO Never Exceeds Full Rate

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use leaveledger_shared::types::{EmployeeId, is_half_day_multiple};

use super::calculator::AccrualCalculator;
use super::types::AccrualOutcome;
use crate::employee::{
    Country, Designation, Employee, EmployeeStatus, Gender, MaritalStatus, Role,
};

fn joining_strategy() -> impl Strategy<Value = NaiveDate> {
    (2018i32..=2026, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn designation_strategy() -> impl Strategy<Value = Designation> {
    prop::sample::select(vec![
        Designation::Associate,
        Designation::SeniorAssociate,
        Designation::Manager,
        Designation::SeniorManager,
        Designation::Avp,
        Designation::Vp,
        Designation::Svp,
        Designation::Evp,
    ])
}

fn employee(country: Country, joining: NaiveDate, designation: Designation) -> Employee {
    Employee {
        id: EmployeeId::new(),
        name: "Prop".to_string(),
        country,
        location: "HQ".to_string(),
        designation,
        joining_date: joining,
        gender: Gender::Other,
        marital_status: MaritalStatus::Single,
        status: EmployeeStatus::Active,
        role: Role::Employee,
        manager_id: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 11: Monthly Accrual Bounds**
    ///
    /// *For any* joining date and target month, monthly accrual credits
    /// either nothing or the same half-day amount of at most one day to
    /// each of CL and PL, and never credits a month before joining.
    #[test]
    fn prop_monthly_bounds(
        joining in joining_strategy(),
        year in 2018i32..=2026,
        month in 1u32..=12,
    ) {
        let e = employee(Country::India, joining, Designation::Associate);
        let outcome = AccrualCalculator::monthly(&e, year, month, &[]).unwrap();
        let before_joining = (year, month) < (joining.year(), joining.month());

        match outcome {
            AccrualOutcome::Credit(instructions) => {
                prop_assert!(!before_joining);
                prop_assert_eq!(instructions.len(), 2);
                let amount = instructions[0].amount;
                prop_assert!(instructions.iter().all(|i| i.amount == amount));
                prop_assert!(amount > Decimal::ZERO && amount <= Decimal::ONE);
                prop_assert!(is_half_day_multiple(amount));
            }
            AccrualOutcome::NotEligible(_) => prop_assert!(before_joining),
            AccrualOutcome::SkippedMaternity => prop_assert!(false, "no parental leave given"),
        }
    }

    /// **Property 12: Annual PTO Never Exceeds Full Rate**
    ///
    /// *For any* USA employee, annual PTO is a whole number of days no
    /// larger than the designation's full rate, and equal to it when the
    /// employee joined before the year.
    #[test]
    fn prop_annual_pto_bounded(
        joining in joining_strategy(),
        designation in designation_strategy(),
        year in 2018i32..=2026,
    ) {
        let e = employee(Country::Usa, joining, designation);
        let rate = AccrualCalculator::annual_pto_rate(&e);

        if let AccrualOutcome::Credit(instructions) = AccrualCalculator::annual_pto(&e, year) {
            let amount = instructions[0].amount;
            prop_assert!(amount.fract().is_zero());
            prop_assert!(amount >= Decimal::ONE && amount <= rate);
            if joining.year() < year {
                prop_assert_eq!(amount, rate);
            }
        } else {
            prop_assert!(joining.year() > year);
        }
    }
}
