//! Property-based tests for RequestValidator.
//!
//! Feature: request-validation
//! - Property 13: Overlap Always Rejected
//! - Property 14: Working Days Bounded By Calendar Days
//! - Property 15: Auto-Approval Implies Validity

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashSet;

use leaveledger_shared::types::{EmployeeId, LeaveRequestId};

use super::types::{ExistingRequest, IssueKind, LeaveRequestInput, ValidationContext};
use super::validator::RequestValidator;
use crate::calendar::DateRange;
use crate::employee::{
    Country, Designation, Employee, EmployeeStatus, Gender, MaritalStatus, Role,
};
use crate::leave::LeaveType;
use crate::workflow::{ApproverPool, RequestStatus};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

/// Strategy to generate a range starting within 60 days of the base date.
fn range_strategy() -> impl Strategy<Value = DateRange> {
    (0i64..60, 0i64..20).prop_map(|(offset, len)| {
        let start = base_date() + Duration::days(offset);
        DateRange::new(start, start + Duration::days(len))
    })
}

fn active_status() -> impl Strategy<Value = RequestStatus> {
    prop_oneof![Just(RequestStatus::Pending), Just(RequestStatus::Approved)]
}

fn employee() -> Employee {
    Employee {
        id: EmployeeId::new(),
        name: "Prop".to_string(),
        country: Country::India,
        location: "BLR".to_string(),
        designation: Designation::Associate,
        joining_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        gender: Gender::Female,
        marital_status: MaritalStatus::Married,
        status: EmployeeStatus::Active,
        role: Role::Employee,
        manager_id: None,
    }
}

fn request(e: &Employee, leave_type: LeaveType, range: DateRange) -> LeaveRequestInput {
    LeaveRequestInput {
        employee_id: e.id,
        leave_type,
        start_date: range.start,
        end_date: range.end,
        half_day: None,
        reason: String::new(),
        has_documentation: true,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 13: Overlap Always Rejected**
    ///
    /// *For any* pending or approved request, a new request whose range
    /// intersects it is invalid with an Overlap error.
    #[test]
    fn prop_overlap_rejected(
        new_range in range_strategy(),
        old_range in range_strategy(),
        status in active_status(),
    ) {
        let e = employee();
        let holidays = HashSet::new();
        let existing = [ExistingRequest {
            id: LeaveRequestId::new(),
            leave_type: LeaveType::Privilege,
            range: old_range,
            total_days: Decimal::ONE,
            status,
        }];
        let ctx = ValidationContext {
            employee: &e,
            today: base_date(),
            holidays: &holidays,
            available: Decimal::from(100),
            existing: &existing,
            approvers: ApproverPool { manager: Some(EmployeeId::new()), ..ApproverPool::default() },
            max_future_days: 365,
            max_past_days: 30,
        };

        let verdict = RequestValidator::validate(&request(&e, LeaveType::Privilege, new_range), &ctx);
        let intersects = new_range.start <= old_range.end && old_range.start <= new_range.end;
        prop_assert_eq!(verdict.has_error(IssueKind::Overlap), intersects);
        if intersects {
            prop_assert!(!verdict.valid);
        }
    }

    /// **Property 14: Working Days Bounded By Calendar Days**
    ///
    /// *For any* ordered range and holiday set, the computed total is
    /// between zero and the calendar length.
    #[test]
    fn prop_total_days_bounded(
        range in range_strategy(),
        holiday_offsets in prop::collection::hash_set(0i64..80, 0..10),
    ) {
        let e = employee();
        let holidays: HashSet<NaiveDate> = holiday_offsets
            .into_iter()
            .map(|o| base_date() + Duration::days(o))
            .collect();
        let ctx = ValidationContext {
            employee: &e,
            today: base_date(),
            holidays: &holidays,
            available: Decimal::from(100),
            existing: &[],
            approvers: ApproverPool::default(),
            max_future_days: 365,
            max_past_days: 30,
        };
        let verdict = RequestValidator::validate(&request(&e, LeaveType::LeaveWithoutPay, range), &ctx);
        prop_assert!(verdict.total_days >= Decimal::ZERO);
        prop_assert!(verdict.total_days <= Decimal::from(range.calendar_days()));
    }

    /// **Property 15: Auto-Approval Implies Validity**
    ///
    /// *For any* request, auto-approval eligibility implies a valid,
    /// short, auto-approvable request without required documentation.
    #[test]
    fn prop_auto_approval_implies_valid(
        range in range_strategy(),
        leave_type in prop::sample::select(LeaveType::ALL.to_vec()),
        available in 0i64..10,
    ) {
        let e = employee();
        let holidays = HashSet::new();
        let ctx = ValidationContext {
            employee: &e,
            today: base_date(),
            holidays: &holidays,
            available: Decimal::from(available),
            existing: &[],
            approvers: ApproverPool { manager: Some(EmployeeId::new()), ..ApproverPool::default() },
            max_future_days: 365,
            max_past_days: 30,
        };
        let verdict = RequestValidator::validate(&request(&e, leave_type, range), &ctx);
        if verdict.auto_approval_eligible {
            prop_assert!(verdict.valid);
            prop_assert!(verdict.total_days <= Decimal::TWO);
            prop_assert!(leave_type.policy().auto_approvable);
            prop_assert!(!verdict.required_documentation);
        }
    }
}
