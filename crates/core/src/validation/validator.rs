//! Request validator.
//!
//! Checks run in a fixed order. Only a reversed date range stops
//! validation early; every other check adds to the issue list.

use chrono::Duration;
use rust_decimal::Decimal;

use crate::calendar::{requested_days, working_days};
use crate::employee::{Gender, MaritalStatus, Role};
use crate::leave::LeaveType;
use crate::validation::types::{
    IssueKind, LeaveRequestInput, ValidationContext, ValidationIssue, ValidationVerdict,
};
use crate::workflow::{ApprovalChainBuilder, RequestStatus};

/// Longest request that may skip the approval chain, in working days.
const AUTO_APPROVAL_MAX_DAYS: Decimal = Decimal::TWO;

/// Stateless request validator.
pub struct RequestValidator;

impl RequestValidator {
    /// Validates `input` against `ctx`.
    #[must_use]
    pub fn validate(input: &LeaveRequestInput, ctx: &ValidationContext<'_>) -> ValidationVerdict {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let range = input.range();
        let policy = input.leave_type.policy();

        if !range.is_ordered() {
            errors.push(ValidationIssue::new(
                IssueKind::InvalidDateRange,
                "end_date",
                format!(
                    "end date {} is before start date {}",
                    input.end_date, input.start_date
                ),
            ));
            return ValidationVerdict {
                valid: false,
                errors,
                warnings,
                total_days: Decimal::ZERO,
                required_documentation: false,
                auto_approval_eligible: false,
                approval_chain: Vec::new(),
            };
        }

        if !ctx.employee.is_active() {
            errors.push(ValidationIssue::new(
                IssueKind::InactiveEmployee,
                "employee_id",
                "employee is not active",
            ));
        }

        // 1. date window; both ends of the range must fall inside it
        let horizon = ctx.today + Duration::days(ctx.max_future_days);
        if input.start_date > horizon {
            errors.push(ValidationIssue::new(
                IssueKind::TooFarInFuture,
                "start_date",
                format!("start date is more than {} days ahead", ctx.max_future_days),
            ));
        } else if input.end_date > horizon {
            errors.push(ValidationIssue::new(
                IssueKind::TooFarInFuture,
                "end_date",
                format!("end date is more than {} days ahead", ctx.max_future_days),
            ));
        }
        if input.start_date < ctx.today - Duration::days(ctx.max_past_days) {
            errors.push(ValidationIssue::new(
                IssueKind::TooFarInPast,
                "start_date",
                format!("start date is more than {} days in the past", ctx.max_past_days),
            ));
        }

        // 2. working days
        let working = working_days(&range, ctx.holidays);
        if input.half_day.is_some() && working > 1 {
            errors.push(ValidationIssue::new(
                IssueKind::InvalidHalfDay,
                "half_day",
                "a half-day session is only allowed on a single working day",
            ));
        }
        let total_days = requested_days(&range, input.half_day, ctx.holidays);
        if total_days.is_zero() {
            errors.push(ValidationIssue::new(
                IssueKind::NoWorkingDays,
                "start_date",
                "the range contains no working days",
            ));
        }

        // 3. balance, net of pending requests of the same type and year
        if policy.ledger_tracked {
            let pending: Decimal = ctx
                .existing
                .iter()
                .filter(|r| {
                    r.status == RequestStatus::Pending
                        && r.leave_type == input.leave_type
                        && chrono::Datelike::year(&r.range.start) == input.balance_year()
                })
                .map(|r| r.total_days)
                .sum();
            let usable = ctx.available - pending;
            if total_days > usable {
                errors.push(ValidationIssue::new(
                    IssueKind::InsufficientBalance,
                    "leave_type",
                    format!(
                        "requested {total_days} {} days, {usable} usable ({} available, {pending} pending)",
                        input.leave_type, ctx.available
                    ),
                ));
            }
        }

        // 4. parental eligibility
        Self::check_parental_eligibility(input, ctx, &mut errors);

        // 5. no CL/PL during approved parental leave
        if input.leave_type.excluded_during_parental()
            && ctx.existing.iter().any(|r| {
                r.leave_type.is_parental()
                    && r.status == RequestStatus::Approved
                    && range.overlaps(&r.range)
            })
        {
            errors.push(ValidationIssue::new(
                IssueKind::ParentalConflict,
                "leave_type",
                format!(
                    "{} cannot be taken during an approved maternity or paternity leave",
                    input.leave_type
                ),
            ));
        }

        // 6. overlap with active requests
        for existing in ctx
            .existing
            .iter()
            .filter(|r| r.status.is_active() && range.overlaps(&r.range))
        {
            errors.push(ValidationIssue::new(
                IssueKind::Overlap,
                "start_date",
                format!(
                    "overlaps {} request {} from {} to {}",
                    existing.status, existing.id, existing.range.start, existing.range.end
                ),
            ));
        }

        // 7. policy limits
        if total_days > policy.max_consecutive_days {
            errors.push(ValidationIssue::new(
                IssueKind::ExceedsMaxConsecutive,
                "end_date",
                format!(
                    "{} allows at most {} consecutive working days",
                    input.leave_type, policy.max_consecutive_days
                ),
            ));
        }
        let required_documentation = policy.documentation.requires(total_days);
        if required_documentation && !input.has_documentation {
            warnings.push(ValidationIssue::new(
                IssueKind::DocumentationRequired,
                "has_documentation",
                format!("{} of {total_days} days requires documentation", input.leave_type),
            ));
        }

        // 8. approval chain and auto-approval
        let approval_chain = match ApprovalChainBuilder::build(
            ctx.employee.id,
            input.leave_type,
            total_days,
            &ctx.approvers,
        ) {
            Ok(chain) => chain,
            Err(_) => {
                errors.push(ValidationIssue::new(
                    IssueKind::NoApprover,
                    "employee_id",
                    "no eligible approver found",
                ));
                Vec::new()
            }
        };

        let valid = errors.is_empty();
        let auto_approval_eligible = valid
            && policy.auto_approvable
            && total_days <= AUTO_APPROVAL_MAX_DAYS
            && ctx.employee.role == Role::Employee
            && !required_documentation;

        ValidationVerdict {
            valid,
            errors,
            warnings,
            total_days,
            required_documentation,
            auto_approval_eligible,
            approval_chain,
        }
    }

    fn check_parental_eligibility(
        input: &LeaveRequestInput,
        ctx: &ValidationContext<'_>,
        errors: &mut Vec<ValidationIssue>,
    ) {
        let employee = ctx.employee;
        match input.leave_type {
            LeaveType::Maternity if employee.gender != Gender::Female => {
                errors.push(ValidationIssue::new(
                    IssueKind::NotEligible,
                    "leave_type",
                    "maternity leave is available to female employees only",
                ));
            }
            LeaveType::Paternity
                if employee.gender != Gender::Male
                    || employee.marital_status != MaritalStatus::Married =>
            {
                errors.push(ValidationIssue::new(
                    IssueKind::NotEligible,
                    "leave_type",
                    "paternity leave is available to married male employees only",
                ));
            }
            _ => {}
        }

        if input.leave_type.is_parental()
            && ctx.existing.iter().any(|r| {
                r.leave_type.is_parental()
                    && r.status.is_active()
                    && chrono::Datelike::year(&r.range.start) == input.balance_year()
            })
        {
            errors.push(ValidationIssue::new(
                IssueKind::ParentalLimitReached,
                "leave_type",
                format!(
                    "a maternity or paternity request already exists for {}",
                    input.balance_year()
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::DateRange;
    use crate::employee::{Country, Designation, Employee, EmployeeStatus};
    use crate::leave::HalfDaySession;
    use crate::validation::types::ExistingRequest;
    use crate::workflow::{ApproverPool, ApproverRole};
    use chrono::NaiveDate;
    use leaveledger_shared::types::{EmployeeId, LeaveRequestId};
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn employee() -> Employee {
        Employee {
            id: EmployeeId::new(),
            name: "Ravi".to_string(),
            country: Country::India,
            location: "BLR".to_string(),
            designation: Designation::Associate,
            joining_date: date(2020, 1, 1),
            gender: Gender::Male,
            marital_status: MaritalStatus::Married,
            status: EmployeeStatus::Active,
            role: Role::Employee,
            manager_id: None,
        }
    }

    fn pool() -> ApproverPool {
        ApproverPool {
            manager: Some(EmployeeId::new()),
            hr_admin: Some(EmployeeId::new()),
            it_admin: Some(EmployeeId::new()),
        }
    }

    fn input(
        e: &Employee,
        leave_type: LeaveType,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LeaveRequestInput {
        LeaveRequestInput {
            employee_id: e.id,
            leave_type,
            start_date: start,
            end_date: end,
            half_day: None,
            reason: "family".to_string(),
            has_documentation: false,
        }
    }

    fn existing(
        leave_type: LeaveType,
        start: NaiveDate,
        end: NaiveDate,
        days: Decimal,
        status: RequestStatus,
    ) -> ExistingRequest {
        ExistingRequest {
            id: LeaveRequestId::new(),
            leave_type,
            range: DateRange::new(start, end),
            total_days: days,
            status,
        }
    }

    fn ctx<'a>(
        e: &'a Employee,
        holidays: &'a HashSet<NaiveDate>,
        existing: &'a [ExistingRequest],
        available: Decimal,
    ) -> ValidationContext<'a> {
        ValidationContext {
            employee: e,
            today: date(2024, 6, 1),
            holidays,
            available,
            existing,
            approvers: pool(),
            max_future_days: 365,
            max_past_days: 30,
        }
    }

    fn kinds(verdict: &ValidationVerdict) -> Vec<IssueKind> {
        verdict.errors.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_valid_short_casual_leave_is_auto_approvable() {
        let e = employee();
        let holidays = HashSet::new();
        // Mon-Tue
        let req = input(&e, LeaveType::Casual, date(2024, 6, 10), date(2024, 6, 11));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(5)));
        assert!(verdict.valid, "{:?}", verdict.errors);
        assert_eq!(verdict.total_days, dec!(2));
        assert!(verdict.auto_approval_eligible);
        assert_eq!(verdict.approval_chain.len(), 1);
        assert_eq!(verdict.approval_chain[0].role, ApproverRole::Manager);
    }

    #[test]
    fn test_reversed_dates_short_circuit() {
        let e = employee();
        let holidays = HashSet::new();
        let req = input(&e, LeaveType::Casual, date(2024, 6, 12), date(2024, 6, 10));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(0)));
        assert_eq!(kinds(&verdict), vec![IssueKind::InvalidDateRange]);
        assert!(verdict.approval_chain.is_empty());
    }

    #[test]
    fn test_errors_accumulate() {
        let e = employee();
        let holidays = HashSet::new();
        // 2 working days, zero balance, too far ahead
        let req = input(&e, LeaveType::Casual, date(2025, 7, 7), date(2025, 7, 8));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(0)));
        let found = kinds(&verdict);
        assert!(found.contains(&IssueKind::TooFarInFuture));
        assert!(found.contains(&IssueKind::InsufficientBalance));
        assert!(!verdict.valid);
        assert!(!verdict.auto_approval_eligible);
    }

    #[test]
    fn test_range_ending_beyond_horizon_is_too_far_in_future() {
        let e = employee();
        let holidays = HashSet::new();
        let req = input(&e, LeaveType::LeaveWithoutPay, date(2024, 6, 10), date(2090, 6, 10));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(0)));
        let issue = verdict
            .errors
            .iter()
            .find(|i| i.kind == IssueKind::TooFarInFuture)
            .expect("end date outside the window");
        assert_eq!(issue.field, "end_date");
        assert!(!verdict.valid);
    }

    #[test]
    fn test_too_far_in_past() {
        let e = employee();
        let holidays = HashSet::new();
        let req = input(&e, LeaveType::Casual, date(2024, 4, 1), date(2024, 4, 1));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(5)));
        assert_eq!(kinds(&verdict), vec![IssueKind::TooFarInPast]);
    }

    #[test]
    fn test_weekend_only_range_has_no_working_days() {
        let e = employee();
        let holidays = HashSet::new();
        let req = input(&e, LeaveType::Casual, date(2024, 6, 15), date(2024, 6, 16));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(5)));
        assert!(verdict.has_error(IssueKind::NoWorkingDays));
    }

    #[test]
    fn test_holidays_are_not_counted() {
        let e = employee();
        let holidays = HashSet::from([date(2024, 6, 11)]);
        let req = input(&e, LeaveType::Casual, date(2024, 6, 10), date(2024, 6, 12));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(5)));
        assert_eq!(verdict.total_days, dec!(2));
    }

    #[test]
    fn test_half_day() {
        let e = employee();
        let holidays = HashSet::new();
        let mut req = input(&e, LeaveType::Casual, date(2024, 6, 10), date(2024, 6, 10));
        req.half_day = Some(HalfDaySession::SecondHalf);
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(0.5)));
        assert!(verdict.valid);
        assert_eq!(verdict.total_days, dec!(0.5));

        req.end_date = date(2024, 6, 11);
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(5)));
        assert!(verdict.has_error(IssueKind::InvalidHalfDay));
    }

    #[test]
    fn test_pending_requests_reserve_balance() {
        let e = employee();
        let holidays = HashSet::new();
        let others = [existing(
            LeaveType::Privilege,
            date(2024, 7, 1),
            date(2024, 7, 3),
            dec!(3),
            RequestStatus::Pending,
        )];
        let req = input(&e, LeaveType::Privilege, date(2024, 6, 10), date(2024, 6, 11));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &others, dec!(4)));
        assert!(verdict.has_error(IssueKind::InsufficientBalance));

        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &others, dec!(5)));
        assert!(verdict.valid);
    }

    #[test]
    fn test_overlap_with_approved_request() {
        let e = employee();
        let holidays = HashSet::new();
        let others = [existing(
            LeaveType::Privilege,
            date(2024, 6, 10),
            date(2024, 6, 14),
            dec!(5),
            RequestStatus::Approved,
        )];
        let req = input(&e, LeaveType::Privilege, date(2024, 6, 12), date(2024, 6, 16));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &others, dec!(20)));
        assert!(verdict.has_error(IssueKind::Overlap));
    }

    #[test]
    fn test_rejected_requests_do_not_overlap() {
        let e = employee();
        let holidays = HashSet::new();
        let others = [existing(
            LeaveType::Privilege,
            date(2024, 6, 10),
            date(2024, 6, 14),
            dec!(5),
            RequestStatus::Rejected,
        )];
        let req = input(&e, LeaveType::Privilege, date(2024, 6, 12), date(2024, 6, 14));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &others, dec!(20)));
        assert!(verdict.valid);
    }

    #[test]
    fn test_paternity_eligibility() {
        let mut e = employee();
        e.marital_status = MaritalStatus::Single;
        let holidays = HashSet::new();
        let req = input(&e, LeaveType::Paternity, date(2024, 6, 10), date(2024, 6, 14));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(0)));
        assert!(verdict.has_error(IssueKind::NotEligible));

        let mut female = employee();
        female.gender = Gender::Female;
        let req = input(&female, LeaveType::Maternity, date(2024, 6, 10), date(2024, 6, 14));
        let verdict = RequestValidator::validate(&req, &ctx(&female, &holidays, &[], dec!(0)));
        assert!(!verdict.has_error(IssueKind::NotEligible));
    }

    #[test]
    fn test_one_parental_request_per_year() {
        let e = employee();
        let holidays = HashSet::new();
        let others = [existing(
            LeaveType::Paternity,
            date(2024, 2, 5),
            date(2024, 2, 9),
            dec!(5),
            RequestStatus::Approved,
        )];
        let req = input(&e, LeaveType::Paternity, date(2024, 6, 10), date(2024, 6, 14));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &others, dec!(0)));
        assert!(verdict.has_error(IssueKind::ParentalLimitReached));
    }

    #[test]
    fn test_casual_leave_during_maternity_conflicts() {
        let mut e = employee();
        e.gender = Gender::Female;
        let holidays = HashSet::new();
        let others = [existing(
            LeaveType::Maternity,
            date(2024, 6, 3),
            date(2024, 9, 30),
            dec!(86),
            RequestStatus::Approved,
        )];
        let req = input(&e, LeaveType::Casual, date(2024, 6, 10), date(2024, 6, 10));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &others, dec!(5)));
        assert!(verdict.has_error(IssueKind::ParentalConflict));
        assert!(verdict.has_error(IssueKind::Overlap));
    }

    #[test]
    fn test_max_consecutive_days() {
        let e = employee();
        let holidays = HashSet::new();
        // 6 working days of CL
        let req = input(&e, LeaveType::Casual, date(2024, 6, 10), date(2024, 6, 17));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(10)));
        assert!(verdict.has_error(IssueKind::ExceedsMaxConsecutive));
    }

    #[test]
    fn test_sick_leave_documentation_warning() {
        let e = employee();
        let holidays = HashSet::new();
        // 4 working days
        let mut req = input(&e, LeaveType::Sick, date(2024, 6, 10), date(2024, 6, 13));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(10)));
        assert!(verdict.valid);
        assert!(verdict.required_documentation);
        assert_eq!(verdict.warnings[0].kind, IssueKind::DocumentationRequired);

        req.has_documentation = true;
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(10)));
        assert!(verdict.warnings.is_empty());
        assert!(verdict.required_documentation);
    }

    #[test]
    fn test_non_ledger_types_skip_balance() {
        let e = employee();
        let holidays = HashSet::new();
        let req = input(&e, LeaveType::Bereavement, date(2024, 6, 10), date(2024, 6, 12));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(0)));
        assert!(verdict.valid);
        assert_eq!(verdict.approval_chain.len(), 2);
    }

    #[test]
    fn test_managers_are_not_auto_approved() {
        let mut e = employee();
        e.role = Role::Manager;
        let holidays = HashSet::new();
        let req = input(&e, LeaveType::Casual, date(2024, 6, 10), date(2024, 6, 10));
        let verdict = RequestValidator::validate(&req, &ctx(&e, &holidays, &[], dec!(5)));
        assert!(verdict.valid);
        assert!(!verdict.auto_approval_eligible);
    }

    #[test]
    fn test_no_approver() {
        let e = employee();
        let holidays = HashSet::new();
        let mut context = ctx(&e, &holidays, &[], dec!(5));
        context.approvers = ApproverPool::default();
        let req = input(&e, LeaveType::Casual, date(2024, 6, 10), date(2024, 6, 10));
        let verdict = RequestValidator::validate(&req, &context);
        assert!(verdict.has_error(IssueKind::NoApprover));
    }
}
