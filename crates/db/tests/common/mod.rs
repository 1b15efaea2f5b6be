//! Shared fixtures for the repository tests.

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use leaveledger_core::leave::LeaveType;
use leaveledger_core::validation::{
    ExistingRequest, IssueKind, LeaveRequestInput, ValidationIssue, ValidationVerdict,
};
use leaveledger_core::workflow::{ApproverRole, ChainLevel};
use leaveledger_db::entities::employees;
use leaveledger_shared::types::EmployeeId;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

pub async fn db() -> DatabaseConnection {
    leaveledger_db::connect_in_memory()
        .await
        .expect("in-memory database")
}

pub async fn seed_employee(
    db: &DatabaseConnection,
    name: &str,
    role: &str,
    manager: Option<EmployeeId>,
) -> EmployeeId {
    let id = Uuid::now_v7();
    employees::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        country: Set("INDIA".to_string()),
        location: Set("Bengaluru".to_string()),
        designation: Set("ASSOCIATE".to_string()),
        joining_date: Set(date(2020, 1, 1)),
        gender: Set("FEMALE".to_string()),
        marital_status: Set("SINGLE".to_string()),
        status: Set("ACTIVE".to_string()),
        role: Set(role.to_string()),
        manager_id: Set(manager.map(EmployeeId::into_inner)),
    }
    .insert(db)
    .await
    .expect("seed employee");
    EmployeeId::from_uuid(id)
}

pub fn request(
    employee_id: EmployeeId,
    leave_type: LeaveType,
    start: NaiveDate,
    end: NaiveDate,
) -> LeaveRequestInput {
    LeaveRequestInput {
        employee_id,
        leave_type,
        start_date: start,
        end_date: end,
        half_day: None,
        reason: "family event".to_string(),
        has_documentation: false,
    }
}

/// A verdict that checks overlap and balance against what the
/// transaction read, with a fixed approval chain.
pub fn checking_verdict(
    input: &LeaveRequestInput,
    days: Decimal,
    chain: &[EmployeeId],
    existing: &[ExistingRequest],
    available: Decimal,
) -> ValidationVerdict {
    let mut errors = Vec::new();
    if existing.iter().any(|e| e.range.overlaps(&input.range())) {
        errors.push(ValidationIssue::new(
            IssueKind::Overlap,
            "start_date",
            "overlaps an existing request",
        ));
    }
    if input.leave_type.is_ledger_tracked() && available < days {
        errors.push(ValidationIssue::new(
            IssueKind::InsufficientBalance,
            "leave_type",
            "insufficient balance",
        ));
    }
    let roles = [
        ApproverRole::Manager,
        ApproverRole::HrAdmin,
        ApproverRole::ItAdmin,
    ];
    ValidationVerdict {
        valid: errors.is_empty(),
        errors,
        warnings: Vec::new(),
        total_days: days,
        required_documentation: false,
        auto_approval_eligible: input.leave_type.policy().auto_approvable,
        approval_chain: chain
            .iter()
            .zip(roles)
            .enumerate()
            .map(|(i, (approver_id, role))| ChainLevel {
                level: i32::try_from(i).unwrap() + 1,
                approver_id: *approver_id,
                role,
            })
            .collect(),
    }
}
