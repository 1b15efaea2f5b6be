//! Mapping between stored rows and domain values.

use rust_decimal::Decimal;

use leaveledger_core::employee::{
    Country, Designation, Employee, EmployeeStatus, Gender, MaritalStatus, Role,
};
use leaveledger_core::ledger::{LeaveBalance, LedgerError};
use leaveledger_shared::types::{EmployeeId, from_half_days, to_half_days};

use crate::entities::{employees, leave_balances};
use crate::error::StoreError;

/// Day amount to storage units.
pub(crate) fn units(days: Decimal) -> Result<i64, StoreError> {
    to_half_days(days).ok_or(StoreError::Ledger(LedgerError::NotHalfDayMultiple(days)))
}

/// Storage units to a day amount.
pub(crate) fn days(units: i64) -> Decimal {
    from_half_days(units)
}

pub(crate) fn balance(model: &leave_balances::Model) -> LeaveBalance {
    LeaveBalance {
        employee_id: EmployeeId::from_uuid(model.employee_id),
        leave_type: model.leave_type.into(),
        year: model.year,
        total_entitlement: days(model.total_entitlement_half_days),
        used: days(model.used_half_days),
        available: days(model.available_half_days),
        carry_forward: days(model.carry_forward_half_days),
        version: model.version,
    }
}

fn field<T>(value: Option<T>, column: &str, raw: &str, id: uuid::Uuid) -> Result<T, StoreError> {
    value.ok_or_else(|| StoreError::Corrupt(format!("employee {id}: bad {column} '{raw}'")))
}

pub(crate) fn employee(model: employees::Model) -> Result<Employee, StoreError> {
    let id = model.id;
    Ok(Employee {
        id: EmployeeId::from_uuid(id),
        country: field(Country::parse(&model.country), "country", &model.country, id)?,
        designation: field(
            Designation::parse(&model.designation),
            "designation",
            &model.designation,
            id,
        )?,
        gender: field(Gender::parse(&model.gender), "gender", &model.gender, id)?,
        marital_status: field(
            MaritalStatus::parse(&model.marital_status),
            "marital_status",
            &model.marital_status,
            id,
        )?,
        status: field(EmployeeStatus::parse(&model.status), "status", &model.status, id)?,
        role: field(Role::parse(&model.role), "role", &model.role, id)?,
        manager_id: model.manager_id.map(EmployeeId::from_uuid),
        joining_date: model.joining_date,
        location: model.location,
        name: model.name,
    })
}
