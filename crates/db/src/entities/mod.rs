//! `SeaORM` entity definitions.
//!
//! Ledger quantities are stored as integer half-day units (`*_half_days`)
//! so the database never holds a fractional day.

#![allow(missing_docs)]

pub mod prelude;

pub mod annual_accruals;
pub mod approvals;
pub mod balance_transactions;
pub mod carry_forward_runs;
pub mod comp_off_grants;
pub mod comp_off_work_logs;
pub mod employees;
pub mod holidays;
pub mod leave_balances;
pub mod leave_requests;
pub mod ledger_anomalies;
pub mod monthly_accruals;
pub mod request_guards;
pub mod sea_orm_active_enums;
