//! Accrual repository.
//!
//! A marker row per employee and period makes accrual runs idempotent: the
//! marker insert and the credits it covers share one transaction, and a
//! marker that already exists means the period was handled.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use uuid::Uuid;

use leaveledger_core::accrual::{AccrualOutcome, AccrualPeriod};
use leaveledger_core::leave::LeaveType;
use leaveledger_shared::types::EmployeeId;

use crate::entities::{annual_accruals, monthly_accruals};
use crate::error::StoreError;

use super::balance::{self, BalanceChange, BalanceKey};
use super::convert::units;

/// Accrual repository for period markers and their credits.
#[derive(Debug, Clone)]
pub struct AccrualRepository {
    db: DatabaseConnection,
}

impl AccrualRepository {
    /// Creates a new accrual repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// True if the period already has a marker for the employee.
    pub async fn has_marker(
        &self,
        employee_id: EmployeeId,
        period: AccrualPeriod,
    ) -> Result<bool, StoreError> {
        let count = match period {
            AccrualPeriod::Month { year, month } => {
                monthly_accruals::Entity::find()
                    .filter(monthly_accruals::Column::EmployeeId.eq(employee_id.into_inner()))
                    .filter(monthly_accruals::Column::Year.eq(year))
                    .filter(monthly_accruals::Column::Month.eq(month_column(month)))
                    .count(&self.db)
                    .await?
            }
            AccrualPeriod::Year(year) => {
                annual_accruals::Entity::find()
                    .filter(annual_accruals::Column::EmployeeId.eq(employee_id.into_inner()))
                    .filter(annual_accruals::Column::Year.eq(year))
                    .count(&self.db)
                    .await?
            }
        };
        Ok(count > 0)
    }

    /// Records the outcome for a period and applies its credits.
    ///
    /// Returns `false` without writing when the period already has a marker
    /// or the outcome records nothing.
    pub async fn record(
        &self,
        employee_id: EmployeeId,
        period: AccrualPeriod,
        outcome: &AccrualOutcome,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let Some(status) = outcome.status() else {
            return Ok(false);
        };
        let txn = self.db.begin().await?;

        let inserted = match period {
            AccrualPeriod::Month { year, month } => {
                let amount_of = |leave_type: LeaveType| -> Result<i64, StoreError> {
                    outcome
                        .instructions()
                        .iter()
                        .filter(|i| i.leave_type == leave_type)
                        .map(|i| units(i.amount))
                        .sum()
                };
                let marker = monthly_accruals::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    employee_id: Set(employee_id.into_inner()),
                    year: Set(year),
                    month: Set(month_column(month)),
                    status: Set(status.into()),
                    pro_rated: Set(outcome.is_pro_rated()),
                    casual_half_days: Set(amount_of(LeaveType::Casual)?),
                    privilege_half_days: Set(amount_of(LeaveType::Privilege)?),
                    created_at: Set(now),
                };
                monthly_accruals::Entity::insert(marker)
                    .on_conflict(
                        OnConflict::columns([
                            monthly_accruals::Column::EmployeeId,
                            monthly_accruals::Column::Year,
                            monthly_accruals::Column::Month,
                        ])
                        .do_nothing()
                        .to_owned(),
                    )
                    .exec_without_returning(&txn)
                    .await?
            }
            AccrualPeriod::Year(year) => {
                let amount = outcome
                    .instructions()
                    .iter()
                    .map(|i| units(i.amount))
                    .sum::<Result<i64, StoreError>>()?;
                let marker = annual_accruals::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    employee_id: Set(employee_id.into_inner()),
                    year: Set(year),
                    status: Set(status.into()),
                    pro_rated: Set(outcome.is_pro_rated()),
                    amount_half_days: Set(amount),
                    created_at: Set(now),
                };
                annual_accruals::Entity::insert(marker)
                    .on_conflict(
                        OnConflict::columns([
                            annual_accruals::Column::EmployeeId,
                            annual_accruals::Column::Year,
                        ])
                        .do_nothing()
                        .to_owned(),
                    )
                    .exec_without_returning(&txn)
                    .await?
            }
        };
        if inserted == 0 {
            return Ok(false);
        }

        credit_all(&txn, employee_id, period, outcome, now).await?;
        txn.commit().await?;
        Ok(true)
    }
}

/// Journal reference for an accrual period.
#[must_use]
pub fn accrual_reference(period: AccrualPeriod) -> String {
    format!("accrual:{period}")
}

async fn credit_all<C: ConnectionTrait>(
    conn: &C,
    employee_id: EmployeeId,
    period: AccrualPeriod,
    outcome: &AccrualOutcome,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let reference = accrual_reference(period);
    for instruction in outcome.instructions() {
        balance::apply_in(
            conn,
            BalanceKey::new(employee_id, instruction.leave_type, period.year()),
            BalanceChange::Credit(instruction.amount),
            &reference,
            now,
        )
        .await?;
    }
    Ok(())
}

#[allow(clippy::cast_possible_wrap)]
const fn month_column(month: u32) -> i32 {
    // 1..=12
    month as i32
}
