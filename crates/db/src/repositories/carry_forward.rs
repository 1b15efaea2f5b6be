//! Carry-forward repository for year-end close-out and carried PTO expiry.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use leaveledger_core::carry_forward::{
    CarryForwardPlan, CarryForwardPolicy, CarryForwardRule, CarryForwardStatus,
};
use leaveledger_core::leave::LeaveType;
use leaveledger_shared::types::EmployeeId;

use crate::entities::carry_forward_runs;
use crate::entities::sea_orm_active_enums::{
    CarryForwardStatus as DbCarryForwardStatus, LeaveTypeCode,
};
use crate::error::StoreError;

use super::balance::{self, BalanceChange, BalanceKey};
use super::convert::{self, units};

/// A stored carry-forward run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarryForwardRun {
    /// Employee.
    pub employee_id: EmployeeId,
    /// Leave type.
    pub leave_type: LeaveType,
    /// Closed year.
    pub from_year: i32,
    /// Receiving year.
    pub to_year: i32,
    /// Outcome.
    pub status: CarryForwardStatus,
    /// Available at close.
    pub closing: Decimal,
    /// Moved to `to_year`.
    pub carried: Decimal,
    /// Lost at close.
    pub lapsed: Decimal,
    /// Later extinguished by the expiry job.
    pub expired: Decimal,
}

impl CarryForwardRun {
    fn from_model(model: carry_forward_runs::Model) -> Self {
        Self {
            employee_id: EmployeeId::from_uuid(model.employee_id),
            leave_type: model.leave_type.into(),
            from_year: model.from_year,
            to_year: model.to_year,
            status: model.status.into(),
            closing: convert::days(model.closing_half_days),
            carried: convert::days(model.carried_half_days),
            lapsed: convert::days(model.lapsed_half_days),
            expired: convert::days(model.expired_half_days),
        }
    }
}

/// Carry-forward repository.
#[derive(Debug, Clone)]
pub struct CarryForwardRepository {
    db: DatabaseConnection,
}

impl CarryForwardRepository {
    /// Creates a new carry-forward repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Closes `from_year` for one employee and leave type and carries the
    /// allowed part into `to_year`.
    ///
    /// The run row is inserted first as the idempotency marker; if it
    /// already exists nothing is written and `None` is returned. The plan
    /// is computed from the amount actually closed out, so it reflects the
    /// committed balance rather than an earlier read.
    pub async fn close_year(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        years: (i32, i32),
        rule: CarryForwardRule,
        now: DateTime<Utc>,
    ) -> Result<Option<CarryForwardPlan>, StoreError> {
        let (from_year, to_year) = years;
        let txn = self.db.begin().await?;

        let run_id = Uuid::now_v7();
        let marker = carry_forward_runs::ActiveModel {
            id: Set(run_id),
            employee_id: Set(employee_id.into_inner()),
            leave_type: Set(leave_type.into()),
            from_year: Set(from_year),
            to_year: Set(to_year),
            status: Set(DbCarryForwardStatus::Lapsed),
            closing_half_days: Set(0),
            carried_half_days: Set(0),
            lapsed_half_days: Set(0),
            expired_half_days: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = carry_forward_runs::Entity::insert(marker)
            .on_conflict(
                OnConflict::columns([
                    carry_forward_runs::Column::EmployeeId,
                    carry_forward_runs::Column::LeaveType,
                    carry_forward_runs::Column::FromYear,
                    carry_forward_runs::Column::ToYear,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        if inserted == 0 {
            return Ok(None);
        }

        let reference = carry_forward_reference(from_year, to_year);
        let closed = balance::apply_in(
            &txn,
            BalanceKey::new(employee_id, leave_type, from_year),
            BalanceChange::CloseOut,
            &reference,
            now,
        )
        .await?;

        let plan = CarryForwardPolicy::plan(rule, closed.amount);
        if plan.carried > Decimal::ZERO {
            balance::apply_in(
                &txn,
                BalanceKey::new(employee_id, leave_type, to_year),
                BalanceChange::CarryIn(plan.carried),
                &reference,
                now,
            )
            .await?;
        }

        carry_forward_runs::Entity::update_many()
            .col_expr(
                carry_forward_runs::Column::Status,
                Expr::value(DbCarryForwardStatus::from(plan.status())),
            )
            .col_expr(
                carry_forward_runs::Column::ClosingHalfDays,
                Expr::value(units(plan.closing)?),
            )
            .col_expr(
                carry_forward_runs::Column::CarriedHalfDays,
                Expr::value(units(plan.carried)?),
            )
            .col_expr(
                carry_forward_runs::Column::LapsedHalfDays,
                Expr::value(units(plan.lapsed)?),
            )
            .filter(carry_forward_runs::Column::Id.eq(run_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(Some(plan))
    }

    /// Runs of `leave_type` that carried into `to_year` and have not expired.
    pub async fn carried_into(
        &self,
        leave_type: LeaveType,
        to_year: i32,
    ) -> Result<Vec<CarryForwardRun>, StoreError> {
        let rows = carry_forward_runs::Entity::find()
            .filter(carry_forward_runs::Column::LeaveType.eq(LeaveTypeCode::from(leave_type)))
            .filter(carry_forward_runs::Column::ToYear.eq(to_year))
            .filter(carry_forward_runs::Column::Status.eq(DbCarryForwardStatus::Carried))
            .order_by_asc(carry_forward_runs::Column::EmployeeId)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(CarryForwardRun::from_model).collect())
    }

    /// Runs for one employee, oldest first.
    pub async fn runs_for(&self, employee_id: EmployeeId) -> Result<Vec<CarryForwardRun>, StoreError> {
        let rows = carry_forward_runs::Entity::find()
            .filter(carry_forward_runs::Column::EmployeeId.eq(employee_id.into_inner()))
            .order_by_asc(carry_forward_runs::Column::FromYear)
            .order_by_asc(carry_forward_runs::Column::LeaveType)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(CarryForwardRun::from_model).collect())
    }

    /// Extinguishes the unused part of PTO carried into `year`.
    ///
    /// The run moves `CARRIED -> EXPIRED` with a conditional update, so a
    /// second call for the same employee and year returns `None`.
    pub async fn expire_carried(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        year: i32,
        now: DateTime<Utc>,
    ) -> Result<Option<Decimal>, StoreError> {
        let txn = self.db.begin().await?;

        let flipped = carry_forward_runs::Entity::update_many()
            .col_expr(
                carry_forward_runs::Column::Status,
                Expr::value(DbCarryForwardStatus::Expired),
            )
            .col_expr(carry_forward_runs::Column::UpdatedAt, Expr::value(now))
            .filter(carry_forward_runs::Column::EmployeeId.eq(employee_id.into_inner()))
            .filter(carry_forward_runs::Column::LeaveType.eq(LeaveTypeCode::from(leave_type)))
            .filter(carry_forward_runs::Column::ToYear.eq(year))
            .filter(carry_forward_runs::Column::Status.eq(DbCarryForwardStatus::Carried))
            .exec(&txn)
            .await?;
        if flipped.rows_affected == 0 {
            return Ok(None);
        }

        let key = BalanceKey::new(employee_id, leave_type, year);
        let unused = balance::find_row(&txn, key)
            .await?
            .map(|row| convert::balance(&row).reconciled().balance.unused_carry_forward())
            .unwrap_or_default();

        let write = balance::apply_in(
            &txn,
            key,
            BalanceChange::Expire(unused),
            &format!("carry-forward-expiry:{year}"),
            now,
        )
        .await?;

        carry_forward_runs::Entity::update_many()
            .col_expr(
                carry_forward_runs::Column::ExpiredHalfDays,
                Expr::value(units(write.amount)?),
            )
            .filter(carry_forward_runs::Column::EmployeeId.eq(employee_id.into_inner()))
            .filter(carry_forward_runs::Column::LeaveType.eq(LeaveTypeCode::from(leave_type)))
            .filter(carry_forward_runs::Column::ToYear.eq(year))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(Some(write.amount))
    }
}

/// Journal reference for a year-end run.
#[must_use]
pub fn carry_forward_reference(from_year: i32, to_year: i32) -> String {
    format!("carry-forward:{from_year}->{to_year}")
}
