//! Comp-off repository: work logs, grants and their redemption.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;

use leaveledger_core::comp_off::{CompOffRules, GrantLot, GrantStatus, RedemptionPlan};
use leaveledger_core::leave::LeaveType;
use leaveledger_core::ledger::LedgerError;
use leaveledger_core::validation::{IssueKind, ValidationIssue};
use leaveledger_core::workflow::{ApprovalStatus, Verdict, WorkflowError};
use leaveledger_shared::types::{CompOffGrantId, CompOffWorkLogId, EmployeeId};

use crate::entities::sea_orm_active_enums::{
    ApprovalStatus as DbApprovalStatus, GrantStatus as DbGrantStatus, LeaveTypeCode,
};
use crate::entities::{carry_forward_runs, comp_off_grants, comp_off_work_logs};
use crate::error::StoreError;

use super::balance::{self, BalanceChange, BalanceKey};
use super::convert::{self, units};

/// A claim for weekend or holiday work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkLogRecord {
    /// Id.
    pub id: CompOffWorkLogId,
    /// Claimant.
    pub employee_id: EmployeeId,
    /// Day worked.
    pub work_date: NaiveDate,
    /// 0.5 or 1.
    pub days: Decimal,
    /// Why the work was needed.
    pub reason: String,
    /// Single approver.
    pub approver_id: EmployeeId,
    /// Decision.
    pub status: ApprovalStatus,
    /// Approver comments.
    pub comments: Option<String>,
}

impl WorkLogRecord {
    fn from_model(model: comp_off_work_logs::Model) -> Self {
        Self {
            id: CompOffWorkLogId::from_uuid(model.id),
            employee_id: EmployeeId::from_uuid(model.employee_id),
            work_date: model.work_date,
            days: convert::days(model.days_half_days),
            reason: model.reason,
            approver_id: EmployeeId::from_uuid(model.approver_id),
            status: model.status.into(),
            comments: model.comments,
        }
    }
}

/// A redeemable lot of comp-off days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantRecord {
    /// Id.
    pub id: CompOffGrantId,
    /// Work log that earned it.
    pub work_log_id: CompOffWorkLogId,
    /// Owner.
    pub employee_id: EmployeeId,
    /// Days granted.
    pub granted: Decimal,
    /// Days not yet consumed.
    pub remaining: Decimal,
    /// Approval date.
    pub approved_on: NaiveDate,
    /// Last usable day.
    pub expires_on: NaiveDate,
    /// Lifecycle status.
    pub status: GrantStatus,
}

impl GrantRecord {
    fn from_model(model: comp_off_grants::Model) -> Self {
        Self {
            id: CompOffGrantId::from_uuid(model.id),
            work_log_id: CompOffWorkLogId::from_uuid(model.work_log_id),
            employee_id: EmployeeId::from_uuid(model.employee_id),
            granted: convert::days(model.granted_half_days),
            remaining: convert::days(model.remaining_half_days),
            approved_on: model.approved_on,
            expires_on: model.expires_on,
            status: model.status.into(),
        }
    }

    const fn lot(&self) -> GrantLot {
        GrantLot {
            id: self.id,
            expires_on: self.expires_on,
            granted: self.granted,
            remaining: self.remaining,
        }
    }
}

/// A new work-log claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkLog {
    /// Claimant.
    pub employee_id: EmployeeId,
    /// Day worked.
    pub work_date: NaiveDate,
    /// 0.5 or 1.
    pub days: Decimal,
    /// Why the work was needed.
    pub reason: String,
    /// Who decides the claim.
    pub approver_id: EmployeeId,
}

/// An approver's decision on a work log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLogVerdict {
    /// The claim.
    pub log_id: CompOffWorkLogId,
    /// The caller.
    pub approver_id: EmployeeId,
    /// Approve or reject.
    pub verdict: Verdict,
    /// Optional comments.
    pub comments: Option<String>,
}

/// Result of deciding a work log.
#[derive(Debug, Clone)]
pub struct WorkLogDecision {
    /// The decided log.
    pub log: WorkLogRecord,
    /// The grant an approval created.
    pub grant: Option<GrantRecord>,
}

/// A grant extinguished by the expiry job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredGrant {
    /// The grant, now expired.
    pub grant: GrantRecord,
    /// Days removed from the CO ledger.
    pub extinguished: Decimal,
}

/// Comp-off repository.
#[derive(Debug, Clone)]
pub struct CompOffRepository {
    db: DatabaseConnection,
}

impl CompOffRepository {
    /// Creates a new comp-off repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores a pending claim; one claim per employee and day.
    ///
    /// # Errors
    ///
    /// `StoreError::Rejected` with an overlap issue if the day is already
    /// claimed.
    pub async fn log_work(
        &self,
        claim: NewWorkLog,
        now: DateTime<Utc>,
    ) -> Result<WorkLogRecord, StoreError> {
        let id = CompOffWorkLogId::new();
        let row = comp_off_work_logs::ActiveModel {
            id: Set(id.into_inner()),
            employee_id: Set(claim.employee_id.into_inner()),
            work_date: Set(claim.work_date),
            days_half_days: Set(units(claim.days)?),
            reason: Set(claim.reason),
            approver_id: Set(claim.approver_id.into_inner()),
            status: Set(DbApprovalStatus::Pending),
            comments: Set(None),
            decided_at: Set(None),
            created_at: Set(now),
        };
        let inserted = comp_off_work_logs::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    comp_off_work_logs::Column::EmployeeId,
                    comp_off_work_logs::Column::WorkDate,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        if inserted == 0 {
            return Err(StoreError::Rejected(vec![ValidationIssue::new(
                IssueKind::Overlap,
                "work_date",
                format!("work on {} is already claimed", claim.work_date),
            )]));
        }

        comp_off_work_logs::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(WorkLogRecord::from_model)
            .ok_or_else(|| StoreError::not_found("comp-off work log", id))
    }

    /// Decides a pending claim.
    ///
    /// Approval creates a grant expiring `expiry_months` after `today` and
    /// credits the CO ledger for `today`'s year, all in one transaction.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the log does not exist
    /// - `StoreError::Workflow` if the caller is not the approver or the
    ///   log was already decided
    pub async fn decide(
        &self,
        input: WorkLogVerdict,
        expiry_months: u32,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<WorkLogDecision, StoreError> {
        let WorkLogVerdict {
            log_id,
            approver_id,
            verdict,
            comments,
        } = input;
        let txn = self.db.begin().await?;

        let log = comp_off_work_logs::Entity::find_by_id(log_id.into_inner())
            .one(&txn)
            .await?
            .map(WorkLogRecord::from_model)
            .ok_or_else(|| StoreError::not_found("comp-off work log", log_id))?;
        if log.approver_id != approver_id {
            return Err(WorkflowError::NotApprover {
                approver_id,
                level: 1,
            }
            .into());
        }

        let flipped = comp_off_work_logs::Entity::update_many()
            .col_expr(
                comp_off_work_logs::Column::Status,
                Expr::value(DbApprovalStatus::from(verdict.approval_status())),
            )
            .col_expr(comp_off_work_logs::Column::Comments, Expr::value(comments))
            .col_expr(comp_off_work_logs::Column::DecidedAt, Expr::value(Some(now)))
            .filter(comp_off_work_logs::Column::Id.eq(log_id.into_inner()))
            .filter(comp_off_work_logs::Column::Status.eq(DbApprovalStatus::Pending))
            .exec(&txn)
            .await?;
        if flipped.rows_affected == 0 {
            return Err(WorkflowError::AlreadyDecided(1).into());
        }

        let grant = if verdict == Verdict::Approve {
            let expires_on = CompOffRules::grant_expiry(today, expiry_months).ok_or_else(|| {
                StoreError::Corrupt(format!("grant expiry overflows from {today}"))
            })?;
            let grant_id = CompOffGrantId::new();
            let row = comp_off_grants::ActiveModel {
                id: Set(grant_id.into_inner()),
                work_log_id: Set(log_id.into_inner()),
                employee_id: Set(log.employee_id.into_inner()),
                granted_half_days: Set(units(log.days)?),
                remaining_half_days: Set(units(log.days)?),
                approved_on: Set(today),
                expires_on: Set(expires_on),
                status: Set(DbGrantStatus::Active),
                created_at: Set(now),
                updated_at: Set(now),
            };
            comp_off_grants::Entity::insert(row)
                .exec_without_returning(&txn)
                .await?;

            balance::apply_in(
                &txn,
                BalanceKey::new(log.employee_id, LeaveType::CompOff, today.year()),
                BalanceChange::Credit(log.days),
                &work_log_reference(log_id),
                now,
            )
            .await?;

            comp_off_grants::Entity::find_by_id(grant_id.into_inner())
                .one(&txn)
                .await?
                .map(GrantRecord::from_model)
        } else {
            None
        };

        let log = comp_off_work_logs::Entity::find_by_id(log_id.into_inner())
            .one(&txn)
            .await?
            .map(WorkLogRecord::from_model)
            .ok_or_else(|| StoreError::not_found("comp-off work log", log_id))?;
        txn.commit().await?;

        Ok(WorkLogDecision { log, grant })
    }

    /// Grants of an employee, earliest expiry first.
    pub async fn grants_for(&self, employee_id: EmployeeId) -> Result<Vec<GrantRecord>, StoreError> {
        grants_of(&self.db, employee_id).await
    }

    /// Grants with days left that lapsed before `as_of`.
    pub async fn lapsed(&self, as_of: NaiveDate) -> Result<Vec<GrantRecord>, StoreError> {
        let rows = comp_off_grants::Entity::find()
            .filter(comp_off_grants::Column::ExpiresOn.lt(as_of))
            .filter(comp_off_grants::Column::RemainingHalfDays.gt(0))
            .order_by_asc(comp_off_grants::Column::ExpiresOn)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(GrantRecord::from_model).collect())
    }

    /// Active grants lapsing within `window_days` of `as_of`.
    pub async fn expiring_within(
        &self,
        as_of: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<GrantRecord>, StoreError> {
        let horizon = as_of + chrono::Duration::days(window_days);
        let rows = comp_off_grants::Entity::find()
            .filter(comp_off_grants::Column::Status.eq(DbGrantStatus::Active))
            .filter(comp_off_grants::Column::ExpiresOn.gte(as_of))
            .filter(comp_off_grants::Column::ExpiresOn.lte(horizon))
            .order_by_asc(comp_off_grants::Column::ExpiresOn)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(GrantRecord::from_model)
            .filter(|g| CompOffRules::expires_within(g.expires_on, as_of, window_days))
            .collect())
    }

    /// Expires one lapsed grant and removes its remaining days from the CO
    /// ledger that holds them.
    ///
    /// The days sit in the ledger of the approval year until a year-end
    /// run carries them forward, so the holder is found by following the
    /// comp-off runs out of that year. Returns `None` if the grant changed
    /// since it was listed (already expired, or consumed in the meantime).
    ///
    /// # Errors
    ///
    /// `LedgerError::InsufficientBalance` when the holding ledger has fewer
    /// days than the grant still claims; nothing is written and the grant
    /// stays active.
    pub async fn expire_grant(
        &self,
        grant: &GrantRecord,
        as_of: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Option<ExpiredGrant>, StoreError> {
        let txn = self.db.begin().await?;

        let flipped = comp_off_grants::Entity::update_many()
            .col_expr(
                comp_off_grants::Column::Status,
                Expr::value(DbGrantStatus::Expired),
            )
            .col_expr(comp_off_grants::Column::RemainingHalfDays, Expr::value(0_i64))
            .col_expr(comp_off_grants::Column::UpdatedAt, Expr::value(now))
            .filter(comp_off_grants::Column::Id.eq(grant.id.into_inner()))
            .filter(comp_off_grants::Column::RemainingHalfDays.eq(units(grant.remaining)?))
            .filter(comp_off_grants::Column::ExpiresOn.lt(as_of))
            .exec(&txn)
            .await?;
        if flipped.rows_affected == 0 {
            return Ok(None);
        }

        let year = holding_year(&txn, grant.employee_id, grant.approved_on.year()).await?;
        let write = balance::apply_in(
            &txn,
            BalanceKey::new(grant.employee_id, LeaveType::CompOff, year),
            BalanceChange::Expire(grant.remaining),
            &format!("comp-off-expiry:{}", grant.id),
            now,
        )
        .await?;
        if write.amount < grant.remaining {
            // dropping the transaction rolls back the status flip
            return Err(LedgerError::InsufficientBalance {
                leave_type: LeaveType::CompOff,
                requested: grant.remaining,
                available: write.amount,
            }
            .into());
        }

        let expired = comp_off_grants::Entity::find_by_id(grant.id.into_inner())
            .one(&txn)
            .await?
            .map(GrantRecord::from_model)
            .ok_or_else(|| StoreError::not_found("comp-off grant", grant.id))?;
        txn.commit().await?;

        Ok(Some(ExpiredGrant {
            grant: expired,
            extinguished: write.amount,
        }))
    }
}

/// Journal reference for a work-log grant.
#[must_use]
pub fn work_log_reference(id: CompOffWorkLogId) -> String {
    format!("comp-off:{id}")
}

/// Year whose CO ledger holds days credited in `year`.
async fn holding_year<C: ConnectionTrait>(
    conn: &C,
    employee_id: EmployeeId,
    mut year: i32,
) -> Result<i32, StoreError> {
    // runs always move to a later year, so this ends
    while let Some(run) = carry_forward_runs::Entity::find()
        .filter(carry_forward_runs::Column::EmployeeId.eq(employee_id.into_inner()))
        .filter(carry_forward_runs::Column::LeaveType.eq(LeaveTypeCode::CompOff))
        .filter(carry_forward_runs::Column::FromYear.eq(year))
        .one(conn)
        .await?
    {
        if run.to_year <= year {
            return Err(StoreError::Corrupt(format!(
                "carry-forward run {} goes from {year} back to {}",
                run.id, run.to_year
            )));
        }
        year = run.to_year;
    }
    Ok(year)
}

async fn grants_of<C: ConnectionTrait>(
    conn: &C,
    employee_id: EmployeeId,
) -> Result<Vec<GrantRecord>, StoreError> {
    let rows = comp_off_grants::Entity::find()
        .filter(comp_off_grants::Column::EmployeeId.eq(employee_id.into_inner()))
        .order_by_asc(comp_off_grants::Column::ExpiresOn)
        .order_by_asc(comp_off_grants::Column::Id)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(GrantRecord::from_model).collect())
}

/// Draws `amount` from the employee's grants, earliest expiry first.
///
/// Returns what no grant could cover.
pub(crate) async fn redeem_in<C: ConnectionTrait>(
    conn: &C,
    employee_id: EmployeeId,
    amount: Decimal,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Decimal, StoreError> {
    let grants = grants_of(conn, employee_id).await?;
    let active: Vec<GrantLot> = grants
        .iter()
        .filter(|g| g.status == GrantStatus::Active)
        .map(GrantRecord::lot)
        .collect();
    let plan = CompOffRules::redemption_plan(&active, amount, today);
    write_plan(conn, &grants, &plan, now).await?;
    Ok(plan.uncovered)
}

/// Returns `amount` to consumed grants, latest expiry first.
///
/// A grant past its expiry gets its days back too; the next expiry run
/// extinguishes them. Returns what no grant could absorb.
pub(crate) async fn restore_in<C: ConnectionTrait>(
    conn: &C,
    employee_id: EmployeeId,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<Decimal, StoreError> {
    let grants = grants_of(conn, employee_id).await?;
    let lots: Vec<GrantLot> = grants
        .iter()
        .filter(|g| g.status != GrantStatus::Expired)
        .map(GrantRecord::lot)
        .collect();
    let plan = CompOffRules::restoration_plan(&lots, amount);
    write_plan(conn, &grants, &plan, now).await?;
    Ok(plan.uncovered)
}

async fn write_plan<C: ConnectionTrait>(
    conn: &C,
    grants: &[GrantRecord],
    plan: &RedemptionPlan,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    for allocation in &plan.allocations {
        let Some(before) = grants.iter().find(|g| g.id == allocation.grant_id) else {
            continue;
        };
        let status = GrantStatus::for_remaining(allocation.remaining_after);
        let result = comp_off_grants::Entity::update_many()
            .col_expr(
                comp_off_grants::Column::RemainingHalfDays,
                Expr::value(units(allocation.remaining_after)?),
            )
            .col_expr(
                comp_off_grants::Column::Status,
                Expr::value(DbGrantStatus::from(status)),
            )
            .col_expr(comp_off_grants::Column::UpdatedAt, Expr::value(now))
            .filter(comp_off_grants::Column::Id.eq(allocation.grant_id.into_inner()))
            .filter(comp_off_grants::Column::RemainingHalfDays.eq(units(before.remaining)?))
            .exec(conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(LedgerError::Conflict { attempts: 1 }.into());
        }
    }
    Ok(())
}
