//! Workflow repository for approval decisions and cancellation.
//!
//! Each operation is one transaction: the approval row and the request
//! row are written with conditional updates, and the ledger movement that
//! finalizing or cancelling implies is applied before commit. Any failure
//! drops the transaction and leaves every row as it was.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::warn;

use leaveledger_core::ledger::LedgerError;
use leaveledger_core::leave::LeaveType;
use leaveledger_core::workflow::{
    ApprovalStatus, CancelActor, CancelEffect, Decision, RequestStatus, Verdict, WorkflowError,
    WorkflowService,
};
use leaveledger_shared::types::{EmployeeId, LeaveRequestId};

use crate::entities::sea_orm_active_enums::{
    ApprovalStatus as DbApprovalStatus, RequestStatus as DbRequestStatus,
};
use crate::entities::{approvals, leave_requests};
use crate::error::StoreError;

use super::balance::{self, BalanceChange, BalanceKey, BalanceWrite};
use super::comp_off;
use super::leave_request::{
    self, ApprovalRecord, LeaveRequestRecord, bump_guard, load_approvals, load_request,
    request_reference,
};

/// Comment written on levels closed by a cancellation.
pub const CANCELLED_COMMENT: &str = "request cancelled";

/// Result of a committed decision.
#[derive(Debug, Clone)]
pub struct DecideOutcome {
    /// The request after the decision.
    pub request: LeaveRequestRecord,
    /// What the decision did.
    pub decision: Decision,
    /// The level now waiting, if the request is still pending.
    pub next: Option<ApprovalRecord>,
    /// Ledger debit, when the decision finalized an approval.
    pub debit: Option<BalanceWrite>,
}

/// Result of a committed cancellation.
#[derive(Debug, Clone)]
pub struct CancelOutcome {
    /// The cancelled request.
    pub request: LeaveRequestRecord,
    /// What the cancellation did.
    pub effect: CancelEffect,
    /// Ledger reversal, when an approved request was cancelled.
    pub reversal: Option<BalanceWrite>,
}

/// One approver's decision on one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDecision {
    /// Request being decided.
    pub request_id: LeaveRequestId,
    /// The caller.
    pub approver_id: EmployeeId,
    /// Level being decided.
    pub level: i32,
    /// Approve or reject.
    pub verdict: Verdict,
    /// Optional comments.
    pub comments: Option<String>,
}

/// A level waiting on an approver together with its request.
#[derive(Debug, Clone)]
pub struct PendingApproval {
    /// The request.
    pub request: LeaveRequestRecord,
    /// The level the approver must decide.
    pub approval: ApprovalRecord,
}

/// Workflow repository for request state transitions.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    db: DatabaseConnection,
}

impl WorkflowRepository {
    /// Creates a new workflow repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Decides one approval level.
    ///
    /// The level row is flipped with `WHERE status = 'PENDING'`, so of two
    /// racing decisions on the same level exactly one commits. When the
    /// decision approves the last level, the request status write and the
    /// ledger debit happen in the same transaction.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the request does not exist
    /// - `StoreError::Workflow` for rule violations (`AlreadyDecided`,
    ///   `NotApprover`, out-of-order levels, terminal requests)
    /// - `StoreError::Ledger` if the finalizing debit fails
    pub async fn decide(
        &self,
        input: LevelDecision,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<DecideOutcome, StoreError> {
        let LevelDecision {
            request_id,
            approver_id,
            level,
            verdict,
            comments,
        } = input;
        let txn = self.db.begin().await?;

        let request = load_request(&txn, request_id).await?;
        let levels = load_approvals(&txn, request_id).await?;
        let states: Vec<_> = levels.iter().map(ApprovalRecord::state).collect();

        let decision =
            WorkflowService::decide(request.status, &states, level, approver_id, verdict)?;

        let row = levels
            .iter()
            .find(|a| a.level == level)
            .ok_or(WorkflowError::LevelNotFound(level))?;
        let flipped = approvals::Entity::update_many()
            .col_expr(
                approvals::Column::Status,
                Expr::value(DbApprovalStatus::from(decision.level_status)),
            )
            .col_expr(approvals::Column::Comments, Expr::value(comments))
            .col_expr(approvals::Column::DecidedAt, Expr::value(Some(now)))
            .filter(approvals::Column::Id.eq(row.id.into_inner()))
            .filter(approvals::Column::Status.eq(DbApprovalStatus::Pending))
            .exec(&txn)
            .await?;
        if flipped.rows_affected == 0 {
            return Err(WorkflowError::AlreadyDecided(level).into());
        }

        let mut debit = None;
        if decision.request_status != RequestStatus::Pending {
            transition(
                &txn,
                request_id,
                RequestStatus::Pending,
                decision.request_status,
                None,
                now,
            )
            .await?;

            if decision.finalizes_approval() && request.leave_type.is_ledger_tracked() {
                let write = leave_request::debit_for_request(&txn, &request, today, now).await?;
                debit = Some(write);
            }
        }

        let request = load_request(&txn, request_id).await?;
        let next = if request.status == RequestStatus::Pending {
            load_approvals(&txn, request_id)
                .await?
                .into_iter()
                .find(|a| a.status == ApprovalStatus::Pending)
        } else {
            None
        };
        txn.commit().await?;

        Ok(DecideOutcome {
            request,
            decision,
            next,
            debit,
        })
    }

    /// Cancels a request.
    ///
    /// Cancelling an approved request reverses its debit (and restores
    /// comp-off grants) in the same transaction. Cancelling a pending one
    /// closes its open levels.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the request does not exist
    /// - `StoreError::Workflow` if the actor may not cancel or the request
    ///   is started or terminal
    pub async fn cancel(
        &self,
        request_id: LeaveRequestId,
        actor_id: EmployeeId,
        actor_is_hr_admin: bool,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<CancelOutcome, StoreError> {
        let txn = self.db.begin().await?;

        let owner = load_request(&txn, request_id).await?.employee_id;
        bump_guard(&txn, owner, now).await?;
        let request = load_request(&txn, request_id).await?;

        let effect = WorkflowService::cancel(
            request.status,
            CancelActor {
                actor_id,
                is_owner: actor_id == request.employee_id,
                is_hr_admin: actor_is_hr_admin,
            },
            request.start_date > today,
        )?;

        transition(
            &txn,
            request_id,
            effect.previous,
            RequestStatus::Cancelled,
            Some(actor_id),
            now,
        )
        .await?;

        approvals::Entity::update_many()
            .col_expr(
                approvals::Column::Status,
                Expr::value(DbApprovalStatus::Rejected),
            )
            .col_expr(
                approvals::Column::Comments,
                Expr::value(Some(CANCELLED_COMMENT.to_string())),
            )
            .col_expr(approvals::Column::DecidedAt, Expr::value(Some(now)))
            .filter(approvals::Column::LeaveRequestId.eq(request_id.into_inner()))
            .filter(approvals::Column::Status.eq(DbApprovalStatus::Pending))
            .exec(&txn)
            .await?;

        let reversal = if effect.reverse_debit && request.leave_type.is_ledger_tracked() {
            let write = balance::apply_in(
                &txn,
                BalanceKey::new(
                    request.employee_id,
                    request.leave_type,
                    request.balance_year(),
                ),
                BalanceChange::Reverse(request.total_days),
                &request_reference(request_id),
                now,
            )
            .await?;
            if request.leave_type == LeaveType::CompOff {
                let stray =
                    comp_off::restore_in(&txn, request.employee_id, request.total_days, now)
                        .await?;
                if !stray.is_zero() {
                    warn!(
                        request_id = %request_id,
                        employee_id = %request.employee_id,
                        amount = %stray,
                        "reversed comp-off days matched no consumed grant"
                    );
                }
            }
            Some(write)
        } else {
            None
        };

        let request = load_request(&txn, request_id).await?;
        txn.commit().await?;

        Ok(CancelOutcome {
            request,
            effect,
            reversal,
        })
    }

    /// Levels waiting on `approver_id` whose lower levels are all approved.
    pub async fn pending_for_approver(
        &self,
        approver_id: EmployeeId,
    ) -> Result<Vec<PendingApproval>, StoreError> {
        let rows = approvals::Entity::find()
            .filter(approvals::Column::ApproverId.eq(approver_id.into_inner()))
            .filter(approvals::Column::Status.eq(DbApprovalStatus::Pending))
            .order_by_asc(approvals::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let mut pending = Vec::new();
        for row in rows {
            let approval = ApprovalRecord::from_model(row);
            let Some(request) = leave_requests::Entity::find_by_id(approval.request_id.into_inner())
                .one(&self.db)
                .await?
                .map(LeaveRequestRecord::from_model)
            else {
                continue;
            };
            if request.status != RequestStatus::Pending {
                continue;
            }
            let levels = load_approvals(&self.db, approval.request_id).await?;
            let turn = levels
                .iter()
                .filter(|a| a.level < approval.level)
                .all(|a| a.status == ApprovalStatus::Approved);
            if turn {
                pending.push(PendingApproval { request, approval });
            }
        }
        Ok(pending)
    }
}

/// Moves a request from `from` to `to`, failing if it is no longer in
/// `from`.
async fn transition<C: ConnectionTrait>(
    conn: &C,
    request_id: LeaveRequestId,
    from: RequestStatus,
    to: RequestStatus,
    cancelled_by: Option<EmployeeId>,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let mut update = leave_requests::Entity::update_many()
        .col_expr(
            leave_requests::Column::Status,
            Expr::value(DbRequestStatus::from(to)),
        )
        .col_expr(
            leave_requests::Column::Version,
            Expr::col(leave_requests::Column::Version).add(1),
        )
        .col_expr(leave_requests::Column::UpdatedAt, Expr::value(now));
    if let Some(actor) = cancelled_by {
        update = update.col_expr(
            leave_requests::Column::CancelledBy,
            Expr::value(Some(actor.into_inner())),
        );
    }
    let result = update
        .filter(leave_requests::Column::Id.eq(request_id.into_inner()))
        .filter(leave_requests::Column::Status.eq(DbRequestStatus::from(from)))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        // Someone else moved the request between our read and write.
        return Err(LedgerError::Conflict { attempts: 1 }.into());
    }
    Ok(())
}
