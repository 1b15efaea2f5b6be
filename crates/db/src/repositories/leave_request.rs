//! Leave request repository: submission and read models.
//!
//! Submission re-validates inside its transaction. The per-employee guard
//! row is bumped first, so two submissions for the same employee cannot
//! both pass the overlap and balance checks against the same snapshot.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::warn;

use leaveledger_core::calendar::DateRange;
use leaveledger_core::leave::{HalfDaySession, LeaveType};
use leaveledger_core::validation::{ExistingRequest, LeaveRequestInput, ValidationVerdict};
use leaveledger_core::workflow::{ApprovalState, ApprovalStatus, ApproverRole, RequestStatus};
use leaveledger_shared::types::{
    ApprovalId, EmployeeId, LeaveRequestId, PageRequest, PageResponse,
};

use crate::entities::sea_orm_active_enums::{
    ApprovalStatus as DbApprovalStatus, LeaveTypeCode, RequestStatus as DbRequestStatus,
};
use crate::entities::{approvals, leave_requests, request_guards};
use crate::error::StoreError;

use super::balance::{self, BalanceChange, BalanceKey, BalanceWrite};
use super::comp_off;
use super::convert::{self, units};

/// Comment written on approval rows finalized at submission.
pub const AUTO_APPROVED_COMMENT: &str = "auto-approved";

/// A stored leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaveRequestRecord {
    /// Id.
    pub id: LeaveRequestId,
    /// Requester.
    pub employee_id: EmployeeId,
    /// Leave type.
    pub leave_type: LeaveType,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day.
    pub end_date: NaiveDate,
    /// Half-day session for single-day requests.
    pub half_day: Option<HalfDaySession>,
    /// Working days consumed.
    pub total_days: Decimal,
    /// Status.
    pub status: RequestStatus,
    /// Reason given by the requester.
    pub reason: String,
    /// Whether supporting documents were attached.
    pub has_documentation: bool,
    /// Who cancelled it, if cancelled.
    pub cancelled_by: Option<EmployeeId>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequestRecord {
    /// The inclusive date range.
    #[must_use]
    pub const fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Year of the balance this request draws on.
    #[must_use]
    pub fn balance_year(&self) -> i32 {
        chrono::Datelike::year(&self.start_date)
    }

    /// The view the validator needs.
    #[must_use]
    pub fn as_existing(&self) -> ExistingRequest {
        ExistingRequest {
            id: self.id,
            leave_type: self.leave_type,
            range: self.range(),
            total_days: self.total_days,
            status: self.status,
        }
    }

    pub(crate) fn from_model(model: leave_requests::Model) -> Self {
        Self {
            id: LeaveRequestId::from_uuid(model.id),
            employee_id: EmployeeId::from_uuid(model.employee_id),
            leave_type: model.leave_type.into(),
            start_date: model.start_date,
            end_date: model.end_date,
            half_day: model.half_day.map(Into::into),
            total_days: convert::days(model.total_days_half_days),
            status: model.status.into(),
            reason: model.reason,
            has_documentation: model.has_documentation,
            cancelled_by: model.cancelled_by.map(EmployeeId::from_uuid),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A stored approval level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalRecord {
    /// Id.
    pub id: ApprovalId,
    /// Request.
    pub request_id: LeaveRequestId,
    /// Level, starting at 1.
    pub level: i32,
    /// Assigned approver.
    pub approver_id: EmployeeId,
    /// Why this approver is on the chain.
    pub role: ApproverRole,
    /// Decision.
    pub status: ApprovalStatus,
    /// Approver comments.
    pub comments: Option<String>,
    /// When decided.
    pub decided_at: Option<DateTime<Utc>>,
}

impl ApprovalRecord {
    /// The view the workflow rules need.
    #[must_use]
    pub const fn state(&self) -> ApprovalState {
        ApprovalState {
            level: self.level,
            approver_id: self.approver_id,
            status: self.status,
        }
    }

    pub(crate) fn from_model(model: approvals::Model) -> Self {
        Self {
            id: ApprovalId::from_uuid(model.id),
            request_id: LeaveRequestId::from_uuid(model.leave_request_id),
            level: model.level,
            approver_id: EmployeeId::from_uuid(model.approver_id),
            role: model.role.into(),
            status: model.status.into(),
            comments: model.comments,
            decided_at: model.decided_at,
        }
    }
}

/// What a committed submission produced.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// The new request.
    pub request: LeaveRequestRecord,
    /// Its approval chain.
    pub approvals: Vec<ApprovalRecord>,
    /// The verdict computed inside the transaction.
    pub verdict: ValidationVerdict,
    /// Ledger debit, when the request was auto-approved.
    pub debit: Option<BalanceWrite>,
}

/// Leave request repository.
#[derive(Debug, Clone)]
pub struct LeaveRequestRepository {
    db: DatabaseConnection,
}

impl LeaveRequestRepository {
    /// Creates a new leave request repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Stores a new request and its approval chain in one transaction.
    ///
    /// `revalidate` receives the employee's pending and approved requests
    /// and the available balance as read inside the transaction, after the
    /// employee's guard row is locked. If its verdict is invalid nothing is
    /// written. When `auto_approve` is set and the verdict is eligible, the
    /// chain is written already approved and the ledger is debited in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// - `StoreError::Rejected` with the verdict's errors
    /// - `StoreError::Ledger` if the auto-approval debit fails
    /// - `StoreError::Database` on database failure
    pub async fn submit<F>(
        &self,
        input: &LeaveRequestInput,
        auto_approve: bool,
        today: NaiveDate,
        now: DateTime<Utc>,
        revalidate: F,
    ) -> Result<SubmitOutcome, StoreError>
    where
        F: FnOnce(&[ExistingRequest], Decimal) -> ValidationVerdict + Send,
    {
        let txn = self.db.begin().await?;

        bump_guard(&txn, input.employee_id, now).await?;

        let existing = active_requests(&txn, input.employee_id).await?;
        let available = if input.leave_type.is_ledger_tracked() {
            balance_available(
                &txn,
                BalanceKey::new(input.employee_id, input.leave_type, input.balance_year()),
            )
            .await?
        } else {
            Decimal::ZERO
        };

        let verdict = revalidate(&existing, available);
        if !verdict.valid {
            return Err(StoreError::Rejected(verdict.errors));
        }

        let finalize = auto_approve && verdict.auto_approval_eligible;
        let request_status = if finalize {
            RequestStatus::Approved
        } else {
            RequestStatus::Pending
        };

        let request_id = LeaveRequestId::new();
        let request = leave_requests::ActiveModel {
            id: Set(request_id.into_inner()),
            employee_id: Set(input.employee_id.into_inner()),
            leave_type: Set(input.leave_type.into()),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            half_day: Set(input.half_day.map(Into::into)),
            total_days_half_days: Set(units(verdict.total_days)?),
            status: Set(request_status.into()),
            reason: Set(input.reason.clone()),
            has_documentation: Set(input.has_documentation),
            cancelled_by: Set(None),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };
        leave_requests::Entity::insert(request)
            .exec_without_returning(&txn)
            .await?;

        let (level_status, comments, decided_at) = if finalize {
            (
                DbApprovalStatus::Approved,
                Some(AUTO_APPROVED_COMMENT.to_string()),
                Some(now),
            )
        } else {
            (DbApprovalStatus::Pending, None, None)
        };
        for level in &verdict.approval_chain {
            let row = approvals::ActiveModel {
                id: Set(ApprovalId::new().into_inner()),
                leave_request_id: Set(request_id.into_inner()),
                level: Set(level.level),
                approver_id: Set(level.approver_id.into_inner()),
                role: Set(level.role.into()),
                status: Set(level_status),
                comments: Set(comments.clone()),
                decided_at: Set(decided_at),
                created_at: Set(now),
            };
            approvals::Entity::insert(row)
                .exec_without_returning(&txn)
                .await?;
        }

        let request = load_request(&txn, request_id).await?;
        let debit = if finalize && request.leave_type.is_ledger_tracked() {
            Some(debit_for_request(&txn, &request, today, now).await?)
        } else {
            None
        };
        let approvals = load_approvals(&txn, request_id).await?;
        txn.commit().await?;

        Ok(SubmitOutcome {
            request,
            approvals,
            verdict,
            debit,
        })
    }

    /// Finds a request by id.
    pub async fn find(&self, id: LeaveRequestId) -> Result<Option<LeaveRequestRecord>, StoreError> {
        Ok(leave_requests::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(LeaveRequestRecord::from_model))
    }

    /// Approval rows of a request, by level.
    pub async fn approvals(&self, id: LeaveRequestId) -> Result<Vec<ApprovalRecord>, StoreError> {
        load_approvals(&self.db, id).await
    }

    /// Pending and approved requests of an employee (snapshot read).
    pub async fn active_for_employee(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<ExistingRequest>, StoreError> {
        active_requests(&self.db, employee_id).await
    }

    /// Requests of an employee, newest first.
    pub async fn list_for_employee(
        &self,
        employee_id: EmployeeId,
        page: &PageRequest,
    ) -> Result<PageResponse<LeaveRequestRecord>, StoreError> {
        let window = page.window();
        let query = leave_requests::Entity::find()
            .filter(leave_requests::Column::EmployeeId.eq(employee_id.into_inner()));
        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(leave_requests::Column::StartDate)
            .order_by_desc(leave_requests::Column::Id)
            .offset(window.offset())
            .limit(window.limit())
            .all(&self.db)
            .await?;
        Ok(PageResponse::new(rows, window, total).map(LeaveRequestRecord::from_model))
    }

    /// Approved maternity and paternity ranges touching `range`, per
    /// employee.
    pub async fn approved_parental_overlapping(
        &self,
        range: DateRange,
    ) -> Result<Vec<(EmployeeId, DateRange)>, StoreError> {
        let rows = leave_requests::Entity::find()
            .filter(leave_requests::Column::Status.eq(DbRequestStatus::Approved))
            .filter(
                leave_requests::Column::LeaveType
                    .is_in([LeaveTypeCode::Maternity, LeaveTypeCode::Paternity]),
            )
            .filter(leave_requests::Column::StartDate.lte(range.end))
            .filter(leave_requests::Column::EndDate.gte(range.start))
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    EmployeeId::from_uuid(row.employee_id),
                    DateRange::new(row.start_date, row.end_date),
                )
            })
            .collect())
    }
}

/// Locks the employee's guard row for the rest of the transaction.
pub(crate) async fn bump_guard<C: ConnectionTrait>(
    conn: &C,
    employee_id: EmployeeId,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let guard = request_guards::ActiveModel {
        employee_id: Set(employee_id.into_inner()),
        counter: Set(0),
        updated_at: Set(now),
    };
    request_guards::Entity::insert(guard)
        .on_conflict(
            OnConflict::column(request_guards::Column::EmployeeId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    request_guards::Entity::update_many()
        .col_expr(
            request_guards::Column::Counter,
            Expr::col(request_guards::Column::Counter).add(1),
        )
        .col_expr(request_guards::Column::UpdatedAt, Expr::value(now))
        .filter(request_guards::Column::EmployeeId.eq(employee_id.into_inner()))
        .exec(conn)
        .await?;
    Ok(())
}

pub(crate) async fn active_requests<C: ConnectionTrait>(
    conn: &C,
    employee_id: EmployeeId,
) -> Result<Vec<ExistingRequest>, StoreError> {
    let rows = leave_requests::Entity::find()
        .filter(leave_requests::Column::EmployeeId.eq(employee_id.into_inner()))
        .filter(
            leave_requests::Column::Status
                .is_in([DbRequestStatus::Pending, DbRequestStatus::Approved]),
        )
        .order_by_asc(leave_requests::Column::StartDate)
        .all(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| LeaveRequestRecord::from_model(row).as_existing())
        .collect())
}

async fn balance_available<C: ConnectionTrait>(
    conn: &C,
    key: BalanceKey,
) -> Result<Decimal, StoreError> {
    let row = balance::find_row(conn, key).await?;
    Ok(row.map_or(Decimal::ZERO, |row| {
        convert::balance(&row).reconciled().balance.available
    }))
}

pub(crate) async fn load_request<C: ConnectionTrait>(
    conn: &C,
    id: LeaveRequestId,
) -> Result<LeaveRequestRecord, StoreError> {
    leave_requests::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .map(LeaveRequestRecord::from_model)
        .ok_or_else(|| StoreError::not_found("leave request", id))
}

pub(crate) async fn load_approvals<C: ConnectionTrait>(
    conn: &C,
    id: LeaveRequestId,
) -> Result<Vec<ApprovalRecord>, StoreError> {
    let rows = approvals::Entity::find()
        .filter(approvals::Column::LeaveRequestId.eq(id.into_inner()))
        .order_by_asc(approvals::Column::Level)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(ApprovalRecord::from_model).collect())
}

/// Debits the ledger for an approved request and, for comp-off, draws the
/// grants down.
pub(crate) async fn debit_for_request<C: ConnectionTrait>(
    conn: &C,
    request: &LeaveRequestRecord,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<BalanceWrite, StoreError> {
    let write = balance::apply_in(
        conn,
        BalanceKey::new(request.employee_id, request.leave_type, request.balance_year()),
        BalanceChange::Debit(request.total_days),
        &request_reference(request.id),
        now,
    )
    .await?;
    if request.leave_type == LeaveType::CompOff {
        let uncovered =
            comp_off::redeem_in(conn, request.employee_id, request.total_days, today, now).await?;
        if !uncovered.is_zero() {
            warn!(
                request_id = %request.id,
                employee_id = %request.employee_id,
                amount = %uncovered,
                "comp-off debit not backed by an active grant"
            );
        }
    }
    Ok(write)
}

/// Journal reference for movements caused by a request.
#[must_use]
pub fn request_reference(id: LeaveRequestId) -> String {
    format!("request:{id}")
}
