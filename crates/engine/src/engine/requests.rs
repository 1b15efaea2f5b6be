//! Request lifecycle: validate, submit, decide, cancel and reads.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use leaveledger_core::employee::{Employee, Role};
use leaveledger_core::ledger::LedgerError;
use leaveledger_core::ports::Notification;
use leaveledger_core::validation::{
    ExistingRequest, LeaveRequestInput, RequestValidator, ValidationContext, ValidationIssue,
    ValidationVerdict,
};
use leaveledger_core::workflow::{ApprovalStatus, ApproverPool, RequestStatus, Verdict};
use leaveledger_db::StoreError;
use leaveledger_db::repositories::{
    ApprovalRecord, BalanceKey, LeaveRequestRecord, LevelDecision, PendingApproval, SubmitOutcome,
};
use leaveledger_shared::EngineConfig;
use leaveledger_shared::types::{EmployeeId, LeaveRequestId, PageRequest, PageResponse};

use super::LeaveEngine;
use crate::error::EngineError;

/// A stored request and its approval chain.
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedRequest {
    /// New request id.
    pub request_id: LeaveRequestId,
    /// `Pending`, or `Approved` when auto-approved.
    pub status: RequestStatus,
    /// Working days counted.
    pub total_days: Decimal,
    /// Approval levels in order.
    pub approval_chain: Vec<ApprovalRecord>,
    /// Non-blocking findings.
    pub warnings: Vec<ValidationIssue>,
    /// Supporting documents must follow.
    pub required_documentation: bool,
}

/// Outcome of one level decision.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionResult {
    /// Request.
    pub request_id: LeaveRequestId,
    /// Level decided.
    pub level: i32,
    /// Status written to the level.
    pub level_status: ApprovalStatus,
    /// Aggregate request status.
    pub request_status: RequestStatus,
    /// Whoever decides next, while the request is still pending.
    pub next_approver: Option<EmployeeId>,
}

/// A request with its approval rows.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    /// Request.
    pub request: LeaveRequestRecord,
    /// Levels, lowest first.
    pub approvals: Vec<ApprovalRecord>,
}

/// What validation needs from collaborators, gathered once per call.
struct RequestContext {
    employee: Employee,
    today: NaiveDate,
    holidays: HashSet<NaiveDate>,
    approvers: ApproverPool,
}

impl RequestContext {
    fn validation<'a>(
        &'a self,
        config: &EngineConfig,
        existing: &'a [ExistingRequest],
        available: Decimal,
    ) -> ValidationContext<'a> {
        ValidationContext {
            employee: &self.employee,
            today: self.today,
            holidays: &self.holidays,
            available,
            existing,
            approvers: self.approvers,
            max_future_days: config.max_future_days,
            max_past_days: config.max_past_days,
        }
    }
}

impl LeaveEngine {
    async fn request_context(&self, input: &LeaveRequestInput) -> Result<RequestContext, EngineError> {
        let employee = self.employee(input.employee_id).await?;
        let today = employee.today(self.now());
        // days outside the window already fail validation, so their
        // holidays are never needed and a far-off range costs no lookups
        let from = input
            .start_date
            .max(today - Duration::days(self.config.max_past_days));
        let to = input
            .end_date
            .min(today + Duration::days(self.config.max_future_days));
        let holidays = if from <= to {
            self.holidays_between(&employee.location, from, to).await?
        } else {
            HashSet::new()
        };
        let approvers = self.approver_pool(&employee).await?;
        Ok(RequestContext {
            employee,
            today,
            holidays,
            approvers,
        })
    }

    async fn available_for(&self, input: &LeaveRequestInput) -> Result<Decimal, EngineError> {
        if !input.leave_type.is_ledger_tracked() {
            return Ok(Decimal::ZERO);
        }
        let key = BalanceKey::new(input.employee_id, input.leave_type, input.balance_year());
        let reconciliation = self.balances.read(key).await?;
        Self::log_read_anomaly(&reconciliation);
        Ok(reconciliation.balance.available)
    }

    /// Validates a request against a snapshot read without storing it.
    ///
    /// Problems are returned inside the verdict, all of them at once.
    pub async fn validate_request(
        &self,
        input: &LeaveRequestInput,
    ) -> Result<ValidationVerdict, EngineError> {
        let ctx = self.request_context(input).await?;
        let existing = self.requests.active_for_employee(input.employee_id).await?;
        let available = self.available_for(input).await?;
        Ok(RequestValidator::validate(
            input,
            &ctx.validation(&self.config, &existing, available),
        ))
    }

    /// Validates and stores a request with its approval chain.
    ///
    /// The snapshot verdict is re-checked inside the storing transaction
    /// against the overlap set and balance read there, so two racing
    /// submissions cannot both pass on stale data. With auto-approval
    /// enabled an eligible request is approved and debited in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// `EngineError::ValidationFailed` carrying every issue found, or an
    /// infrastructure error. A failed submission writes nothing.
    pub async fn submit_request(
        &self,
        input: LeaveRequestInput,
    ) -> Result<SubmittedRequest, EngineError> {
        let ctx = self.request_context(&input).await?;
        let existing = self.requests.active_for_employee(input.employee_id).await?;
        let available = self.available_for(&input).await?;
        let snapshot =
            RequestValidator::validate(&input, &ctx.validation(&self.config, &existing, available));
        if !snapshot.valid {
            info!(
                employee_id = %input.employee_id,
                leave_type = %input.leave_type,
                errors = snapshot.errors.len(),
                "Leave request failed validation"
            );
            return Err(EngineError::ValidationFailed {
                issues: snapshot.errors,
            });
        }

        let now = self.now();
        let (input_ref, ctx_ref, config) = (&input, &ctx, &self.config);
        let outcome = self
            .retry
            .run("submit_request", move || {
                self.requests.submit(
                    input_ref,
                    config.auto_approve,
                    ctx_ref.today,
                    now,
                    move |existing, available| {
                        RequestValidator::validate(
                            input_ref,
                            &ctx_ref.validation(config, existing, available),
                        )
                    },
                )
            })
            .await?;
        let SubmitOutcome {
            request,
            approvals,
            verdict,
            debit,
        } = outcome;

        if let Some(write) = &debit {
            self.report_repair(write, "submit_request").await;
        }

        info!(
            request_id = %request.id,
            employee_id = %request.employee_id,
            leave_type = %request.leave_type,
            total_days = %request.total_days,
            status = %request.status,
            levels = approvals.len(),
            "Leave request submitted"
        );

        if request.status == RequestStatus::Pending {
            if let Some(first) = approvals.iter().find(|a| a.status == ApprovalStatus::Pending) {
                self.notify(Notification::ApprovalNeeded {
                    request_id: request.id,
                    approver_id: first.approver_id,
                    level: first.level,
                })
                .await;
            }
        } else {
            self.notify(Notification::RequestDecided {
                request_id: request.id,
                employee_id: request.employee_id,
                status: request.status,
            })
            .await;
        }

        Ok(SubmittedRequest {
            request_id: request.id,
            status: request.status,
            total_days: request.total_days,
            approval_chain: approvals,
            warnings: verdict.warnings,
            required_documentation: verdict.required_documentation,
        })
    }

    /// Records one approver's verdict on one level.
    ///
    /// Approving the last level approves the request and debits the
    /// ledger in the same transaction.
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown request or level
    /// - `AlreadyDecided` if the level was decided before
    /// - `Unauthorized` if the caller is not the level's approver
    /// - `InvalidTransition` for a terminal request or a lower level still
    ///   pending
    /// - `Conflict` if the balance no longer covers the request at
    ///   finalization; nothing is written
    pub async fn decide(
        &self,
        request_id: LeaveRequestId,
        approver_id: EmployeeId,
        level: i32,
        verdict: Verdict,
        comments: Option<String>,
    ) -> Result<DecisionResult, EngineError> {
        let request = self
            .requests
            .find(request_id)
            .await?
            .ok_or_else(|| EngineError::not_found("leave request", request_id))?;
        let now = self.now();
        let today = self.today_for(request.employee_id, now).await?;

        let decision = LevelDecision {
            request_id,
            approver_id,
            level,
            verdict,
            comments,
        };
        let outcome = self
            .retry
            .run("decide", || self.workflow.decide(decision.clone(), today, now))
            .await
            .map_err(|err| match err {
                StoreError::Ledger(LedgerError::InsufficientBalance { .. }) => {
                    warn!(%request_id, level, error = %err, "Finalizing debit lost to a concurrent change");
                    EngineError::Conflict(format!(
                        "balance changed before request {request_id} could be approved: {err}"
                    ))
                }
                other => other.into(),
            })?;

        if let Some(write) = &outcome.debit {
            self.report_repair(write, "decide").await;
        }

        let request_status = outcome.decision.request_status;
        info!(
            %request_id,
            %approver_id,
            level,
            level_status = %outcome.decision.level_status,
            %request_status,
            "Approval level decided"
        );

        let next_approver = match (&outcome.next, request_status) {
            (Some(next), RequestStatus::Pending) => {
                self.notify(Notification::ApprovalNeeded {
                    request_id,
                    approver_id: next.approver_id,
                    level: next.level,
                })
                .await;
                Some(next.approver_id)
            }
            (_, RequestStatus::Pending) => None,
            _ => {
                self.notify(Notification::RequestDecided {
                    request_id,
                    employee_id: outcome.request.employee_id,
                    status: request_status,
                })
                .await;
                None
            }
        };

        Ok(DecisionResult {
            request_id,
            level,
            level_status: outcome.decision.level_status,
            request_status,
            next_approver,
        })
    }

    /// Cancels a request.
    ///
    /// The owner may cancel a pending request, and the owner or an HR
    /// admin an approved one that has not started; its debit is reversed
    /// in the same transaction.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` for anything else, `NotFound` for an unknown
    /// request.
    pub async fn cancel_request(
        &self,
        request_id: LeaveRequestId,
        actor_id: EmployeeId,
    ) -> Result<LeaveRequestRecord, EngineError> {
        let request = self
            .requests
            .find(request_id)
            .await?
            .ok_or_else(|| EngineError::not_found("leave request", request_id))?;
        let actor_is_hr_admin = self
            .directory
            .find(actor_id)
            .await?
            .is_some_and(|actor| actor.is_active() && actor.role == Role::HrAdmin);
        let now = self.now();
        let today = self.today_for(request.employee_id, now).await?;

        let outcome = self
            .retry
            .run("cancel_request", || {
                self.workflow
                    .cancel(request_id, actor_id, actor_is_hr_admin, today, now)
            })
            .await?;

        if let Some(write) = &outcome.reversal {
            self.report_repair(write, "cancel_request").await;
        }

        info!(
            %request_id,
            %actor_id,
            previous = %outcome.effect.previous,
            reversed = outcome.effect.reverse_debit,
            "Leave request cancelled"
        );
        self.notify(Notification::RequestDecided {
            request_id,
            employee_id: outcome.request.employee_id,
            status: RequestStatus::Cancelled,
        })
        .await;

        Ok(outcome.request)
    }

    /// One request with its approval rows.
    pub async fn get_request(&self, request_id: LeaveRequestId) -> Result<RequestDetail, EngineError> {
        let request = self
            .requests
            .find(request_id)
            .await?
            .ok_or_else(|| EngineError::not_found("leave request", request_id))?;
        let approvals = self.requests.approvals(request_id).await?;
        Ok(RequestDetail { request, approvals })
    }

    /// An employee's requests, newest first.
    pub async fn list_requests(
        &self,
        employee_id: EmployeeId,
        page: &PageRequest,
    ) -> Result<PageResponse<LeaveRequestRecord>, EngineError> {
        Ok(self.requests.list_for_employee(employee_id, page).await?)
    }

    /// Levels waiting on `approver_id`.
    pub async fn pending_approvals(
        &self,
        approver_id: EmployeeId,
    ) -> Result<Vec<PendingApproval>, EngineError> {
        Ok(self.workflow.pending_for_approver(approver_id).await?)
    }
}
