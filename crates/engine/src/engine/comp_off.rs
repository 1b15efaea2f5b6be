//! Comp-off work claims and their decisions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use leaveledger_core::comp_off::CompOffRules;
use leaveledger_core::workflow::{ApprovalChainBuilder, Verdict};
use leaveledger_db::StoreError;
use leaveledger_db::repositories::{
    GrantRecord, NewWorkLog, WorkLogDecision, WorkLogRecord, WorkLogVerdict,
};
use leaveledger_shared::types::{CompOffWorkLogId, EmployeeId};

use super::LeaveEngine;
use crate::error::EngineError;

/// A claim for working a weekend day or holiday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompOffClaim {
    /// Claimant.
    pub employee_id: EmployeeId,
    /// Day worked.
    pub work_date: NaiveDate,
    /// 0.5 or 1.
    pub days: Decimal,
    /// Why the work was needed.
    pub reason: String,
}

impl LeaveEngine {
    /// Files a work claim for a single approver (manager, else HR).
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the date is a working day, in the future,
    ///   too old, the amount is not 0.5 or 1, or nobody can approve it
    /// - `Overlap` if the day was already claimed
    pub async fn log_comp_off_work(&self, claim: CompOffClaim) -> Result<WorkLogRecord, EngineError> {
        let employee = self.active_employee(claim.employee_id).await?;
        let now = self.now();
        let today = employee.today(now);
        let holidays = self
            .holidays_between(&employee.location, claim.work_date, claim.work_date)
            .await?;

        let issues = CompOffRules::validate_work_log(claim.work_date, claim.days, today, &holidays);
        if !issues.is_empty() {
            return Err(EngineError::ValidationFailed { issues });
        }

        let pool = self.approver_pool(&employee).await?;
        let approver = ApprovalChainBuilder::single_approver(employee.id, &pool)?;

        let record = self
            .comp_off
            .log_work(
                NewWorkLog {
                    employee_id: employee.id,
                    work_date: claim.work_date,
                    days: claim.days,
                    reason: claim.reason,
                    approver_id: approver.approver_id,
                },
                now,
            )
            .await
            .map_err(|err| match err {
                StoreError::Rejected(issues) => EngineError::Overlap(
                    issues
                        .into_iter()
                        .map(|issue| issue.message)
                        .collect::<Vec<_>>()
                        .join("; "),
                ),
                other => other.into(),
            })?;

        info!(
            work_log_id = %record.id,
            employee_id = %record.employee_id,
            work_date = %record.work_date,
            days = %record.days,
            approver_id = %record.approver_id,
            "Comp-off work logged"
        );
        Ok(record)
    }

    /// Decides a work claim. Approval creates a grant and credits the
    /// comp-off ledger in one transaction.
    pub async fn decide_comp_off(
        &self,
        log_id: CompOffWorkLogId,
        approver_id: EmployeeId,
        verdict: Verdict,
        comments: Option<String>,
    ) -> Result<WorkLogDecision, EngineError> {
        let now = self.now();
        let today = self.today_for(approver_id, now).await?;
        let input = WorkLogVerdict {
            log_id,
            approver_id,
            verdict,
            comments,
        };
        let decision = self
            .retry
            .run("decide_comp_off", || {
                self.comp_off.decide(
                    input.clone(),
                    self.policy.comp_off_expiry_months,
                    today,
                    now,
                )
            })
            .await?;

        info!(
            %log_id,
            %approver_id,
            status = %decision.log.status,
            granted = ?decision.grant.as_ref().map(|g| g.granted),
            expires_on = ?decision.grant.as_ref().map(|g| g.expires_on),
            "Comp-off claim decided"
        );
        Ok(decision)
    }

    /// An employee's grants, earliest expiry first.
    pub async fn comp_off_grants(&self, employee_id: EmployeeId) -> Result<Vec<GrantRecord>, EngineError> {
        Ok(self.comp_off.grants_for(employee_id).await?)
    }
}
