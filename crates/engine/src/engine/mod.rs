//! The leave engine service.
//!
//! [`LeaveEngine`] is constructed explicitly from a database connection,
//! its collaborators and configuration. Every write goes through a
//! repository transaction; notifications and anomaly reports happen after
//! the commit and never fail the operation that triggered them.

mod comp_off;
mod jobs;
mod ledger;
mod requests;

pub use comp_off::CompOffClaim;
pub use jobs::{
    AccrualRunSummary, BatchItemError, CarryForwardExpirySummary, CarryForwardSummary,
    CompOffExpirySummary, ReconcileSummary,
};
pub use requests::{DecisionResult, RequestDetail, SubmittedRequest};

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use futures::future::try_join_all;
use sea_orm::DatabaseConnection;
use tracing::warn;

use leaveledger_core::carry_forward::CarryForwardPolicy;
use leaveledger_core::employee::{Employee, Role};
use leaveledger_core::ledger::{BalanceAnomaly, Reconciliation};
use leaveledger_core::ports::{
    Clock, EmployeeDirectory, HolidayCalendar, Notification, NotificationSink,
};
use leaveledger_core::validation::IssueKind;
use leaveledger_core::workflow::ApproverPool;
use leaveledger_db::repositories::{
    AccrualRepository, AnomalyRepository, BalanceKey, BalanceRepository, BalanceWrite,
    CarryForwardRepository, CompOffRepository, LeaveRequestRepository, WorkflowRepository,
};
use leaveledger_shared::types::EmployeeId;
use leaveledger_shared::{EngineConfig, PolicyConfig};

use crate::error::EngineError;
use crate::retry::RetryPolicy;

/// Log target operators watch for ledger invariant violations.
pub const ANOMALY_TARGET: &str = "leaveledger::anomaly";

/// Everything the engine consumes from outside its own tables.
#[derive(Clone)]
pub struct Collaborators {
    /// Employee directory.
    pub directory: Arc<dyn EmployeeDirectory>,
    /// Holiday calendar.
    pub calendar: Arc<dyn HolidayCalendar>,
    /// Notification transport.
    pub notifier: Arc<dyn NotificationSink>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

/// Leave ledger and approval engine.
#[derive(Clone)]
pub struct LeaveEngine {
    balances: BalanceRepository,
    requests: LeaveRequestRepository,
    workflow: WorkflowRepository,
    accruals: AccrualRepository,
    carry_forward: CarryForwardRepository,
    comp_off: CompOffRepository,
    anomalies: AnomalyRepository,
    directory: Arc<dyn EmployeeDirectory>,
    calendar: Arc<dyn HolidayCalendar>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    policy: PolicyConfig,
    carry_forward_policy: CarryForwardPolicy,
    retry: RetryPolicy,
}

impl LeaveEngine {
    /// Creates an engine over `db`.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        collaborators: Collaborators,
        config: EngineConfig,
        policy: PolicyConfig,
    ) -> Self {
        let Collaborators {
            directory,
            calendar,
            notifier,
            clock,
        } = collaborators;
        Self {
            balances: BalanceRepository::new(db.clone()),
            requests: LeaveRequestRepository::new(db.clone()),
            workflow: WorkflowRepository::new(db.clone()),
            accruals: AccrualRepository::new(db.clone()),
            carry_forward: CarryForwardRepository::new(db.clone()),
            comp_off: CompOffRepository::new(db.clone()),
            anomalies: AnomalyRepository::new(db),
            directory,
            calendar,
            notifier,
            clock,
            retry: RetryPolicy::from_config(&config),
            carry_forward_policy: CarryForwardPolicy::new(policy.clone()),
            config,
            policy,
        }
    }

    /// Engine configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    async fn employee(&self, id: EmployeeId) -> Result<Employee, EngineError> {
        self.directory
            .find(id)
            .await?
            .ok_or_else(|| EngineError::not_found("employee", id))
    }

    async fn active_employee(&self, id: EmployeeId) -> Result<Employee, EngineError> {
        let employee = self.employee(id).await?;
        if employee.is_active() {
            Ok(employee)
        } else {
            Err(EngineError::invalid(
                IssueKind::InactiveEmployee,
                "employee_id",
                format!("employee {id} is not active"),
            ))
        }
    }

    /// The local date of `employee_id`, or the UTC date for someone the
    /// directory no longer knows.
    async fn today_for(&self, employee_id: EmployeeId, now: DateTime<Utc>) -> Result<NaiveDate, EngineError> {
        Ok(self
            .directory
            .find(employee_id)
            .await?
            .map_or_else(|| now.date_naive(), |employee| employee.today(now)))
    }

    /// Candidate approvers: the active manager and the first active
    /// admins other than the requester.
    async fn approver_pool(&self, employee: &Employee) -> Result<ApproverPool, EngineError> {
        let manager = match employee.manager_id {
            Some(id) => self
                .directory
                .find(id)
                .await?
                .filter(Employee::is_active)
                .map(|manager| manager.id),
            None => None,
        };
        let hr_admin = self.directory.first_with_role(Role::HrAdmin, employee.id).await?;
        let it_admin = self.directory.first_with_role(Role::ItAdmin, employee.id).await?;
        Ok(ApproverPool {
            manager,
            hr_admin: hr_admin.map(|e| e.id),
            it_admin: it_admin.map(|e| e.id),
        })
    }

    /// Holiday dates at `location` for every year `start..=end` touches.
    async fn holidays_between(
        &self,
        location: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashSet<NaiveDate>, EngineError> {
        let (first, last) = if start <= end {
            (start.year(), end.year())
        } else {
            (end.year(), start.year())
        };
        let calendars =
            try_join_all((first..=last).map(|year| self.calendar.holidays(location, year))).await?;
        Ok(calendars
            .into_iter()
            .flatten()
            .map(|holiday| holiday.date)
            .collect())
    }

    async fn notify(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(notification).await {
            warn!(error = %e, "Notification delivery failed");
        }
    }

    /// Logs and persists an anomaly a write repaired.
    async fn report_anomaly(&self, key: BalanceKey, anomaly: &BalanceAnomaly, source: &str) {
        warn!(
            target: ANOMALY_TARGET,
            employee_id = %key.employee_id,
            leave_type = %key.leave_type,
            year = key.year,
            kind = %anomaly.kind,
            source,
            "{}",
            anomaly.describe()
        );
        if let Err(e) = self.anomalies.record(key, anomaly, source, self.now()).await {
            warn!(error = %e, %key, "Failed to persist ledger anomaly");
        }
    }

    async fn report_repair(&self, write: &BalanceWrite, source: &str) {
        if let Some(anomaly) = &write.repaired {
            let key = BalanceKey::new(
                write.balance.employee_id,
                write.balance.leave_type,
                write.balance.year,
            );
            self.report_anomaly(key, anomaly, source).await;
        }
    }

    /// Reads clamp without writing; the finding is only logged here and
    /// persisted by the next write or the reconciliation job.
    fn log_read_anomaly(reconciliation: &Reconciliation) {
        if let Some(anomaly) = &reconciliation.anomaly {
            let balance = &reconciliation.balance;
            warn!(
                target: ANOMALY_TARGET,
                employee_id = %balance.employee_id,
                leave_type = %balance.leave_type,
                year = balance.year,
                kind = %anomaly.kind,
                source = "read",
                "{}",
                anomaly.describe()
            );
        }
    }
}
