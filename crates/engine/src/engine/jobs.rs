//! Scheduled batch jobs.
//!
//! Each job walks its population item by item and keeps going past
//! failures, returning counts plus the per-item errors. Every item is
//! guarded by an idempotency marker written in the same transaction as
//! its ledger effect, so re-running a job over the same period is safe.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use leaveledger_core::accrual::{AccrualCalculator, AccrualOutcome, AccrualPeriod};
use leaveledger_core::calendar::DateRange;
use leaveledger_core::carry_forward::{CarryForwardPolicy, CarryForwardRule};
use leaveledger_core::employee::Country;
use leaveledger_core::leave::LeaveType;
use leaveledger_core::ports::Notification;
use leaveledger_core::validation::IssueKind;
use leaveledger_db::repositories::{BalanceChange, BalanceKey};
use leaveledger_shared::types::EmployeeId;

use super::LeaveEngine;
use crate::error::EngineError;

/// One item a batch job could not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItemError {
    /// Employee concerned, if the failure is per employee.
    pub employee_id: Option<EmployeeId>,
    /// Ledger concerned, if the failure is per ledger.
    pub leave_type: Option<LeaveType>,
    /// What went wrong.
    pub message: String,
}

impl BatchItemError {
    fn new(employee_id: EmployeeId, leave_type: Option<LeaveType>, err: &impl ToString) -> Self {
        Self {
            employee_id: Some(employee_id),
            leave_type,
            message: err.to_string(),
        }
    }
}

/// Result of an accrual run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccrualRunSummary {
    /// Period covered.
    pub period: AccrualPeriod,
    /// Employees examined.
    pub processed: usize,
    /// Periods credited by this run.
    pub created: usize,
    /// Periods recorded as suspended by parental leave.
    pub suspended: usize,
    /// Already processed, or not eligible.
    pub skipped: usize,
    /// Total credited per ledger.
    pub credited: BTreeMap<LeaveType, Decimal>,
    /// Per-employee failures.
    pub errors: Vec<BatchItemError>,
}

impl AccrualRunSummary {
    fn new(period: AccrualPeriod) -> Self {
        Self {
            period,
            processed: 0,
            created: 0,
            suspended: 0,
            skipped: 0,
            credited: BTreeMap::new(),
            errors: Vec::new(),
        }
    }
}

/// Result of a year-end carry-forward run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarryForwardSummary {
    /// Closed year.
    pub from_year: i32,
    /// Receiving year.
    pub to_year: i32,
    /// Employees examined.
    pub processed: usize,
    /// Carried per ledger.
    pub carried_by_type: BTreeMap<LeaveType, Decimal>,
    /// Lapsed per ledger.
    pub lapsed_by_type: BTreeMap<LeaveType, Decimal>,
    /// Ledgers already closed by an earlier run.
    pub skipped: usize,
    /// Per-ledger failures.
    pub errors: Vec<BatchItemError>,
}

/// Result of a carried-PTO expiry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarryForwardExpirySummary {
    /// Year whose carried PTO expires.
    pub year: i32,
    /// False when run before the expiry date; nothing is touched then.
    pub due: bool,
    /// Carry-forward runs examined.
    pub processed: usize,
    /// Total days extinguished.
    pub expired: Decimal,
    /// Runs already expired.
    pub skipped: usize,
    /// Per-employee failures.
    pub errors: Vec<BatchItemError>,
}

/// Result of a comp-off expiry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompOffExpirySummary {
    /// Cut-off date.
    pub as_of: NaiveDate,
    /// Grants expired by this run.
    pub expired_grants: usize,
    /// Total days extinguished.
    pub extinguished: Decimal,
    /// Expiry warnings sent.
    pub warned: usize,
    /// Per-grant failures.
    pub errors: Vec<BatchItemError>,
}

/// Result of a reconciliation scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    /// Year scanned.
    pub year: i32,
    /// Balances examined.
    pub scanned: usize,
    /// Balances repaired.
    pub repaired: usize,
    /// Per-balance failures.
    pub errors: Vec<BatchItemError>,
}

impl LeaveEngine {
    /// India monthly CL/PL accrual for every active employee.
    ///
    /// Employees on approved maternity or paternity leave during the month
    /// get a `SKIPPED_MATERNITY` marker and no credit.
    pub async fn run_monthly_accrual(
        &self,
        year: i32,
        month: u32,
    ) -> Result<AccrualRunSummary, EngineError> {
        let range = DateRange::month(year, month).ok_or_else(|| {
            EngineError::invalid(
                IssueKind::InvalidDateRange,
                "month",
                format!("{year}-{month} is not a calendar month"),
            )
        })?;
        let mut parental: HashMap<EmployeeId, Vec<DateRange>> = HashMap::new();
        for (employee_id, leave) in self.requests.approved_parental_overlapping(range).await? {
            parental.entry(employee_id).or_default().push(leave);
        }
        self.run_accrual(AccrualPeriod::Month { year, month }, &parental)
            .await
    }

    /// USA annual PTO accrual for every active employee.
    pub async fn run_annual_pto_accrual(&self, year: i32) -> Result<AccrualRunSummary, EngineError> {
        self.run_accrual(AccrualPeriod::Year(year), &HashMap::new())
            .await
    }

    async fn run_accrual(
        &self,
        period: AccrualPeriod,
        parental: &HashMap<EmployeeId, Vec<DateRange>>,
    ) -> Result<AccrualRunSummary, EngineError> {
        let employees = self.directory.list_active().await?;
        let now = self.now();
        let mut summary = AccrualRunSummary::new(period);
        info!(%period, employees = employees.len(), "Accrual run started");

        for employee in &employees {
            summary.processed += 1;

            match self.accruals.has_marker(employee.id, period).await {
                Ok(true) => {
                    summary.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    summary.errors.push(BatchItemError::new(employee.id, None, &e));
                    continue;
                }
            }

            let leaves = parental.get(&employee.id).map_or(&[][..], Vec::as_slice);
            let outcome = match AccrualCalculator::compute(employee, period, leaves) {
                Ok(outcome) => outcome,
                Err(e) => {
                    summary.errors.push(BatchItemError::new(employee.id, None, &e));
                    continue;
                }
            };
            if outcome.status().is_none() {
                summary.skipped += 1;
                continue;
            }

            let recorded = self
                .retry
                .run("accrual", || {
                    self.accruals.record(employee.id, period, &outcome, now)
                })
                .await;
            match recorded {
                Ok(true) => {
                    if matches!(outcome, AccrualOutcome::SkippedMaternity) {
                        summary.suspended += 1;
                    } else {
                        summary.created += 1;
                    }
                    for instruction in outcome.instructions() {
                        *summary.credited.entry(instruction.leave_type).or_default() +=
                            instruction.amount;
                    }
                }
                // a concurrent run wrote the marker first
                Ok(false) => summary.skipped += 1,
                Err(e) => {
                    warn!(employee_id = %employee.id, %period, error = %e, "Accrual failed");
                    summary.errors.push(BatchItemError::new(employee.id, None, &e));
                }
            }
        }

        info!(
            %period,
            processed = summary.processed,
            created = summary.created,
            suspended = summary.suspended,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "Accrual run finished"
        );
        Ok(summary)
    }

    /// Closes `from_year` for every active employee and carries what the
    /// policy allows into `to_year`.
    pub async fn run_year_end_carry_forward(
        &self,
        from_year: i32,
        to_year: i32,
    ) -> Result<CarryForwardSummary, EngineError> {
        if to_year <= from_year {
            return Err(EngineError::invalid(
                IssueKind::InvalidDateRange,
                "to_year",
                format!("cannot carry from {from_year} into {to_year}"),
            ));
        }
        let employees = self.directory.list_active().await?;
        let now = self.now();
        let mut summary = CarryForwardSummary {
            from_year,
            to_year,
            processed: 0,
            carried_by_type: BTreeMap::new(),
            lapsed_by_type: BTreeMap::new(),
            skipped: 0,
            errors: Vec::new(),
        };
        info!(from_year, to_year, employees = employees.len(), "Carry-forward run started");

        for employee in &employees {
            summary.processed += 1;
            for &leave_type in CarryForwardPolicy::types_for(employee.country) {
                let rule = self.carry_forward_policy.rule_for(employee, leave_type);
                if rule == CarryForwardRule::Skip {
                    continue;
                }
                let closed = self
                    .retry
                    .run("carry_forward", || {
                        self.carry_forward.close_year(
                            employee.id,
                            leave_type,
                            (from_year, to_year),
                            rule,
                            now,
                        )
                    })
                    .await;
                match closed {
                    Ok(Some(plan)) => {
                        *summary.carried_by_type.entry(leave_type).or_default() += plan.carried;
                        *summary.lapsed_by_type.entry(leave_type).or_default() += plan.lapsed;
                    }
                    Ok(None) => summary.skipped += 1,
                    Err(e) => {
                        warn!(employee_id = %employee.id, %leave_type, error = %e, "Carry-forward failed");
                        summary
                            .errors
                            .push(BatchItemError::new(employee.id, Some(leave_type), &e));
                    }
                }
            }
        }

        info!(
            from_year,
            to_year,
            processed = summary.processed,
            skipped = summary.skipped,
            errors = summary.errors.len(),
            "Carry-forward run finished"
        );
        Ok(summary)
    }

    /// Extinguishes unused PTO carried into `year` once its Q1 expiry
    /// date has passed. Run earlier it does nothing.
    pub async fn run_carry_forward_expiry(
        &self,
        year: i32,
    ) -> Result<CarryForwardExpirySummary, EngineError> {
        let now = self.now();
        let today = Country::Usa.today(now);
        let mut summary = CarryForwardExpirySummary {
            year,
            due: self.carry_forward_policy.usa_carry_forward_expired(year, today),
            processed: 0,
            expired: Decimal::ZERO,
            skipped: 0,
            errors: Vec::new(),
        };
        if !summary.due {
            info!(year, %today, "Carried PTO not yet expired");
            return Ok(summary);
        }

        for run in self.carry_forward.carried_into(LeaveType::Pto, year).await? {
            summary.processed += 1;
            let expired = self
                .retry
                .run("carry_forward_expiry", || {
                    self.carry_forward
                        .expire_carried(run.employee_id, run.leave_type, year, now)
                })
                .await;
            match expired {
                Ok(Some(amount)) => summary.expired += amount,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    warn!(employee_id = %run.employee_id, year, error = %e, "Carry-forward expiry failed");
                    summary
                        .errors
                        .push(BatchItemError::new(run.employee_id, Some(run.leave_type), &e));
                }
            }
        }

        info!(
            year,
            processed = summary.processed,
            expired = %summary.expired,
            "Carry-forward expiry finished"
        );
        Ok(summary)
    }

    /// Expires comp-off grants past their window as of `as_of` and warns
    /// owners of grants about to lapse.
    pub async fn run_comp_off_expiry(
        &self,
        as_of: NaiveDate,
    ) -> Result<CompOffExpirySummary, EngineError> {
        let now = self.now();
        let mut summary = CompOffExpirySummary {
            as_of,
            expired_grants: 0,
            extinguished: Decimal::ZERO,
            warned: 0,
            errors: Vec::new(),
        };

        for grant in self.comp_off.lapsed(as_of).await? {
            let expired = self
                .retry
                .run("comp_off_expiry", || self.comp_off.expire_grant(&grant, as_of, now))
                .await;
            match expired {
                Ok(Some(done)) => {
                    summary.expired_grants += 1;
                    summary.extinguished += done.extinguished;
                }
                // redeemed or expired concurrently
                Ok(None) => {}
                Err(e) => {
                    warn!(grant_id = %grant.id, error = %e, "Comp-off expiry failed");
                    summary.errors.push(BatchItemError::new(
                        grant.employee_id,
                        Some(LeaveType::CompOff),
                        &e,
                    ));
                }
            }
        }

        let window = self.policy.comp_off_expiry_warning_days;
        for grant in self.comp_off.expiring_within(as_of, window).await? {
            self.notify(Notification::BalanceExpiring {
                employee_id: grant.employee_id,
                leave_type: LeaveType::CompOff,
                amount: grant.remaining,
                expires_on: grant.expires_on,
                grant_id: Some(grant.id),
            })
            .await;
            summary.warned += 1;
        }

        info!(
            %as_of,
            expired = summary.expired_grants,
            extinguished = %summary.extinguished,
            warned = summary.warned,
            "Comp-off expiry finished"
        );
        Ok(summary)
    }

    /// Repairs every balance of `year` that violates the ledger
    /// invariants and records each repair as an anomaly.
    pub async fn reconcile_balances(&self, year: i32) -> Result<ReconcileSummary, EngineError> {
        let now = self.now();
        let mut summary = ReconcileSummary {
            year,
            scanned: 0,
            repaired: 0,
            errors: Vec::new(),
        };

        for balance in self.balances.list_year(year).await? {
            summary.scanned += 1;
            if balance.reconciled().anomaly.is_none() {
                continue;
            }
            let key = BalanceKey::new(balance.employee_id, balance.leave_type, balance.year);
            let repaired = self
                .retry
                .run("reconcile", || {
                    self.balances.apply(key, BalanceChange::Repair, "reconcile", now)
                })
                .await;
            match repaired {
                Ok(write) => {
                    if let Some(anomaly) = &write.repaired {
                        self.report_anomaly(key, anomaly, "reconcile").await;
                        summary.repaired += 1;
                    }
                }
                Err(e) => {
                    summary.errors.push(BatchItemError::new(
                        key.employee_id,
                        Some(key.leave_type),
                        &e,
                    ));
                }
            }
        }

        info!(year, scanned = summary.scanned, repaired = summary.repaired, "Reconciliation finished");
        Ok(summary)
    }
}
