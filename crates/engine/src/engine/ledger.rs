//! Direct ledger entry points and balance reads.

use rust_decimal::Decimal;
use tracing::info;

use leaveledger_core::leave::LeaveType;
use leaveledger_core::ledger::LeaveBalance;
use leaveledger_db::repositories::{AnomalyRecord, BalanceChange, BalanceKey, BalanceWrite, JournalEntry};
use leaveledger_shared::types::{EmployeeId, PageRequest, PageResponse};

use super::LeaveEngine;
use crate::error::EngineError;

impl LeaveEngine {
    async fn apply_change(
        &self,
        key: BalanceKey,
        change: BalanceChange,
        reference: &str,
    ) -> Result<BalanceWrite, EngineError> {
        let now = self.now();
        let write = self
            .retry
            .run("ledger", || self.balances.apply(key, change, reference, now))
            .await?;
        self.report_repair(&write, "ledger").await;
        info!(
            %key,
            movement = %change.kind(),
            amount = %write.amount,
            available = %write.balance.available,
            reference,
            "Ledger updated"
        );
        Ok(write)
    }

    /// Adds entitlement.
    pub async fn credit(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        year: i32,
        amount: Decimal,
        reference: &str,
    ) -> Result<LeaveBalance, EngineError> {
        let key = BalanceKey::new(employee_id, leave_type, year);
        Ok(self
            .apply_change(key, BalanceChange::Credit(amount), reference)
            .await?
            .balance)
    }

    /// Consumes available balance.
    ///
    /// # Errors
    ///
    /// `InsufficientBalance` if `available` would go negative; the
    /// balance is left untouched.
    pub async fn debit(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        year: i32,
        amount: Decimal,
        reference: &str,
    ) -> Result<LeaveBalance, EngineError> {
        let key = BalanceKey::new(employee_id, leave_type, year);
        Ok(self
            .apply_change(key, BalanceChange::Debit(amount), reference)
            .await?
            .balance)
    }

    /// Undoes a debit.
    pub async fn reverse(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        year: i32,
        amount: Decimal,
        reference: &str,
    ) -> Result<LeaveBalance, EngineError> {
        let key = BalanceKey::new(employee_id, leave_type, year);
        Ok(self
            .apply_change(key, BalanceChange::Reverse(amount), reference)
            .await?
            .balance)
    }

    /// One balance, zero if never written. A stored record violating the
    /// ledger invariants is returned clamped and the violation logged.
    pub async fn get_balance(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<LeaveBalance, EngineError> {
        let reconciliation = self
            .balances
            .read(BalanceKey::new(employee_id, leave_type, year))
            .await?;
        Self::log_read_anomaly(&reconciliation);
        Ok(reconciliation.balance)
    }

    /// Every stored balance of an employee for a year.
    pub async fn balances_for(
        &self,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<Vec<LeaveBalance>, EngineError> {
        let rows = self.balances.list_for_employee(employee_id, year).await?;
        Ok(rows
            .into_iter()
            .map(|reconciliation| {
                Self::log_read_anomaly(&reconciliation);
                reconciliation.balance
            })
            .collect())
    }

    /// Journal of one balance, oldest first.
    pub async fn balance_history(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        year: i32,
    ) -> Result<Vec<JournalEntry>, EngineError> {
        Ok(self
            .balances
            .journal(BalanceKey::new(employee_id, leave_type, year))
            .await?)
    }

    /// Recorded ledger anomalies, newest first.
    pub async fn list_anomalies(
        &self,
        page: &PageRequest,
    ) -> Result<PageResponse<AnomalyRecord>, EngineError> {
        Ok(self.anomalies.list(page).await?)
    }
}
