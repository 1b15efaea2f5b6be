//! Entity re-exports.

pub use super::annual_accruals::Entity as AnnualAccruals;
pub use super::approvals::Entity as Approvals;
pub use super::balance_transactions::Entity as BalanceTransactions;
pub use super::carry_forward_runs::Entity as CarryForwardRuns;
pub use super::comp_off_grants::Entity as CompOffGrants;
pub use super::comp_off_work_logs::Entity as CompOffWorkLogs;
pub use super::employees::Entity as Employees;
pub use super::holidays::Entity as Holidays;
pub use super::leave_balances::Entity as LeaveBalances;
pub use super::leave_requests::Entity as LeaveRequests;
pub use super::ledger_anomalies::Entity as LedgerAnomalies;
pub use super::monthly_accruals::Entity as MonthlyAccruals;
pub use super::request_guards::Entity as RequestGuards;
