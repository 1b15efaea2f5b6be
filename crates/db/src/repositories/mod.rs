//! Repositories over the ledger, workflow and job tables.
//!
//! Every operation that touches more than one row opens its own
//! transaction. Helpers that take a generic `ConnectionTrait` are shared
//! between repositories so a caller's transaction flows through them.

pub mod accrual;
pub mod anomaly;
pub mod balance;
pub mod carry_forward;
pub mod comp_off;
mod convert;
pub mod directory;
pub mod leave_request;
pub mod workflow;

pub use accrual::{AccrualRepository, accrual_reference};
pub use anomaly::{AnomalyRecord, AnomalyRepository};
pub use balance::{
    BalanceChange, BalanceKey, BalanceRepository, BalanceWrite, JournalEntry,
    LEDGER_WRITE_ATTEMPTS,
};
pub use carry_forward::{CarryForwardRepository, CarryForwardRun, carry_forward_reference};
pub use comp_off::{
    CompOffRepository, ExpiredGrant, GrantRecord, NewWorkLog, WorkLogDecision, WorkLogRecord,
    WorkLogVerdict, work_log_reference,
};
pub use directory::{DbEmployeeDirectory, DbHolidayCalendar};
pub use leave_request::{
    AUTO_APPROVED_COMMENT, ApprovalRecord, LeaveRequestRecord, LeaveRequestRepository,
    SubmitOutcome, request_reference,
};
pub use workflow::{
    CANCELLED_COMMENT, CancelOutcome, DecideOutcome, LevelDecision, PendingApproval,
    WorkflowRepository,
};
