//! Leave engine service for leaveledger.
//!
//! [`LeaveEngine`] ties the pure rules in `leaveledger-core` to the
//! transactional repositories in `leaveledger-db`:
//!
//! - request submission, level decisions and cancellation
//! - direct ledger credit / debit / reverse and balance reads
//! - scheduled jobs: monthly and annual accrual, year-end carry-forward,
//!   carried-PTO expiry, comp-off expiry, reconciliation
//! - comp-off work claims
//!
//! Conflicts on a balance row are retried within the configured budget
//! before surfacing as [`EngineError::Conflict`].

pub mod adapters;
pub mod engine;
pub mod error;
pub mod retry;

pub use adapters::{CachedHolidayCalendar, TracingNotificationSink};
pub use engine::{
    ANOMALY_TARGET, AccrualRunSummary, BatchItemError, CarryForwardExpirySummary,
    CarryForwardSummary, Collaborators, CompOffClaim, CompOffExpirySummary, DecisionResult,
    LeaveEngine, ReconcileSummary, RequestDetail, SubmittedRequest,
};
pub use error::EngineError;
pub use retry::RetryPolicy;
