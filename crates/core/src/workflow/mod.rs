//! Leave request workflow.
//!
//! This module implements the request state machine, the per-level
//! approval decision rules, and approval chain construction.
//!
//! # Modules
//!
//! - `types` - Workflow domain types (RequestStatus, ApprovalStatus, Verdict)
//! - `error` - Workflow-specific error types
//! - `service` - State transition logic
//! - `chain` - Approval chain builder

pub mod chain;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod chain_props;
#[cfg(test)]
mod service_props;

pub use chain::{ApprovalChainBuilder, ApproverPool, ApproverRole, ChainLevel, ChainThresholds};
pub use error::WorkflowError;
pub use service::{CancelActor, CancelEffect, WorkflowService};
pub use types::{ApprovalState, ApprovalStatus, Decision, RequestStatus, Verdict};
