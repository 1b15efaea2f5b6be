//! Core business logic for leaveledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `employee` - Directory-facing employee model
//! - `leave` - Leave type catalogue and per-type policy
//! - `ledger` - Balance arithmetic and invariant reconciliation
//! - `accrual` - Monthly (India) and annual (USA) accrual calculation
//! - `calendar` - Date ranges and working-day counting
//! - `validation` - Leave request validation
//! - `workflow` - Approval state machine and chain construction
//! - `carry_forward` - Year-end carry-forward and expiry rules
//! - `comp_off` - Compensatory leave eligibility, grants and expiry
//! - `ports` - Collaborator traits injected into the engine

pub mod accrual;
pub mod calendar;
pub mod carry_forward;
pub mod comp_off;
pub mod employee;
pub mod leave;
pub mod ledger;
pub mod ports;
pub mod validation;
pub mod workflow;
