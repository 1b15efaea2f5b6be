//! Leave request validation.
//!
//! Checks a proposed request against dates, working days, balance,
//! eligibility, overlap and policy rules, and derives the approval chain.
//! Issues are accumulated as data so callers can show all of them at once.

pub mod types;
pub mod validator;

#[cfg(test)]
mod validator_props;

pub use types::{
    ExistingRequest, IssueCategory, IssueKind, LeaveRequestInput, ValidationContext,
    ValidationIssue, ValidationVerdict,
};
pub use validator::RequestValidator;
