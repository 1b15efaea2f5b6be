//! Compensatory off rules.
//!
//! Work on a weekend day or holiday earns a comp-off grant once approved.
//! Grants are lots with their own expiry; approved CO leave consumes them
//! earliest-expiry first.

pub mod rules;

pub use rules::{CompOffRules, GrantLot, GrantStatus, LotAllocation, RedemptionPlan};
