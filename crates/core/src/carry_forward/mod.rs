//! Year-end carry-forward and carry-forward expiry policy.
//!
//! Decides, per leave type, how much of a closing balance moves into the
//! next year, and when carried USA PTO lapses.

pub mod policy;

pub use policy::{CarryForwardPlan, CarryForwardPolicy, CarryForwardRule, CarryForwardStatus};
