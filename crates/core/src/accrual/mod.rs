//! Accrual calculation.
//!
//! Pure computation of what an employee earns for a period. The
//! calculator never writes; storage records the result together with an
//! idempotency marker for the period.

pub mod calculator;
pub mod error;
pub mod types;

#[cfg(test)]
mod calculator_props;

pub use calculator::AccrualCalculator;
pub use error::AccrualError;
pub use types::{AccrualInstruction, AccrualOutcome, AccrualPeriod, AccrualStatus, Ineligibility};
