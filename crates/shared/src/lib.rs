//! Shared types, errors, and configuration for leaveledger.
//!
//! This crate provides common types used across all other crates:
//! - Half-day quantity helpers for ledger amounts
//! - Typed IDs for type-safe entity references
//! - Pagination types for list queries
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, EngineConfig, PolicyConfig};
pub use error::{AppError, AppResult, ErrorBody};
