//! Database layer with `SeaORM` entities, migrations and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the ledger, workflow and job tables
//! - A portable schema migration (Postgres in production, SQLite in tests)
//! - Repositories that run every multi-row change in one transaction
//! - Database-backed implementations of the directory and calendar ports

pub mod entities;
pub mod error;
pub mod migration;
pub mod repositories;

pub use error::StoreError;
pub use repositories::{
    AccrualRepository, AnomalyRepository, BalanceRepository, CarryForwardRepository,
    CompOffRepository, DbEmployeeDirectory, DbHolidayCalendar, LeaveRequestRepository,
    WorkflowRepository,
};

use std::time::Duration;

use leaveledger_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool from configuration.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Connects to a private in-memory SQLite database with the schema applied.
///
/// The pool is pinned to one connection so every query sees the same
/// database.
///
/// # Errors
///
/// Returns an error if the connection or the migration fails.
pub async fn connect_in_memory() -> Result<DatabaseConnection, DbErr> {
    use sea_orm_migration::MigratorTrait;

    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
