//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration. The SQL sticks to the
//! subset Postgres and SQLite share, so the same schema backs production
//! and the in-memory test databases.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_directory;
mod m20260301_000002_ledger;
mod m20260301_000003_workflow;
mod m20260301_000004_jobs;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_directory::Migration),
            Box::new(m20260301_000002_ledger::Migration),
            Box::new(m20260301_000003_workflow::Migration),
            Box::new(m20260301_000004_jobs::Migration),
        ]
    }
}

/// Runs each `;`-terminated statement of `sql` in order.
async fn run_statements(manager: &SchemaManager<'_>, sql: &str) -> Result<(), DbErr> {
    let db = manager.get_connection();
    for statement in split_statements(sql) {
        db.execute_unprepared(&statement).await?;
    }
    Ok(())
}

/// Splits a migration script into statements.
///
/// `--` comment lines are dropped first so punctuation inside them never
/// ends a statement.
fn split_statements(sql: &str) -> Vec<String> {
    let mut code = String::with_capacity(sql.len());
    for line in sql.lines().filter(|l| !l.trim_start().starts_with("--")) {
        code.push_str(line);
        code.push('\n');
    }
    code.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
