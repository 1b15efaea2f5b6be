//! Schema migration runner for the leave ledger database.
//!
//! Usage:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Roll back the last migration
//!   migrator status  - List applied and pending migrations
//!   migrator fresh   - Drop every table and re-apply all migrations
//!
//! The target database comes from `DATABASE_URL`.

use leaveledger_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // the migration CLI installs its own subscriber
    cli::run_cli(Migrator).await;
}
