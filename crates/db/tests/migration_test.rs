//! The schema migrations applied, rolled back and applied again.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::{MigratorTrait, SchemaManager};

use leaveledger_db::migration::Migrator;

const TABLES: [&str; 13] = [
    "employees",
    "holidays",
    "leave_balances",
    "balance_transactions",
    "ledger_anomalies",
    "leave_requests",
    "approvals",
    "request_guards",
    "monthly_accruals",
    "annual_accruals",
    "carry_forward_runs",
    "comp_off_work_logs",
    "comp_off_grants",
];

async fn blank_sqlite() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    Database::connect(options).await.expect("sqlite connection")
}

async fn existing_tables(db: &DatabaseConnection) -> Vec<&'static str> {
    let manager = SchemaManager::new(db);
    let mut found = Vec::new();
    for table in TABLES {
        if manager.has_table(table).await.unwrap() {
            found.push(table);
        }
    }
    found
}

#[tokio::test]
async fn test_up_down_up() {
    let db = blank_sqlite().await;

    Migrator::up(&db, None).await.expect("first up");
    assert_eq!(existing_tables(&db).await, TABLES.to_vec());
    assert!(Migrator::get_pending_migrations(&db).await.unwrap().is_empty());

    Migrator::down(&db, None).await.expect("down");
    assert!(existing_tables(&db).await.is_empty());
    assert_eq!(
        Migrator::get_pending_migrations(&db).await.unwrap().len(),
        Migrator::migrations().len()
    );

    Migrator::up(&db, None).await.expect("second up");
    assert_eq!(existing_tables(&db).await, TABLES.to_vec());
}

#[tokio::test]
async fn test_up_is_idempotent() {
    let db = blank_sqlite().await;
    Migrator::up(&db, None).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    assert_eq!(
        Migrator::get_applied_migrations(&db).await.unwrap().len(),
        Migrator::migrations().len()
    );
}
