//! Directory tables: employees and holidays.
//!
//! Both are provisioned outside the engine and read through the directory
//! and calendar ports.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        super::run_statements(manager, DIRECTORY_SQL).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        super::run_statements(
            manager,
            "DROP TABLE IF EXISTS holidays;
             DROP TABLE IF EXISTS employees;",
        )
        .await
    }
}

const DIRECTORY_SQL: &str = r"
CREATE TABLE employees (
    id UUID PRIMARY KEY,
    name VARCHAR(200) NOT NULL,
    country VARCHAR(8) NOT NULL,
    location VARCHAR(100) NOT NULL,
    designation VARCHAR(32) NOT NULL,
    joining_date DATE NOT NULL,
    gender VARCHAR(16) NOT NULL,
    marital_status VARCHAR(16) NOT NULL,
    status VARCHAR(16) NOT NULL,
    role VARCHAR(16) NOT NULL,
    manager_id UUID
);

CREATE INDEX idx_employees_role ON employees(role, status);

CREATE TABLE holidays (
    id UUID PRIMARY KEY,
    date DATE NOT NULL,
    region VARCHAR(100) NOT NULL,
    location VARCHAR(100) NOT NULL,
    name VARCHAR(200) NOT NULL
);

CREATE UNIQUE INDEX ux_holidays_location_date ON holidays(location, date);
";
