//! Balance ledger: balances, the movement journal and anomaly log.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        super::run_statements(manager, LEDGER_SQL).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        super::run_statements(
            manager,
            "DROP TABLE IF EXISTS ledger_anomalies;
             DROP TABLE IF EXISTS balance_transactions;
             DROP TABLE IF EXISTS leave_balances;",
        )
        .await
    }
}

const LEDGER_SQL: &str = r"
-- Quantities are half-day units
CREATE TABLE leave_balances (
    id UUID PRIMARY KEY,
    employee_id UUID NOT NULL,
    leave_type VARCHAR(8) NOT NULL,
    year INTEGER NOT NULL,
    total_entitlement_half_days BIGINT NOT NULL DEFAULT 0,
    used_half_days BIGINT NOT NULL DEFAULT 0,
    available_half_days BIGINT NOT NULL DEFAULT 0,
    carry_forward_half_days BIGINT NOT NULL DEFAULT 0,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

-- Natural key, lazy creation relies on it
CREATE UNIQUE INDEX ux_leave_balances_key ON leave_balances(employee_id, leave_type, year);

CREATE INDEX idx_leave_balances_year ON leave_balances(year);

CREATE TABLE balance_transactions (
    id UUID PRIMARY KEY,
    balance_id UUID NOT NULL REFERENCES leave_balances(id),
    employee_id UUID NOT NULL,
    leave_type VARCHAR(8) NOT NULL,
    year INTEGER NOT NULL,
    kind VARCHAR(16) NOT NULL,
    amount_half_days BIGINT NOT NULL,
    available_after_half_days BIGINT NOT NULL,
    reference VARCHAR(200) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_amount_non_negative CHECK (amount_half_days >= 0)
);

CREATE INDEX idx_balance_transactions_balance ON balance_transactions(balance_id, created_at);

CREATE INDEX idx_balance_transactions_reference ON balance_transactions(reference);

CREATE TABLE ledger_anomalies (
    id UUID PRIMARY KEY,
    employee_id UUID NOT NULL,
    leave_type VARCHAR(8) NOT NULL,
    year INTEGER NOT NULL,
    kind VARCHAR(32) NOT NULL,
    detail TEXT NOT NULL,
    recorded_total_half_days BIGINT NOT NULL,
    recorded_used_half_days BIGINT NOT NULL,
    recorded_available_half_days BIGINT NOT NULL,
    repaired_available_half_days BIGINT NOT NULL,
    source VARCHAR(16) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX idx_ledger_anomalies_created ON ledger_anomalies(created_at);
";
