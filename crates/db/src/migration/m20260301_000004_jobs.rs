//! Scheduled-job bookkeeping: accrual markers, carry-forward runs and
//! comp-off work logs and grants.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        super::run_statements(manager, JOBS_SQL).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        super::run_statements(
            manager,
            "DROP TABLE IF EXISTS comp_off_grants;
             DROP TABLE IF EXISTS comp_off_work_logs;
             DROP TABLE IF EXISTS carry_forward_runs;
             DROP TABLE IF EXISTS annual_accruals;
             DROP TABLE IF EXISTS monthly_accruals;",
        )
        .await
    }
}

const JOBS_SQL: &str = r"
CREATE TABLE monthly_accruals (
    id UUID PRIMARY KEY,
    employee_id UUID NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    status VARCHAR(24) NOT NULL,
    pro_rated BOOLEAN NOT NULL,
    casual_half_days BIGINT NOT NULL,
    privilege_half_days BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_month_range CHECK (month BETWEEN 1 AND 12)
);

-- At most one accrual per employee and month
CREATE UNIQUE INDEX ux_monthly_accruals_period ON monthly_accruals(employee_id, year, month);

CREATE TABLE annual_accruals (
    id UUID PRIMARY KEY,
    employee_id UUID NOT NULL,
    year INTEGER NOT NULL,
    status VARCHAR(24) NOT NULL,
    pro_rated BOOLEAN NOT NULL,
    amount_half_days BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);

CREATE UNIQUE INDEX ux_annual_accruals_period ON annual_accruals(employee_id, year);

CREATE TABLE carry_forward_runs (
    id UUID PRIMARY KEY,
    employee_id UUID NOT NULL,
    leave_type VARCHAR(8) NOT NULL,
    from_year INTEGER NOT NULL,
    to_year INTEGER NOT NULL,
    status VARCHAR(16) NOT NULL,
    closing_half_days BIGINT NOT NULL,
    carried_half_days BIGINT NOT NULL,
    lapsed_half_days BIGINT NOT NULL,
    expired_half_days BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);

CREATE UNIQUE INDEX ux_carry_forward_runs_key ON carry_forward_runs(employee_id, leave_type, from_year, to_year);

CREATE INDEX idx_carry_forward_runs_status ON carry_forward_runs(to_year, status);

CREATE TABLE comp_off_work_logs (
    id UUID PRIMARY KEY,
    employee_id UUID NOT NULL,
    work_date DATE NOT NULL,
    days_half_days BIGINT NOT NULL,
    reason TEXT NOT NULL,
    approver_id UUID NOT NULL,
    status VARCHAR(16) NOT NULL,
    comments TEXT,
    decided_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_work_log_days CHECK (days_half_days IN (1, 2))
);

CREATE UNIQUE INDEX ux_comp_off_work_logs_day ON comp_off_work_logs(employee_id, work_date);

CREATE TABLE comp_off_grants (
    id UUID PRIMARY KEY,
    work_log_id UUID NOT NULL REFERENCES comp_off_work_logs(id),
    employee_id UUID NOT NULL,
    granted_half_days BIGINT NOT NULL,
    remaining_half_days BIGINT NOT NULL,
    approved_on DATE NOT NULL,
    expires_on DATE NOT NULL,
    status VARCHAR(16) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_grant_remaining CHECK (remaining_half_days BETWEEN 0 AND granted_half_days)
);

CREATE UNIQUE INDEX ux_comp_off_grants_work_log ON comp_off_grants(work_log_id);

CREATE INDEX idx_comp_off_grants_expiry ON comp_off_grants(employee_id, expires_on);
";
