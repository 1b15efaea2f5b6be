//! Leave requests, approval levels and the per-employee submit guard.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        super::run_statements(manager, WORKFLOW_SQL).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        super::run_statements(
            manager,
            "DROP TABLE IF EXISTS request_guards;
             DROP TABLE IF EXISTS approvals;
             DROP TABLE IF EXISTS leave_requests;",
        )
        .await
    }
}

const WORKFLOW_SQL: &str = r"
CREATE TABLE leave_requests (
    id UUID PRIMARY KEY,
    employee_id UUID NOT NULL,
    leave_type VARCHAR(8) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    half_day VARCHAR(16),
    total_days_half_days BIGINT NOT NULL,
    status VARCHAR(16) NOT NULL,
    reason TEXT NOT NULL,
    has_documentation BOOLEAN NOT NULL,
    cancelled_by UUID,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_dates_ordered CHECK (start_date <= end_date)
);

CREATE INDEX idx_leave_requests_employee ON leave_requests(employee_id, status, start_date);

CREATE TABLE approvals (
    id UUID PRIMARY KEY,
    leave_request_id UUID NOT NULL REFERENCES leave_requests(id),
    level INTEGER NOT NULL,
    approver_id UUID NOT NULL,
    role VARCHAR(16) NOT NULL,
    status VARCHAR(16) NOT NULL,
    comments TEXT,
    decided_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_level_range CHECK (level BETWEEN 1 AND 3)
);

CREATE UNIQUE INDEX ux_approvals_request_level ON approvals(leave_request_id, level);

CREATE INDEX idx_approvals_approver ON approvals(approver_id, status);

CREATE TABLE request_guards (
    employee_id UUID PRIMARY KEY,
    counter BIGINT NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL
);
";
