//! Ledger anomaly log polled by operators.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Serialize;

use leaveledger_core::ledger::{AnomalyKind, BalanceAnomaly};
use leaveledger_core::leave::LeaveType;
use leaveledger_shared::types::{AnomalyId, EmployeeId, PageRequest, PageResponse};

use crate::entities::ledger_anomalies;
use crate::entities::sea_orm_active_enums::LeaveTypeCode;
use crate::error::StoreError;

use super::balance::BalanceKey;
use super::convert::{self, units};

/// A persisted reconciliation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnomalyRecord {
    /// Id.
    pub id: AnomalyId,
    /// Ledger owner.
    pub employee_id: EmployeeId,
    /// Ledger type.
    pub leave_type: LeaveType,
    /// Ledger year.
    pub year: i32,
    /// Violation kind.
    pub kind: AnomalyKind,
    /// Human-readable description.
    pub detail: String,
    /// Stored `available` before repair.
    pub recorded_available: Decimal,
    /// `available` after repair.
    pub repaired_available: Decimal,
    /// Operation that found it.
    pub source: String,
    /// When.
    pub recorded_at: DateTime<Utc>,
}

impl AnomalyRecord {
    fn from_model(model: ledger_anomalies::Model) -> Result<Self, StoreError> {
        let kind = AnomalyKind::parse(&model.kind).ok_or_else(|| {
            StoreError::Corrupt(format!("anomaly {}: bad kind '{}'", model.id, model.kind))
        })?;
        Ok(Self {
            id: AnomalyId::from_uuid(model.id),
            employee_id: EmployeeId::from_uuid(model.employee_id),
            leave_type: model.leave_type.into(),
            year: model.year,
            kind,
            detail: model.detail,
            recorded_available: convert::days(model.recorded_available_half_days),
            repaired_available: convert::days(model.repaired_available_half_days),
            source: model.source,
            recorded_at: model.created_at,
        })
    }
}

/// Anomaly repository.
#[derive(Debug, Clone)]
pub struct AnomalyRepository {
    db: DatabaseConnection,
}

impl AnomalyRepository {
    /// Creates a new anomaly repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Persists one finding.
    pub async fn record(
        &self,
        key: BalanceKey,
        anomaly: &BalanceAnomaly,
        source: &str,
        now: DateTime<Utc>,
    ) -> Result<AnomalyId, StoreError> {
        let id = AnomalyId::new();
        let row = ledger_anomalies::ActiveModel {
            id: Set(id.into_inner()),
            employee_id: Set(key.employee_id.into_inner()),
            leave_type: Set(key.leave_type.into()),
            year: Set(key.year),
            kind: Set(anomaly.kind.as_str().to_string()),
            detail: Set(anomaly.describe()),
            recorded_total_half_days: Set(units(anomaly.recorded_total)?),
            recorded_used_half_days: Set(units(anomaly.recorded_used)?),
            recorded_available_half_days: Set(units(anomaly.recorded_available)?),
            repaired_available_half_days: Set(units(anomaly.repaired_available)?),
            source: Set(source.to_string()),
            created_at: Set(now),
        };
        ledger_anomalies::Entity::insert(row)
            .exec_without_returning(&self.db)
            .await?;
        Ok(id)
    }

    /// Findings, newest first.
    pub async fn list(&self, page: &PageRequest) -> Result<PageResponse<AnomalyRecord>, StoreError> {
        let window = page.window();
        let total = ledger_anomalies::Entity::find().count(&self.db).await?;
        let rows = ledger_anomalies::Entity::find()
            .order_by_desc(ledger_anomalies::Column::CreatedAt)
            .order_by_desc(ledger_anomalies::Column::Id)
            .offset(window.offset())
            .limit(window.limit())
            .all(&self.db)
            .await?;
        let data = rows
            .into_iter()
            .map(AnomalyRecord::from_model)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PageResponse::new(data, window, total))
    }

    /// Findings for one ledger record, oldest first.
    pub async fn for_balance(&self, key: BalanceKey) -> Result<Vec<AnomalyRecord>, StoreError> {
        ledger_anomalies::Entity::find()
            .filter(ledger_anomalies::Column::EmployeeId.eq(key.employee_id.into_inner()))
            .filter(ledger_anomalies::Column::LeaveType.eq(LeaveTypeCode::from(key.leave_type)))
            .filter(ledger_anomalies::Column::Year.eq(key.year))
            .order_by_asc(ledger_anomalies::Column::CreatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(AnomalyRecord::from_model)
            .collect()
    }
}
