//! `SeaORM` Entity for the ledger_anomalies table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LeaveTypeCode;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_anomalies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveTypeCode,
    pub year: i32,
    pub kind: String,
    pub detail: String,
    pub recorded_total_half_days: i64,
    pub recorded_used_half_days: i64,
    pub recorded_available_half_days: i64,
    pub repaired_available_half_days: i64,
    pub source: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
