//! `SeaORM` Entity for the carry_forward_runs table.
//!
//! One row per (employee, leave type, from year); doubles as the year-end
//! idempotency marker and the USA expiry bookkeeping.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CarryForwardStatus, LeaveTypeCode};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "carry_forward_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveTypeCode,
    pub from_year: i32,
    pub to_year: i32,
    pub status: CarryForwardStatus,
    pub closing_half_days: i64,
    pub carried_half_days: i64,
    pub lapsed_half_days: i64,
    pub expired_half_days: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
