//! `SeaORM` Entity for the leave_balances table.
//!
//! One row per (employee, leave type, year). Every write bumps `version`
//! and is guarded by the version the writer read.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::LeaveTypeCode;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "leave_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveTypeCode,
    pub year: i32,
    pub total_entitlement_half_days: i64,
    pub used_half_days: i64,
    pub available_half_days: i64,
    pub carry_forward_half_days: i64,
    pub version: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::balance_transactions::Entity")]
    BalanceTransactions,
}

impl Related<super::balance_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BalanceTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
