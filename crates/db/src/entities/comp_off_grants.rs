//! `SeaORM` Entity for the comp_off_grants table.
//!
//! A grant is a lot of redeemable CO days with its own expiry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::GrantStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "comp_off_grants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub work_log_id: Uuid,
    pub employee_id: Uuid,
    pub granted_half_days: i64,
    pub remaining_half_days: i64,
    pub approved_on: Date,
    pub expires_on: Date,
    pub status: GrantStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::comp_off_work_logs::Entity",
        from = "Column::WorkLogId",
        to = "super::comp_off_work_logs::Column::Id"
    )]
    CompOffWorkLogs,
}

impl Related<super::comp_off_work_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompOffWorkLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
