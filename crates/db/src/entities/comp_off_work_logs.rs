//! `SeaORM` Entity for the comp_off_work_logs table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ApprovalStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "comp_off_work_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub employee_id: Uuid,
    pub work_date: Date,
    pub days_half_days: i64,
    pub reason: String,
    pub approver_id: Uuid,
    pub status: ApprovalStatus,
    pub comments: Option<String>,
    pub decided_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comp_off_grants::Entity")]
    CompOffGrants,
}

impl Related<super::comp_off_grants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CompOffGrants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
