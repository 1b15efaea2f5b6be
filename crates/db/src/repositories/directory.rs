//! Directory and calendar ports backed by the provisioned HR tables.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use leaveledger_core::employee::{Employee, Role};
use leaveledger_core::ports::{CollaboratorError, EmployeeDirectory, Holiday, HolidayCalendar};
use leaveledger_shared::types::EmployeeId;

use crate::entities::{employees, holidays};
use crate::error::StoreError;

use super::convert;

fn directory_error(err: impl std::fmt::Display) -> CollaboratorError {
    CollaboratorError::new("employee directory", err.to_string())
}

fn calendar_error(err: &DbErr) -> CollaboratorError {
    CollaboratorError::new("holiday calendar", err.to_string())
}

/// Employee directory over the `employees` table.
#[derive(Debug, Clone)]
pub struct DbEmployeeDirectory {
    db: DatabaseConnection,
}

impl DbEmployeeDirectory {
    /// Creates a directory reading from `db`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn active(&self, filter: Option<Role>) -> Result<Vec<Employee>, StoreError> {
        let mut query = employees::Entity::find();
        if let Some(role) = filter {
            query = query.filter(employees::Column::Role.eq(role.as_str()));
        }
        let rows = query
            .order_by_asc(employees::Column::Name)
            .order_by_asc(employees::Column::Id)
            .all(&self.db)
            .await?;

        let mut found = Vec::with_capacity(rows.len());
        for row in rows {
            let employee = convert::employee(row)?;
            if employee.is_active() {
                found.push(employee);
            }
        }
        Ok(found)
    }
}

#[async_trait]
impl EmployeeDirectory for DbEmployeeDirectory {
    async fn find(&self, id: EmployeeId) -> Result<Option<Employee>, CollaboratorError> {
        employees::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(directory_error)?
            .map(convert::employee)
            .transpose()
            .map_err(directory_error)
    }

    async fn first_with_role(
        &self,
        role: Role,
        exclude: EmployeeId,
    ) -> Result<Option<Employee>, CollaboratorError> {
        let candidates = self.active(Some(role)).await.map_err(directory_error)?;
        Ok(candidates.into_iter().find(|e| e.id != exclude))
    }

    async fn list_active(&self) -> Result<Vec<Employee>, CollaboratorError> {
        self.active(None).await.map_err(directory_error)
    }
}

/// Holiday calendar over the `holidays` table.
#[derive(Debug, Clone)]
pub struct DbHolidayCalendar {
    db: DatabaseConnection,
}

impl DbHolidayCalendar {
    /// Creates a calendar reading from `db`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl HolidayCalendar for DbHolidayCalendar {
    async fn holidays(&self, location: &str, year: i32) -> Result<Vec<Holiday>, CollaboratorError> {
        let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return Ok(Vec::new());
        };
        let rows = holidays::Entity::find()
            .filter(holidays::Column::Location.eq(location))
            .filter(holidays::Column::Date.between(first, last))
            .order_by_asc(holidays::Column::Date)
            .all(&self.db)
            .await
            .map_err(|e| calendar_error(&e))?;

        Ok(rows
            .into_iter()
            .map(|row| Holiday {
                date: row.date,
                region: row.region,
                location: row.location,
                name: row.name,
            })
            .collect())
    }
}
