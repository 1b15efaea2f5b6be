//! In-memory collaborators and an engine over a fresh SQLite database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;

use leaveledger_core::employee::{
    Country, Designation, Employee, EmployeeStatus, Gender, MaritalStatus, Role,
};
use leaveledger_core::leave::LeaveType;
use leaveledger_core::ports::{
    Clock, CollaboratorError, EmployeeDirectory, FixedClock, Holiday, HolidayCalendar,
    Notification, NotificationSink,
};
use leaveledger_core::validation::LeaveRequestInput;
use leaveledger_engine::{Collaborators, LeaveEngine};
use leaveledger_shared::types::EmployeeId;
use leaveledger_shared::{EngineConfig, PolicyConfig};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
}

#[derive(Default)]
pub struct FakeDirectory {
    employees: Mutex<HashMap<EmployeeId, Employee>>,
}

impl FakeDirectory {
    pub fn put(&self, employee: Employee) {
        self.employees
            .lock()
            .unwrap()
            .insert(employee.id, employee);
    }

    pub fn deactivate(&self, id: EmployeeId) {
        if let Some(e) = self.employees.lock().unwrap().get_mut(&id) {
            e.status = EmployeeStatus::Inactive;
        }
    }
}

#[async_trait]
impl EmployeeDirectory for FakeDirectory {
    async fn find(&self, id: EmployeeId) -> Result<Option<Employee>, CollaboratorError> {
        Ok(self.employees.lock().unwrap().get(&id).cloned())
    }

    async fn first_with_role(
        &self,
        role: Role,
        exclude: EmployeeId,
    ) -> Result<Option<Employee>, CollaboratorError> {
        let mut found: Vec<Employee> = self
            .employees
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.role == role && e.is_active() && e.id != exclude)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found.into_iter().next())
    }

    async fn list_active(&self) -> Result<Vec<Employee>, CollaboratorError> {
        let mut active: Vec<Employee> = self
            .employees
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }
}

#[derive(Default)]
pub struct FakeCalendar {
    holidays: Mutex<Vec<Holiday>>,
    lookups: Mutex<usize>,
}

impl FakeCalendar {
    pub fn add(&self, location: &str, day: NaiveDate, name: &str) {
        self.holidays.lock().unwrap().push(Holiday {
            date: day,
            region: "IN".to_string(),
            location: location.to_string(),
            name: name.to_string(),
        });
    }

    /// Number of (location, year) lookups served so far.
    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl HolidayCalendar for FakeCalendar {
    async fn holidays(&self, location: &str, year: i32) -> Result<Vec<Holiday>, CollaboratorError> {
        *self.lookups.lock().unwrap() += 1;
        Ok(self
            .holidays
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.location == location && chrono::Datelike::year(&h.date) == year)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Notification>>,
    failing: Mutex<bool>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(&self, notification: Notification) -> Result<(), CollaboratorError> {
        if *self.failing.lock().unwrap() {
            return Err(CollaboratorError::new("notification sink", "smtp down"));
        }
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

pub struct Harness {
    pub engine: LeaveEngine,
    pub db: DatabaseConnection,
    pub directory: Arc<FakeDirectory>,
    pub calendar: Arc<FakeCalendar>,
    pub sink: Arc<RecordingSink>,
    pub clock: FixedClock,
}

impl Harness {
    pub async fn new(now: DateTime<Utc>) -> Self {
        Self::with_config(now, EngineConfig::default()).await
    }

    pub async fn with_config(now: DateTime<Utc>, config: EngineConfig) -> Self {
        let db = leaveledger_db::connect_in_memory()
            .await
            .expect("in-memory database");
        let directory = Arc::new(FakeDirectory::default());
        let calendar = Arc::new(FakeCalendar::default());
        let sink = Arc::new(RecordingSink::default());
        let clock = FixedClock::new(now);
        let collaborators = Collaborators {
            directory: directory.clone(),
            calendar: calendar.clone(),
            notifier: sink.clone(),
            clock: Arc::new(clock.clone()) as Arc<dyn Clock>,
        };
        let engine = LeaveEngine::new(db.clone(), collaborators, config, PolicyConfig::default());
        Self {
            engine,
            db,
            directory,
            calendar,
            sink,
            clock,
        }
    }

    /// Adds an active India employee in Bengaluru who joined in 2020.
    pub fn hire(&self, name: &str, role: Role, manager: Option<EmployeeId>) -> EmployeeId {
        self.hire_with(name, role, manager, |_| {})
    }

    pub fn hire_with(
        &self,
        name: &str,
        role: Role,
        manager: Option<EmployeeId>,
        adjust: impl FnOnce(&mut Employee),
    ) -> EmployeeId {
        let mut employee = Employee {
            id: EmployeeId::new(),
            name: name.to_string(),
            country: Country::India,
            location: "Bengaluru".to_string(),
            designation: Designation::Associate,
            joining_date: date(2020, 1, 1),
            gender: Gender::Female,
            marital_status: MaritalStatus::Single,
            status: EmployeeStatus::Active,
            role,
            manager_id: manager,
        };
        adjust(&mut employee);
        let id = employee.id;
        self.directory.put(employee);
        id
    }

    /// A manager, an HR admin and one employee reporting to the manager.
    pub fn team(&self) -> Team {
        let manager = self.hire("Meera Manager", Role::Manager, None);
        let hr = self.hire("Hari HR", Role::HrAdmin, None);
        let employee = self.hire("Esha Employee", Role::Employee, Some(manager));
        Team {
            manager,
            hr,
            employee,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Team {
    pub manager: EmployeeId,
    pub hr: EmployeeId,
    pub employee: EmployeeId,
}

pub fn request(
    employee_id: EmployeeId,
    leave_type: LeaveType,
    start: NaiveDate,
    end: NaiveDate,
) -> LeaveRequestInput {
    LeaveRequestInput {
        employee_id,
        leave_type,
        start_date: start,
        end_date: end,
        half_day: None,
        reason: "personal".to_string(),
        has_documentation: false,
    }
}
