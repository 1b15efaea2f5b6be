//! Collaborators the engine consumes.
//!
//! Each is a trait so deployments plug in their directory, calendar and
//! notification transport, and tests plug in in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use leaveledger_shared::types::{CompOffGrantId, EmployeeId, LeaveRequestId};

use crate::employee::{Employee, Role};
use crate::leave::LeaveType;
use crate::workflow::RequestStatus;

/// Failure reported by a collaborator.
#[derive(Debug, Error)]
#[error("{collaborator} unavailable: {message}")]
pub struct CollaboratorError {
    /// Which collaborator failed.
    pub collaborator: &'static str,
    /// What went wrong.
    pub message: String,
}

impl CollaboratorError {
    /// Creates an error for `collaborator`.
    pub fn new(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self {
            collaborator,
            message: message.into(),
        }
    }
}

/// Read-only employee directory.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up one employee.
    async fn find(&self, id: EmployeeId) -> Result<Option<Employee>, CollaboratorError>;

    /// First active employee holding `role`, skipping `exclude`.
    async fn first_with_role(
        &self,
        role: Role,
        exclude: EmployeeId,
    ) -> Result<Option<Employee>, CollaboratorError>;

    /// Every active employee.
    async fn list_active(&self) -> Result<Vec<Employee>, CollaboratorError>;
}

/// A declared holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// Date.
    pub date: NaiveDate,
    /// Region (country or state).
    pub region: String,
    /// Office location the holiday applies to.
    pub location: String,
    /// Name.
    pub name: String,
}

/// Read-only holiday calendar.
#[async_trait]
pub trait HolidayCalendar: Send + Sync {
    /// Holidays for `location` in `year`.
    async fn holidays(&self, location: &str, year: i32) -> Result<Vec<Holiday>, CollaboratorError>;
}

/// Messages the engine emits after a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    /// A level is waiting for an approver.
    ApprovalNeeded {
        /// Request.
        request_id: LeaveRequestId,
        /// Approver to notify.
        approver_id: EmployeeId,
        /// Level.
        level: i32,
    },
    /// A request reached a final status.
    RequestDecided {
        /// Request.
        request_id: LeaveRequestId,
        /// Requester.
        employee_id: EmployeeId,
        /// Final status.
        status: RequestStatus,
    },
    /// Balance is about to lapse.
    BalanceExpiring {
        /// Owner.
        employee_id: EmployeeId,
        /// Ledger.
        leave_type: LeaveType,
        /// Days at risk.
        amount: Decimal,
        /// Last usable day.
        expires_on: NaiveDate,
        /// Grant, for comp-off.
        grant_id: Option<CompOffGrantId>,
    },
}

/// Fire-and-forget notification transport.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers one notification.
    async fn notify(&self, notification: Notification) -> Result<(), CollaboratorError>;
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Now, in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock tests can set and advance.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    /// A clock stopped at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map_or_else(|poisoned| *poisoned.into_inner(), |guard| *guard)
    }
}
