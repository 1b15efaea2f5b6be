//! Collaborator adapters shipped with the engine.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use tracing::info;

use leaveledger_core::ports::{
    CollaboratorError, Holiday, HolidayCalendar, Notification, NotificationSink, SystemClock,
};
use leaveledger_db::{DbEmployeeDirectory, DbHolidayCalendar};

use crate::engine::Collaborators;

/// Default number of (location, year) calendars kept.
const DEFAULT_CALENDAR_CAPACITY: u64 = 256;

/// Default time-to-live for a cached calendar (1 hour).
const DEFAULT_CALENDAR_TTL_SECS: u64 = 3600;

/// Caches another calendar per (location, year).
///
/// Holiday calendars change a few times a year at most, while every
/// submission and comp-off claim reads them. Failed lookups are not
/// cached.
#[derive(Clone)]
pub struct CachedHolidayCalendar {
    inner: Arc<dyn HolidayCalendar>,
    cache: Cache<(String, i32), Arc<Vec<Holiday>>>,
}

impl CachedHolidayCalendar {
    /// Wraps `inner` with the default capacity and TTL.
    #[must_use]
    pub fn new(inner: Arc<dyn HolidayCalendar>) -> Self {
        Self::with_config(inner, DEFAULT_CALENDAR_CAPACITY, DEFAULT_CALENDAR_TTL_SECS)
    }

    /// Wraps `inner` with a custom capacity and TTL.
    #[must_use]
    pub fn with_config(inner: Arc<dyn HolidayCalendar>, max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { inner, cache }
    }

    /// Drops every cached calendar.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

#[async_trait]
impl HolidayCalendar for CachedHolidayCalendar {
    async fn holidays(&self, location: &str, year: i32) -> Result<Vec<Holiday>, CollaboratorError> {
        let inner = Arc::clone(&self.inner);
        let owned = location.to_string();
        let cached = self
            .cache
            .try_get_with((owned.clone(), year), async move {
                inner.holidays(&owned, year).await.map(Arc::new)
            })
            .await
            .map_err(|e| CollaboratorError::new(e.collaborator, e.message.clone()))?;
        Ok((*cached).clone())
    }
}

impl Collaborators {
    /// Directory and cached calendar over the provisioned tables, a
    /// logging notification sink and the wall clock.
    #[must_use]
    pub fn database_backed(db: &DatabaseConnection) -> Self {
        Self {
            directory: Arc::new(DbEmployeeDirectory::new(db.clone())),
            calendar: Arc::new(CachedHolidayCalendar::new(Arc::new(DbHolidayCalendar::new(
                db.clone(),
            )))),
            notifier: Arc::new(TracingNotificationSink),
            clock: Arc::new(SystemClock),
        }
    }
}

/// Sink that only logs notifications, for deployments without a transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn notify(&self, notification: Notification) -> Result<(), CollaboratorError> {
        match &notification {
            Notification::ApprovalNeeded {
                request_id,
                approver_id,
                level,
            } => info!(%request_id, %approver_id, level = *level, "Approval needed"),
            Notification::RequestDecided {
                request_id,
                employee_id,
                status,
            } => info!(%request_id, %employee_id, %status, "Request decided"),
            Notification::BalanceExpiring {
                employee_id,
                leave_type,
                amount,
                expires_on,
                ..
            } => info!(%employee_id, %leave_type, %amount, %expires_on, "Balance expiring"),
        }
        Ok(())
    }
}
