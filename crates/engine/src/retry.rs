//! Bounded retry for optimistic-lock conflicts.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use leaveledger_db::StoreError;
use leaveledger_shared::EngineConfig;

/// How many times, and how patiently, a conflicting write is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub budget: u32,
    /// Backoff unit; attempt `n` waits `n * backoff`.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Policy from the engine configuration.
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self {
            budget: config.conflict_retry_budget,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Runs `attempt` until it returns something other than a conflict or
    /// the budget is spent. Only [`StoreError::is_conflict`] failures are
    /// retried; every other result is returned as is.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut attempt: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Err(err) if err.is_conflict() && retries < self.budget => {
                    retries += 1;
                    debug!(operation, retries, error = %err, "Retrying after conflict");
                    tokio::time::sleep(self.backoff * retries).await;
                }
                result => return result,
            }
        }
    }
}
