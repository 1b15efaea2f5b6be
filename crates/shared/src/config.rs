//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Engine behaviour (retries, auto-approval, date windows).
    #[serde(default)]
    pub engine: EngineConfig,
    /// Leave policy knobs consumed by the core calculators.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// How many times a conflicting write is retried before surfacing.
    #[serde(default = "default_conflict_retry_budget")]
    pub conflict_retry_budget: u32,
    /// Base backoff between conflict retries, multiplied by the attempt number.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    /// Finalize auto-approval eligible requests at submission.
    #[serde(default)]
    pub auto_approve: bool,
    /// Furthest a request may start in the future, in calendar days.
    #[serde(default = "default_max_future_days")]
    pub max_future_days: i64,
    /// Furthest a request may start in the past, in calendar days.
    #[serde(default = "default_max_past_days")]
    pub max_past_days: i64,
}

fn default_conflict_retry_budget() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    20
}

fn default_max_future_days() -> i64 {
    365
}

fn default_max_past_days() -> i64 {
    30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            conflict_retry_budget: default_conflict_retry_budget(),
            retry_backoff_ms: default_retry_backoff_ms(),
            auto_approve: false,
            max_future_days: default_max_future_days(),
            max_past_days: default_max_past_days(),
        }
    }
}

/// Leave policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// India privilege leave carried into the next year, at most.
    #[serde(default = "default_india_privilege_cap")]
    pub india_privilege_carry_forward_cap: Decimal,
    /// USA PTO carry-forward cap below VP.
    #[serde(default = "default_usa_cap_standard")]
    pub usa_carry_forward_cap_standard: Decimal,
    /// USA PTO carry-forward cap for VP and above.
    #[serde(default = "default_usa_cap_senior")]
    pub usa_carry_forward_cap_senior: Decimal,
    /// Month (1-12) of the following year after which USA carry-forward expires.
    #[serde(default = "default_usa_expiry_month")]
    pub usa_carry_forward_expiry_month: u32,
    /// Day of month after which USA carry-forward expires.
    #[serde(default = "default_usa_expiry_day")]
    pub usa_carry_forward_expiry_day: u32,
    /// Months a comp-off grant stays redeemable after approval.
    #[serde(default = "default_comp_off_expiry_months")]
    pub comp_off_expiry_months: u32,
    /// Grants expiring within this many days trigger a reminder.
    #[serde(default = "default_comp_off_warning_days")]
    pub comp_off_expiry_warning_days: i64,
}

fn default_india_privilege_cap() -> Decimal {
    Decimal::from(30)
}

fn default_usa_cap_standard() -> Decimal {
    Decimal::from(5)
}

fn default_usa_cap_senior() -> Decimal {
    Decimal::from(10)
}

fn default_usa_expiry_month() -> u32 {
    3
}

fn default_usa_expiry_day() -> u32 {
    31
}

fn default_comp_off_expiry_months() -> u32 {
    3
}

fn default_comp_off_warning_days() -> i64 {
    14
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            india_privilege_carry_forward_cap: default_india_privilege_cap(),
            usa_carry_forward_cap_standard: default_usa_cap_standard(),
            usa_carry_forward_cap_senior: default_usa_cap_senior(),
            usa_carry_forward_expiry_month: default_usa_expiry_month(),
            usa_carry_forward_expiry_day: default_usa_expiry_day(),
            comp_off_expiry_months: default_comp_off_expiry_months(),
            comp_off_expiry_warning_days: default_comp_off_warning_days(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEAVELEDGER").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
