//! Batch job runner for the leave ledger.
//!
//! Usage:
//!   scheduler accrual <year> <month>           - India monthly CL/PL accrual
//!   scheduler annual-pto <year>                - USA annual PTO accrual
//!   scheduler carry-forward <from> <to>        - Year-end carry-forward
//!   scheduler expire-carry-forward <year>      - Expire carried PTO after Q1
//!   scheduler expire-comp-off [YYYY-MM-DD]     - Expire lapsed comp-off grants
//!   scheduler reconcile <year>                 - Repair drifted balances
//!
//! Every job is idempotent, so a cron entry can simply rerun it. The job
//! summary, or the error body on failure, is printed as JSON on stdout.

use std::str::FromStr;

use anyhow::{Context, anyhow, bail};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leaveledger_core::employee::Country;
use leaveledger_db::connect;
use leaveledger_engine::{Collaborators, EngineError, LeaveEngine};
use leaveledger_shared::{AppConfig, AppError};

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Job {
    Accrual { year: i32, month: u32 },
    AnnualPto { year: i32 },
    CarryForward { from: i32, to: i32 },
    ExpireCarryForward { year: i32 },
    ExpireCompOff { as_of: Option<NaiveDate> },
    Reconcile { year: i32 },
}

impl Job {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let (name, rest) = args
            .split_first()
            .ok_or_else(|| anyhow!("missing job name"))?;
        let job = match (name.as_str(), rest) {
            ("accrual", [year, month]) => Self::Accrual {
                year: arg(year, "year")?,
                month: arg(month, "month")?,
            },
            ("annual-pto", [year]) => Self::AnnualPto {
                year: arg(year, "year")?,
            },
            ("carry-forward", [from, to]) => Self::CarryForward {
                from: arg(from, "from year")?,
                to: arg(to, "to year")?,
            },
            ("expire-carry-forward", [year]) => Self::ExpireCarryForward {
                year: arg(year, "year")?,
            },
            ("expire-comp-off", []) => Self::ExpireCompOff { as_of: None },
            ("expire-comp-off", [day]) => Self::ExpireCompOff {
                as_of: Some(arg(day, "date")?),
            },
            ("reconcile", [year]) => Self::Reconcile {
                year: arg(year, "year")?,
            },
            (other, _) => bail!("unknown job or wrong arguments: {other}"),
        };
        Ok(job)
    }

    async fn run(self, engine: &LeaveEngine) -> Result<Value, AppError> {
        match self {
            Self::Accrual { year, month } => summary(engine.run_monthly_accrual(year, month).await),
            Self::AnnualPto { year } => summary(engine.run_annual_pto_accrual(year).await),
            Self::CarryForward { from, to } => {
                summary(engine.run_year_end_carry_forward(from, to).await)
            }
            Self::ExpireCarryForward { year } => {
                summary(engine.run_carry_forward_expiry(year).await)
            }
            Self::ExpireCompOff { as_of } => {
                // grants are issued in India, so "today" is India's date
                let as_of = as_of.unwrap_or_else(|| Country::India.today(Utc::now()));
                summary(engine.run_comp_off_expiry(as_of).await)
            }
            Self::Reconcile { year } => summary(engine.reconcile_balances(year).await),
        }
    }
}

fn summary<T: Serialize>(result: Result<T, EngineError>) -> Result<Value, AppError> {
    let report = result?;
    serde_json::to_value(report).map_err(|e| AppError::Internal(e.to_string()))
}

fn arg<T>(raw: &str, what: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse()
        .with_context(|| format!("invalid {what}: {raw}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leaveledger=info,scheduler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let job = Job::parse(&args).context("usage: scheduler <job> [args]")?;

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = connect(&config.database).await?;
    info!(?job, "Connected to database");

    let engine = LeaveEngine::new(
        db.clone(),
        Collaborators::database_backed(&db),
        config.engine,
        config.policy,
    );
    match job.clone().run(&engine).await {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(err) => {
            error!(?job, code = err.error_code(), error = %err, "Job failed");
            println!("{}", serde_json::to_string_pretty(&err.body())?);
            Err(err.into())
        }
    }
}
