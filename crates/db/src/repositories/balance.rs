//! Balance repository: versioned ledger writes and the movement journal.
//!
//! Every write is a read of the current row followed by an UPDATE guarded
//! by the version that was read. A guard miss means another writer got in
//! first; the write re-reads and tries again a bounded number of times
//! before reporting a conflict.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use leaveledger_core::leave::LeaveType;
use leaveledger_core::ledger::{
    BalanceAnomaly, LeaveBalance, LedgerError, MovementKind, Reconciliation,
};
use leaveledger_shared::types::EmployeeId;

use crate::entities::{balance_transactions, leave_balances, sea_orm_active_enums::LeaveTypeCode};
use crate::error::StoreError;

use super::convert::{self, units};

/// How many times one write re-reads a balance whose version moved.
pub const LEDGER_WRITE_ATTEMPTS: u32 = 3;

/// Natural key of a balance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BalanceKey {
    /// Owner.
    pub employee_id: EmployeeId,
    /// Ledger.
    pub leave_type: LeaveType,
    /// Calendar year.
    pub year: i32,
}

impl BalanceKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(employee_id: EmployeeId, leave_type: LeaveType, year: i32) -> Self {
        Self {
            employee_id,
            leave_type,
            year,
        }
    }
}

impl fmt::Display for BalanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.employee_id, self.leave_type, self.year)
    }
}

/// A ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceChange {
    /// Add entitlement.
    Credit(Decimal),
    /// Consume available.
    Debit(Decimal),
    /// Undo a debit.
    Reverse(Decimal),
    /// Carried entitlement arriving from the previous year.
    CarryIn(Decimal),
    /// Remove everything still available (year end).
    CloseOut,
    /// Remove up to this much available (expiry).
    Expire(Decimal),
    /// Only repair the stored invariants.
    Repair,
}

impl BalanceChange {
    /// Journal kind for this change.
    #[must_use]
    pub const fn kind(&self) -> MovementKind {
        match self {
            Self::Credit(_) => MovementKind::Credit,
            Self::Debit(_) => MovementKind::Debit,
            Self::Reverse(_) => MovementKind::Reversal,
            Self::CarryIn(_) => MovementKind::CarryIn,
            Self::CloseOut => MovementKind::CloseOut,
            Self::Expire(_) => MovementKind::Expiry,
            Self::Repair => MovementKind::Adjustment,
        }
    }

    /// Applies the change and returns the amount that actually moved.
    fn apply(self, balance: &mut LeaveBalance) -> Result<Decimal, LedgerError> {
        match self {
            Self::Credit(amount) => balance.credit(amount).map(|()| amount),
            Self::Debit(amount) => balance.debit(amount).map(|()| amount),
            Self::Reverse(amount) => balance.reverse(amount).map(|()| amount),
            Self::CarryIn(amount) => balance.carry_in(amount).map(|()| amount),
            Self::CloseOut => Ok(balance.close_out()),
            Self::Expire(amount) => Ok(balance.extinguish(amount)),
            Self::Repair => Ok(Decimal::ZERO),
        }
    }
}

/// Result of a committed ledger write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceWrite {
    /// The record after the write.
    pub balance: LeaveBalance,
    /// Amount that moved; close-out and expiry may move less than asked.
    pub amount: Decimal,
    /// Invariant repair applied to the stored row before the change.
    pub repaired: Option<BalanceAnomaly>,
}

/// One journal row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    /// Movement kind.
    pub kind: MovementKind,
    /// Amount moved.
    pub amount: Decimal,
    /// Available after the movement.
    pub available_after: Decimal,
    /// What caused it.
    pub reference: String,
    /// When.
    pub created_at: DateTime<Utc>,
}

/// Balance repository for ledger reads and writes.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads a balance with its invariants restored.
    ///
    /// A missing row reads as zero. A stored row that violates the
    /// invariants is returned repaired, with the anomaly alongside; the
    /// stored row itself is left for the reconciliation job.
    pub async fn read(&self, key: BalanceKey) -> Result<Reconciliation, StoreError> {
        Ok(find_row(&self.db, key)
            .await?
            .map_or_else(
                || LeaveBalance::zero(key.employee_id, key.leave_type, key.year),
                |row| convert::balance(&row),
            )
            .reconciled())
    }

    /// Every stored balance of an employee for a year, repaired on read.
    pub async fn list_for_employee(
        &self,
        employee_id: EmployeeId,
        year: i32,
    ) -> Result<Vec<Reconciliation>, StoreError> {
        let rows = leave_balances::Entity::find()
            .filter(leave_balances::Column::EmployeeId.eq(employee_id.into_inner()))
            .filter(leave_balances::Column::Year.eq(year))
            .order_by_asc(leave_balances::Column::LeaveType)
            .all(&self.db)
            .await?;
        Ok(rows
            .iter()
            .map(|row| convert::balance(row).reconciled())
            .collect())
    }

    /// Every stored balance for a year, exactly as stored.
    pub async fn list_year(&self, year: i32) -> Result<Vec<LeaveBalance>, StoreError> {
        let rows = leave_balances::Entity::find()
            .filter(leave_balances::Column::Year.eq(year))
            .order_by_asc(leave_balances::Column::EmployeeId)
            .order_by_asc(leave_balances::Column::LeaveType)
            .all(&self.db)
            .await?;
        Ok(rows.iter().map(convert::balance).collect())
    }

    /// Applies one change in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Ledger` when the ledger rejects the change
    /// (insufficient balance, bad amount) or the row kept moving.
    pub async fn apply(
        &self,
        key: BalanceKey,
        change: BalanceChange,
        reference: &str,
        now: DateTime<Utc>,
    ) -> Result<BalanceWrite, StoreError> {
        let txn = self.db.begin().await?;
        let write = apply_in(&txn, key, change, reference, now).await?;
        txn.commit().await?;
        Ok(write)
    }

    /// Journal rows for a balance, oldest first.
    pub async fn journal(&self, key: BalanceKey) -> Result<Vec<JournalEntry>, StoreError> {
        let Some(row) = find_row(&self.db, key).await? else {
            return Ok(Vec::new());
        };
        let entries = balance_transactions::Entity::find()
            .filter(balance_transactions::Column::BalanceId.eq(row.id))
            .order_by_asc(balance_transactions::Column::CreatedAt)
            .order_by_asc(balance_transactions::Column::Id)
            .all(&self.db)
            .await?;
        Ok(entries
            .into_iter()
            .map(|entry| JournalEntry {
                kind: entry.kind.into(),
                amount: convert::days(entry.amount_half_days),
                available_after: convert::days(entry.available_after_half_days),
                reference: entry.reference,
                created_at: entry.created_at,
            })
            .collect())
    }
}

pub(crate) async fn find_row<C: ConnectionTrait>(
    conn: &C,
    key: BalanceKey,
) -> Result<Option<leave_balances::Model>, StoreError> {
    Ok(leave_balances::Entity::find()
        .filter(leave_balances::Column::EmployeeId.eq(key.employee_id.into_inner()))
        .filter(leave_balances::Column::LeaveType.eq(LeaveTypeCode::from(key.leave_type)))
        .filter(leave_balances::Column::Year.eq(key.year))
        .one(conn)
        .await?)
}

/// Reads the row, creating an empty one first if needed.
async fn ensure_row<C: ConnectionTrait>(
    conn: &C,
    key: BalanceKey,
    now: DateTime<Utc>,
) -> Result<leave_balances::Model, StoreError> {
    if let Some(row) = find_row(conn, key).await? {
        return Ok(row);
    }

    let empty = leave_balances::ActiveModel {
        id: Set(Uuid::now_v7()),
        employee_id: Set(key.employee_id.into_inner()),
        leave_type: Set(key.leave_type.into()),
        year: Set(key.year),
        total_entitlement_half_days: Set(0),
        used_half_days: Set(0),
        available_half_days: Set(0),
        carry_forward_half_days: Set(0),
        version: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };
    leave_balances::Entity::insert(empty)
        .on_conflict(
            OnConflict::columns([
                leave_balances::Column::EmployeeId,
                leave_balances::Column::LeaveType,
                leave_balances::Column::Year,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    find_row(conn, key)
        .await?
        .ok_or_else(|| StoreError::Corrupt(format!("balance {key} missing after upsert")))
}

/// Applies `change` to the balance at `key` on `conn`.
///
/// Callers running inside a transaction pass the transaction so the write
/// commits or rolls back with the rest of their work.
pub(crate) async fn apply_in<C: ConnectionTrait>(
    conn: &C,
    key: BalanceKey,
    change: BalanceChange,
    reference: &str,
    now: DateTime<Utc>,
) -> Result<BalanceWrite, StoreError> {
    apply_attempts(conn, key, change, reference, now, None, LEDGER_WRITE_ATTEMPTS).await
}

/// The write loop behind [`apply_in`].
///
/// `snapshot` stands in for the first read when given, so a row read
/// before another writer moved it goes through the same guard.
async fn apply_attempts<C: ConnectionTrait>(
    conn: &C,
    key: BalanceKey,
    change: BalanceChange,
    reference: &str,
    now: DateTime<Utc>,
    mut snapshot: Option<leave_balances::Model>,
    attempts: u32,
) -> Result<BalanceWrite, StoreError> {
    for attempt in 1..=attempts {
        let row = match snapshot.take() {
            Some(row) => row,
            None => ensure_row(conn, key, now).await?,
        };
        let Reconciliation {
            balance: mut balance,
            anomaly,
        } = convert::balance(&row).reconciled();

        let amount = change.apply(&mut balance)?;
        if amount.is_zero() && anomaly.is_none() {
            return Ok(BalanceWrite {
                balance,
                amount,
                repaired: None,
            });
        }

        let result = leave_balances::Entity::update_many()
            .col_expr(
                leave_balances::Column::TotalEntitlementHalfDays,
                Expr::value(units(balance.total_entitlement)?),
            )
            .col_expr(
                leave_balances::Column::UsedHalfDays,
                Expr::value(units(balance.used)?),
            )
            .col_expr(
                leave_balances::Column::AvailableHalfDays,
                Expr::value(units(balance.available)?),
            )
            .col_expr(
                leave_balances::Column::CarryForwardHalfDays,
                Expr::value(units(balance.carry_forward)?),
            )
            .col_expr(
                leave_balances::Column::Version,
                Expr::col(leave_balances::Column::Version).add(1),
            )
            .col_expr(leave_balances::Column::UpdatedAt, Expr::value(now))
            .filter(leave_balances::Column::Id.eq(row.id))
            .filter(leave_balances::Column::Version.eq(row.version))
            .exec(conn)
            .await?;

        if result.rows_affected == 1 {
            balance.version = row.version + 1;
            if let Some(found) = &anomaly {
                let shift = (found.repaired_available - found.recorded_available).abs();
                journal_in(conn, &row, MovementKind::Adjustment, shift, &balance, reference, now)
                    .await?;
            }
            if !amount.is_zero() {
                journal_in(conn, &row, change.kind(), amount, &balance, reference, now).await?;
            }
            return Ok(BalanceWrite {
                balance,
                amount,
                repaired: anomaly,
            });
        }

        debug!(
            attempt,
            employee_id = %key.employee_id,
            leave_type = %key.leave_type,
            year = key.year,
            "balance version moved, re-reading"
        );
    }

    Err(LedgerError::Conflict { attempts }.into())
}

async fn journal_in<C: ConnectionTrait>(
    conn: &C,
    row: &leave_balances::Model,
    kind: MovementKind,
    amount: Decimal,
    after: &LeaveBalance,
    reference: &str,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let entry = balance_transactions::ActiveModel {
        id: Set(Uuid::now_v7()),
        balance_id: Set(row.id),
        employee_id: Set(row.employee_id),
        leave_type: Set(row.leave_type),
        year: Set(row.year),
        kind: Set(kind.into()),
        amount_half_days: Set(units(amount)?),
        available_after_half_days: Set(units(after.available)?),
        reference: Set(reference.to_string()),
        created_at: Set(now),
    };
    balance_transactions::Entity::insert(entry)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
    }

    fn key() -> BalanceKey {
        BalanceKey::new(EmployeeId::new(), LeaveType::Privilege, 2024)
    }

    /// Seeds 10 days and returns the row as read before a second writer
    /// moved it.
    async fn stale_row(db: &DatabaseConnection, key: BalanceKey) -> leave_balances::Model {
        apply_in(db, key, BalanceChange::Credit(dec!(10)), "seed", now())
            .await
            .unwrap();
        let stale = find_row(db, key).await.unwrap().unwrap();
        apply_in(db, key, BalanceChange::Debit(dec!(2)), "other writer", now())
            .await
            .unwrap();
        stale
    }

    #[tokio::test]
    async fn test_stale_read_is_retried_against_fresh_row() {
        let db = crate::connect_in_memory().await.unwrap();
        let key = key();
        let stale = stale_row(&db, key).await;

        let write = apply_attempts(
            &db,
            key,
            BalanceChange::Debit(dec!(3)),
            "late writer",
            now(),
            Some(stale),
            LEDGER_WRITE_ATTEMPTS,
        )
        .await
        .unwrap();

        // both debits landed: the stale read did not overwrite the first
        assert_eq!(write.balance.used, dec!(5));
        assert_eq!(write.balance.available, dec!(5));
        assert_eq!(write.balance.version, 3);
        let stored = find_row(&db, key).await.unwrap().unwrap();
        assert_eq!(stored.available_half_days, 10);
        assert_eq!(stored.version, 3);
    }

    #[tokio::test]
    async fn test_version_miss_without_retries_left_is_a_conflict() {
        let db = crate::connect_in_memory().await.unwrap();
        let key = key();
        let stale = stale_row(&db, key).await;

        let err = apply_attempts(
            &db,
            key,
            BalanceChange::Debit(dec!(3)),
            "late writer",
            now(),
            Some(stale),
            1,
        )
        .await
        .unwrap_err();

        assert!(err.is_conflict(), "got {err:?}");
        let stored = find_row(&db, key).await.unwrap().unwrap();
        assert_eq!(stored.available_half_days, 16);
        assert_eq!(stored.version, 2);
        let journal = BalanceRepository::new(db.clone()).journal(key).await.unwrap();
        assert_eq!(journal.len(), 2);
    }
}
