//! Integration tests for BalanceRepository against in-memory SQLite.

#![allow(clippy::uninlined_format_args)]

mod common;

use std::sync::Arc;

use futures::future::join_all;
use rust_decimal_macros::dec;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tokio::sync::Barrier;

use leaveledger_core::leave::LeaveType;
use leaveledger_core::ledger::{AnomalyKind, LedgerError, MovementKind};
use leaveledger_db::entities::leave_balances;
use leaveledger_db::repositories::{AnomalyRepository, BalanceChange, BalanceKey};
use leaveledger_db::{BalanceRepository, StoreError};
use leaveledger_shared::types::{EmployeeId, PageRequest};

use common::{at, db};

#[tokio::test]
async fn test_read_missing_balance_is_zero() {
    let db = db().await;
    let repo = BalanceRepository::new(db);
    let key = BalanceKey::new(EmployeeId::new(), LeaveType::Casual, 2026);

    let found = repo.read(key).await.unwrap();

    assert_eq!(found.balance.available, dec!(0));
    assert_eq!(found.balance.total_entitlement, dec!(0));
    assert!(found.anomaly.is_none());
}

#[tokio::test]
async fn test_credit_then_debit_keeps_invariant_and_journals() {
    let db = db().await;
    let repo = BalanceRepository::new(db);
    let key = BalanceKey::new(EmployeeId::new(), LeaveType::Privilege, 2026);

    repo.apply(key, BalanceChange::Credit(dec!(5)), "accrual:2026-01", at(2026, 1, 31))
        .await
        .unwrap();
    let write = repo
        .apply(key, BalanceChange::Debit(dec!(1.5)), "request:x", at(2026, 2, 1))
        .await
        .unwrap();

    assert_eq!(write.balance.total_entitlement, dec!(5));
    assert_eq!(write.balance.used, dec!(1.5));
    assert_eq!(write.balance.available, dec!(3.5));
    assert_eq!(write.balance.version, 2);

    let journal = repo.journal(key).await.unwrap();
    let kinds: Vec<_> = journal.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![MovementKind::Credit, MovementKind::Debit]);
    assert_eq!(journal[1].available_after, dec!(3.5));
}

#[tokio::test]
async fn test_debit_beyond_available_fails_and_leaves_row_untouched() {
    let db = db().await;
    let repo = BalanceRepository::new(db);
    let key = BalanceKey::new(EmployeeId::new(), LeaveType::Casual, 2026);
    repo.apply(key, BalanceChange::Credit(dec!(2)), "seed", at(2026, 1, 1))
        .await
        .unwrap();

    let err = repo
        .apply(key, BalanceChange::Debit(dec!(3)), "request:x", at(2026, 1, 2))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::Ledger(LedgerError::InsufficientBalance { .. })
    ));
    let after = repo.read(key).await.unwrap().balance;
    assert_eq!(after.available, dec!(2));
    assert_eq!(after.used, dec!(0));
    assert_eq!(repo.journal(key).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reverse_restores_available() {
    let db = db().await;
    let repo = BalanceRepository::new(db);
    let key = BalanceKey::new(EmployeeId::new(), LeaveType::Sick, 2026);
    repo.apply(key, BalanceChange::Credit(dec!(6)), "seed", at(2026, 1, 1))
        .await
        .unwrap();
    repo.apply(key, BalanceChange::Debit(dec!(2)), "request:a", at(2026, 1, 2))
        .await
        .unwrap();

    let write = repo
        .apply(key, BalanceChange::Reverse(dec!(2)), "request:a", at(2026, 1, 3))
        .await
        .unwrap();

    assert_eq!(write.balance.used, dec!(0));
    assert_eq!(write.balance.available, dec!(6));
}

#[tokio::test]
async fn test_concurrent_debits_exactly_one_succeeds() {
    let db = db().await;
    let repo = BalanceRepository::new(db);
    let key = BalanceKey::new(EmployeeId::new(), LeaveType::Casual, 2026);
    repo.apply(key, BalanceChange::Credit(dec!(4)), "seed", at(2026, 1, 1))
        .await
        .unwrap();

    const TASKS: usize = 2;
    let barrier = Arc::new(Barrier::new(TASKS));
    let mut handles = Vec::with_capacity(TASKS);
    for i in 0..TASKS {
        let repo = repo.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            repo.apply(
                key,
                BalanceChange::Debit(dec!(3)),
                &format!("request:{}", i),
                at(2026, 1, 5),
            )
            .await
        }));
    }

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let insufficient = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(StoreError::Ledger(LedgerError::InsufficientBalance { .. }))
            )
        })
        .count();
    assert_eq!(succeeded, 1);
    assert_eq!(insufficient, 1);

    let after = repo.read(key).await.unwrap().balance;
    assert_eq!(after.available, dec!(1));
    assert_eq!(after.used, dec!(3));
}

#[tokio::test]
async fn test_many_concurrent_credits_lose_nothing() {
    let db = db().await;
    let repo = BalanceRepository::new(db);
    let key = BalanceKey::new(EmployeeId::new(), LeaveType::CompOff, 2026);

    const TASKS: usize = 20;
    let barrier = Arc::new(Barrier::new(TASKS));
    let handles: Vec<_> = (0..TASKS)
        .map(|i| {
            let repo = repo.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                repo.apply(
                    key,
                    BalanceChange::Credit(dec!(0.5)),
                    &format!("comp-off:{}", i),
                    at(2026, 3, 1),
                )
                .await
            })
        })
        .collect();
    for joined in join_all(handles).await {
        joined.expect("task panicked").expect("credit");
    }

    let after = repo.read(key).await.unwrap().balance;
    assert_eq!(after.total_entitlement, dec!(10));
    assert_eq!(after.available, dec!(10));
    assert_eq!(repo.journal(key).await.unwrap().len(), TASKS);
}

#[tokio::test]
async fn test_corrupt_row_is_repaired_on_next_write() {
    let db = db().await;
    let repo = BalanceRepository::new(db.clone());
    let key = BalanceKey::new(EmployeeId::new(), LeaveType::Privilege, 2026);
    repo.apply(key, BalanceChange::Credit(dec!(10)), "seed", at(2026, 1, 1))
        .await
        .unwrap();

    // available drifts from total - used
    leave_balances::Entity::update_many()
        .col_expr(leave_balances::Column::AvailableHalfDays, Expr::value(30_i64))
        .filter(leave_balances::Column::EmployeeId.eq(key.employee_id.into_inner()))
        .exec(&db)
        .await
        .unwrap();

    let read = repo.read(key).await.unwrap();
    let anomaly = read.anomaly.expect("drift detected on read");
    assert_eq!(anomaly.kind, AnomalyKind::AvailableMismatch);
    assert_eq!(anomaly.recorded_available, dec!(15));
    assert_eq!(read.balance.available, dec!(10));

    let write = repo
        .apply(key, BalanceChange::Debit(dec!(2)), "request:x", at(2026, 2, 1))
        .await
        .unwrap();
    assert!(write.repaired.is_some());
    assert_eq!(write.balance.available, dec!(8));

    let kinds: Vec<_> = repo.journal(key).await.unwrap().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            MovementKind::Credit,
            MovementKind::Adjustment,
            MovementKind::Debit
        ]
    );
}

#[tokio::test]
async fn test_close_out_and_expire_move_only_what_is_available() {
    let db = db().await;
    let repo = BalanceRepository::new(db);
    let key = BalanceKey::new(EmployeeId::new(), LeaveType::Casual, 2025);
    repo.apply(key, BalanceChange::Credit(dec!(3)), "seed", at(2025, 1, 1))
        .await
        .unwrap();

    let expired = repo
        .apply(key, BalanceChange::Expire(dec!(5)), "expiry", at(2025, 6, 1))
        .await
        .unwrap();
    assert_eq!(expired.amount, dec!(3));
    assert_eq!(expired.balance.available, dec!(0));

    let closed = repo
        .apply(key, BalanceChange::CloseOut, "close", at(2025, 12, 31))
        .await
        .unwrap();
    assert_eq!(closed.amount, dec!(0));
}

#[tokio::test]
async fn test_anomalies_are_listed_newest_first() {
    let db = db().await;
    let balances = BalanceRepository::new(db.clone());
    let anomalies = AnomalyRepository::new(db.clone());
    let key = BalanceKey::new(EmployeeId::new(), LeaveType::Sick, 2026);
    balances
        .apply(key, BalanceChange::Credit(dec!(4)), "seed", at(2026, 1, 1))
        .await
        .unwrap();
    leave_balances::Entity::update_many()
        .col_expr(leave_balances::Column::AvailableHalfDays, Expr::value(-2_i64))
        .exec(&db)
        .await
        .unwrap();

    let found = balances.read(key).await.unwrap().anomaly.unwrap();
    anomalies
        .record(key, &found, "reconcile", at(2026, 1, 2))
        .await
        .unwrap();

    let page = anomalies.list(&PageRequest::default()).await.unwrap();
    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].employee_id, key.employee_id);
    assert_eq!(page.data[0].source, "reconcile");
    assert_eq!(page.data[0].repaired_available, dec!(4));
    assert_eq!(anomalies.for_balance(key).await.unwrap().len(), 1);
}
