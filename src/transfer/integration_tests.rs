//! Integration Tests for the Transfer Engine
//!
//! These tests run the engine against `MemoryStore`, so no database is needed.

use std::sync::Arc;

use crate::account::{LedgerStore, MemoryStore, NewAccount, NewCustomer};
use crate::core_types::{AccountId, MinorUnits};
use crate::error::LedgerError;
use crate::transfer::{TransferEngine, TransferRequest};

/// Engine plus its store, with helpers to seed accounts
struct TestHarness {
    store: Arc<MemoryStore>,
    engine: Arc<TransferEngine>,
}

impl TestHarness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let engine = Arc::new(TransferEngine::new(store.clone(), 3));
        Self { store, engine }
    }

    async fn account_with(&self, email_prefix: &str, balance: MinorUnits) -> AccountId {
        let customer = self
            .store
            .insert_customer(NewCustomer {
                email: format!("{}@example.com", email_prefix),
                hashed_password: "hash".to_string(),
            })
            .await
            .unwrap();
        self.store
            .insert_account(NewAccount {
                customer_id: customer.id,
                balance,
            })
            .await
            .unwrap()
            .id
    }

    async fn balance(&self, id: AccountId) -> MinorUnits {
        self.store.get_account(id).await.unwrap().unwrap().balance
    }
}

// ========================================================================
// Happy Path Tests
// ========================================================================

#[tokio::test]
async fn test_transfer_moves_money_between_accounts() {
    let harness = TestHarness::new();
    let dave = harness.account_with("dave", 100).await;
    let mary = harness.account_with("mary", 50).await;

    let outcome = harness
        .engine
        .transfer(TransferRequest::new(dave, mary, 10))
        .await
        .unwrap();

    assert_eq!(outcome.source_balance, 90);
    assert_eq!(outcome.destination_balance, 60);
    assert_eq!(harness.balance(dave).await, 90);
    assert_eq!(harness.balance(mary).await, 60);
}

#[tokio::test]
async fn test_transfer_whole_balance_and_zero_amount() {
    let harness = TestHarness::new();
    let a = harness.account_with("a", 40).await;
    let b = harness.account_with("b", 0).await;

    let outcome = harness
        .engine
        .transfer(TransferRequest::new(a, b, 40))
        .await
        .unwrap();
    assert_eq!((outcome.source_balance, outcome.destination_balance), (0, 40));

    let outcome = harness
        .engine
        .transfer(TransferRequest::new(a, b, 0))
        .await
        .unwrap();
    assert_eq!((outcome.source_balance, outcome.destination_balance), (0, 40));
}

#[tokio::test]
async fn test_transfer_from_higher_to_lower_id() {
    let harness = TestHarness::new();
    let low = harness.account_with("low", 10).await;
    let high = harness.account_with("high", 30).await;
    assert!(low < high);

    let outcome = harness
        .engine
        .transfer(TransferRequest::new(high, low, 5))
        .await
        .unwrap();

    assert_eq!(outcome.source_balance, 25);
    assert_eq!(outcome.destination_balance, 15);
}

// ========================================================================
// Rejection Tests
// ========================================================================

#[tokio::test]
async fn test_same_account_is_invalid_operation_regardless_of_amount() {
    let harness = TestHarness::new();
    let a = harness.account_with("self", 100).await;

    for amount in [-5, 0, 55, 1_000] {
        let err = harness
            .engine
            .transfer(TransferRequest::new(a, a, amount))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOperation(_)));
    }

    // Also when the account does not exist at all
    let err = harness
        .engine
        .transfer(TransferRequest::new(1_000, 1_000, 55))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidOperation(_)));
    assert_eq!(harness.balance(a).await, 100);
}

#[tokio::test]
async fn test_missing_account_is_not_found() {
    let harness = TestHarness::new();
    let a = harness.account_with("dave", 100).await;
    let missing = 1_231_321;

    for req in [
        TransferRequest::new(a, missing, 10),
        TransferRequest::new(missing, a, 10),
        TransferRequest::new(missing, missing + 1, 10),
    ] {
        let err = harness.engine.transfer(req).await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::not_found("One or both accounts do not exist")
        );
    }
    assert_eq!(harness.balance(a).await, 100);
}

#[tokio::test]
async fn test_not_found_checked_before_amount() {
    let harness = TestHarness::new();
    let a = harness.account_with("order", 10).await;

    let err = harness
        .engine
        .transfer(TransferRequest::new(a, 999, -1))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound(_)));
}

#[tokio::test]
async fn test_insufficient_funds_leaves_balances_unchanged() {
    let harness = TestHarness::new();
    let dave = harness.account_with("dave", 50).await;
    let mary = harness.account_with("mary", 100).await;

    let err = harness
        .engine
        .transfer(TransferRequest::new(dave, mary, 55))
        .await
        .unwrap_err();

    assert_eq!(err, LedgerError::InsufficientFunds);
    assert_eq!(harness.balance(dave).await, 50);
    assert_eq!(harness.balance(mary).await, 100);
}

#[tokio::test]
async fn test_negative_amount_cannot_reverse_direction() {
    let harness = TestHarness::new();
    let a = harness.account_with("a", 0).await;
    let b = harness.account_with("b", 100).await;

    let err = harness
        .engine
        .transfer(TransferRequest::new(a, b, -50))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InvalidAmount(_)));
    assert_eq!(harness.balance(a).await, 0);
    assert_eq!(harness.balance(b).await, 100);
}

// ========================================================================
// Conservation & Concurrency Tests
// ========================================================================

#[tokio::test]
async fn test_sequence_of_transfers_conserves_sum() {
    let harness = TestHarness::new();
    let ids = [
        harness.account_with("p0", 500).await,
        harness.account_with("p1", 300).await,
        harness.account_with("p2", 0).await,
    ];
    let initial: MinorUnits = 800;

    // Deterministic mix of valid and rejected transfers
    let mut seed: u64 = 0x5eed;
    for _ in 0..200 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        let from = ids[(seed >> 33) as usize % 3];
        let to = ids[(seed >> 40) as usize % 3];
        let amount = ((seed >> 20) % 250) as MinorUnits;

        let before = harness.balance(from).await + harness.balance(to).await;
        let result = harness
            .engine
            .transfer(TransferRequest::new(from, to, amount))
            .await;
        if let Ok(outcome) = result {
            assert_eq!(outcome.source_balance + outcome.destination_balance, before);
        }

        let mut total = 0;
        for id in ids {
            let balance = harness.balance(id).await;
            assert!(balance >= 0, "balance went negative");
            total += balance;
        }
        assert_eq!(total, initial);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transfers_same_pair_no_lost_updates() {
    let harness = TestHarness::new();
    let a = harness.account_with("a", 1_000).await;
    let b = harness.account_with("b", 1_000).await;

    let tasks: Vec<_> = (0..100)
        .map(|_| {
            let engine = harness.engine.clone();
            tokio::spawn(async move { engine.transfer(TransferRequest::new(a, b, 7)).await })
        })
        .collect();

    let results = futures::future::join_all(tasks).await;
    let committed = results
        .into_iter()
        .filter(|r| matches!(r, Ok(Ok(_))))
        .count() as MinorUnits;

    // 1000 / 7 = 142 would fit, so all 100 commit
    assert_eq!(committed, 100);
    assert_eq!(harness.balance(a).await, 1_000 - 7 * committed);
    assert_eq!(harness.balance(b).await, 1_000 + 7 * committed);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_crossing_transfers_conserve_sum() {
    let harness = TestHarness::new();
    let a = harness.account_with("a", 100).await;
    let b = harness.account_with("b", 100).await;

    let tasks: Vec<_> = (0..200)
        .map(|i| {
            let engine = harness.engine.clone();
            let req = if i % 2 == 0 {
                TransferRequest::new(a, b, 3)
            } else {
                TransferRequest::new(b, a, 5)
            };
            tokio::spawn(async move { engine.transfer(req).await })
        })
        .collect();

    for result in futures::future::join_all(tasks).await {
        match result.unwrap() {
            Ok(_) | Err(LedgerError::InsufficientFunds) => {}
            Err(other) => panic!("unexpected transfer error: {other}"),
        }
    }

    let a_balance = harness.balance(a).await;
    let b_balance = harness.balance(b).await;
    assert!(a_balance >= 0 && b_balance >= 0);
    assert_eq!(a_balance + b_balance, 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overdraw_never_goes_negative() {
    let harness = TestHarness::new();
    let a = harness.account_with("a", 50).await;
    let b = harness.account_with("b", 0).await;

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let engine = harness.engine.clone();
            tokio::spawn(async move { engine.transfer(TransferRequest::new(a, b, 10)).await })
        })
        .collect();

    let results = futures::future::join_all(tasks).await;
    let committed = results
        .iter()
        .filter(|r| matches!(r, Ok(Ok(_))))
        .count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Ok(Err(LedgerError::InsufficientFunds))))
        .count();

    assert_eq!(committed, 5);
    assert_eq!(rejected, 15);
    assert_eq!(harness.balance(a).await, 0);
    assert_eq!(harness.balance(b).await, 50);
}
