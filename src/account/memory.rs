//! In-process storage backend
//!
//! All records live behind one async mutex. A [`TransferScope`] holds that
//! mutex for its whole lifetime, so a transfer is serialised against every
//! other store operation. Balance writes are staged and only applied on
//! commit.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};

use super::models::{Account, Customer, NewAccount, NewCustomer, Page};
use super::repository::{LedgerStore, StoreError, StoreResult, TransferScope, lock_order};
use crate::core_types::{AccountId, CustomerId, MinorUnits};

#[derive(Default)]
struct MemoryState {
    customers: BTreeMap<CustomerId, Customer>,
    email_index: HashMap<String, CustomerId>,
    accounts: BTreeMap<AccountId, Account>,
    next_customer_id: CustomerId,
    next_account_id: AccountId,
}

/// In-memory [`LedgerStore`]
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        Ok(self.state.lock().await.customers.get(&id).cloned())
    }

    async fn get_customer_by_email(&self, email: &str) -> StoreResult<Option<Customer>> {
        let state = self.state.lock().await;
        Ok(state
            .email_index
            .get(email)
            .and_then(|id| state.customers.get(id))
            .cloned())
    }

    async fn list_customers(&self, page: Page) -> StoreResult<Vec<Customer>> {
        let state = self.state.lock().await;
        Ok(state
            .customers
            .values()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn insert_customer(&self, new: NewCustomer) -> StoreResult<Customer> {
        let mut state = self.state.lock().await;
        if state.email_index.contains_key(&new.email) {
            return Err(StoreError::UniqueViolation("Email".to_string()));
        }

        state.next_customer_id += 1;
        let customer = Customer {
            id: state.next_customer_id,
            email: new.email,
            hashed_password: new.hashed_password,
            is_active: true,
        };
        state
            .email_index
            .insert(customer.email.clone(), customer.id);
        state.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.state.lock().await.accounts.get(&id).copied())
    }

    async fn list_accounts(&self, page: Page) -> StoreResult<Vec<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .copied()
            .collect())
    }

    async fn list_accounts_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> StoreResult<Vec<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .filter(|a| a.customer_id == customer_id)
            .copied()
            .collect())
    }

    async fn list_accounts_for_customers(
        &self,
        customer_ids: &[CustomerId],
    ) -> StoreResult<Vec<Account>> {
        let owners: HashSet<CustomerId> = customer_ids.iter().copied().collect();
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .filter(|a| owners.contains(&a.customer_id))
            .copied()
            .collect())
    }

    async fn insert_account(&self, new: NewAccount) -> StoreResult<Account> {
        let mut state = self.state.lock().await;
        if !state.customers.contains_key(&new.customer_id) {
            return Err(StoreError::MissingReference("customer".to_string()));
        }

        state.next_account_id += 1;
        let account = Account {
            id: state.next_account_id,
            balance: new.balance,
            customer_id: new.customer_id,
        };
        state.accounts.insert(account.id, account);
        Ok(account)
    }

    async fn begin_transfer<'a>(&'a self) -> StoreResult<Box<dyn TransferScope + 'a>> {
        let guard = self.state.lock().await;
        Ok(Box::new(MemoryTransferScope {
            guard,
            staged: BTreeMap::new(),
        }))
    }
}

struct MemoryTransferScope<'a> {
    guard: MutexGuard<'a, MemoryState>,
    staged: BTreeMap<AccountId, MinorUnits>,
}

impl MemoryTransferScope<'_> {
    fn read(&self, id: AccountId) -> Option<Account> {
        self.guard.accounts.get(&id).map(|account| Account {
            balance: self.staged.get(&id).copied().unwrap_or(account.balance),
            ..*account
        })
    }
}

#[async_trait]
impl TransferScope for MemoryTransferScope<'_> {
    async fn lock_pair(
        &mut self,
        first: AccountId,
        second: AccountId,
    ) -> StoreResult<(Option<Account>, Option<Account>)> {
        // The store mutex is already held; ordering only matters for Postgres.
        let (low, high) = lock_order(first, second);
        let (low, high) = (self.read(low), self.read(high));
        if first <= second {
            Ok((low, high))
        } else {
            Ok((high, low))
        }
    }

    async fn set_balance(&mut self, id: AccountId, balance: MinorUnits) -> StoreResult<()> {
        if !self.guard.accounts.contains_key(&id) {
            return Err(StoreError::Backend(format!("Account {} is not locked", id)));
        }
        self.staged.insert(id, balance);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTransferScope { mut guard, staged } = *self;
        for (id, balance) in staged {
            if let Some(account) = guard.accounts.get_mut(&id) {
                account.balance = balance;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_customer(email: &str) -> NewCustomer {
        NewCustomer {
            email: email.to_string(),
            hashed_password: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_customer_assigns_ascending_ids() {
        let store = MemoryStore::new();
        let a = store.insert_customer(new_customer("a@x.com")).await.unwrap();
        let b = store.insert_customer(new_customer("b@x.com")).await.unwrap();

        assert!(a.id < b.id);
        assert!(a.is_active);
        assert_eq!(
            store.get_customer_by_email("b@x.com").await.unwrap(),
            Some(b)
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let store = MemoryStore::new();
        store.insert_customer(new_customer("a@x.com")).await.unwrap();

        let err = store
            .insert_customer(new_customer("a@x.com"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::UniqueViolation("Email".to_string()));
        assert_eq!(store.list_customers(Page::new(0, 10)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_account_requires_customer() {
        let store = MemoryStore::new();
        let err = store
            .insert_account(NewAccount {
                customer_id: 42,
                balance: 10,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_list_accounts_by_customer_filters_owner() {
        let store = MemoryStore::new();
        let dave = store.insert_customer(new_customer("dave@x.com")).await.unwrap();
        let mary = store.insert_customer(new_customer("mary@x.com")).await.unwrap();
        for (owner, balance) in [(dave.id, 1), (mary.id, 2), (dave.id, 3)] {
            store
                .insert_account(NewAccount {
                    customer_id: owner,
                    balance,
                })
                .await
                .unwrap();
        }

        let accounts = store.list_accounts_by_customer(dave.id).await.unwrap();
        let balances: Vec<_> = accounts.iter().map(|a| a.balance).collect();
        assert_eq!(balances, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_list_accounts_for_customers_in_id_order() {
        let store = MemoryStore::new();
        let dave = store.insert_customer(new_customer("dave@x.com")).await.unwrap();
        let mary = store.insert_customer(new_customer("mary@x.com")).await.unwrap();
        let zoe = store.insert_customer(new_customer("zoe@x.com")).await.unwrap();
        for (owner, balance) in [(mary.id, 1), (zoe.id, 2), (dave.id, 3), (mary.id, 4)] {
            store
                .insert_account(NewAccount {
                    customer_id: owner,
                    balance,
                })
                .await
                .unwrap();
        }

        let accounts = store
            .list_accounts_for_customers(&[dave.id, mary.id])
            .await
            .unwrap();
        let balances: Vec<_> = accounts.iter().map(|a| a.balance).collect();
        assert_eq!(balances, vec![1, 3, 4]);
        assert!(store.list_accounts_for_customers(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scope_dropped_without_commit_discards_changes() {
        let store = MemoryStore::new();
        let owner = store.insert_customer(new_customer("a@x.com")).await.unwrap();
        let account = store
            .insert_account(NewAccount {
                customer_id: owner.id,
                balance: 100,
            })
            .await
            .unwrap();

        {
            let mut scope = store.begin_transfer().await.unwrap();
            scope.set_balance(account.id, 0).await.unwrap();
        }

        let reread = store.get_account(account.id).await.unwrap().unwrap();
        assert_eq!(reread.balance, 100);
    }

    #[tokio::test]
    async fn test_lock_pair_returns_argument_order() {
        let store = MemoryStore::new();
        let owner = store.insert_customer(new_customer("a@x.com")).await.unwrap();
        let mut ids = Vec::new();
        for balance in [10, 20] {
            let account = store
                .insert_account(NewAccount {
                    customer_id: owner.id,
                    balance,
                })
                .await
                .unwrap();
            ids.push(account.id);
        }

        let mut scope = store.begin_transfer().await.unwrap();
        let (first, second) = scope.lock_pair(ids[1], ids[0]).await.unwrap();
        assert_eq!(first.unwrap().balance, 20);
        assert_eq!(second.unwrap().balance, 10);

        let (present, missing) = scope.lock_pair(ids[0], 999).await.unwrap();
        assert!(present.is_some());
        assert!(missing.is_none());
    }
}
