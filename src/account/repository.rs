//! Storage seam for customers and accounts
//!
//! [`LedgerStore`] is the keyed storage the services delegate to.
//! [`TransferScope`] is the transaction handle the transfer engine runs its
//! read-validate-write sequence inside. Dropping a scope without calling
//! [`TransferScope::commit`] discards every staged change.

use async_trait::async_trait;
use thiserror::Error;

use super::models::{Account, Customer, NewAccount, NewCustomer, Page};
use crate::core_types::{AccountId, CustomerId, MinorUnits};

/// Storage error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Serialization failure or deadlock; the whole scope may be retried.
    #[error("Concurrent update conflict")]
    Contention,

    #[error("{0} already exists")]
    UniqueViolation(String),

    #[error("Referenced {0} does not exist")]
    MissingReference(String),

    #[error("{0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.code().as_deref() {
                // serialization_failure, deadlock_detected
                Some("40001") | Some("40P01") => return StoreError::Contention,
                Some("23505") => {
                    let what = if constraint.contains("email") {
                        "Email"
                    } else {
                        "Record"
                    };
                    return StoreError::UniqueViolation(what.to_string());
                }
                Some("23503") => return StoreError::MissingReference("customer".to_string()),
                _ => {}
            }
        }
        StoreError::Backend(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed storage for customer and account records
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Backend name for logging
    fn backend(&self) -> &'static str;

    /// Check that the backend is reachable
    async fn health_check(&self) -> StoreResult<()>;

    async fn get_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>>;

    async fn get_customer_by_email(&self, email: &str) -> StoreResult<Option<Customer>>;

    /// List customers ordered by id
    async fn list_customers(&self, page: Page) -> StoreResult<Vec<Customer>>;

    /// Insert a customer. Fails with `UniqueViolation` if the email exists.
    async fn insert_customer(&self, new: NewCustomer) -> StoreResult<Customer>;

    async fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>>;

    /// List accounts ordered by id
    async fn list_accounts(&self, page: Page) -> StoreResult<Vec<Account>>;

    /// List the accounts owned by one customer, ordered by id
    async fn list_accounts_by_customer(&self, customer_id: CustomerId)
    -> StoreResult<Vec<Account>>;

    /// Accounts owned by any of `customer_ids`, ordered by id, in one lookup
    async fn list_accounts_for_customers(
        &self,
        customer_ids: &[CustomerId],
    ) -> StoreResult<Vec<Account>>;

    /// Insert an account. Fails with `MissingReference` if the customer is gone.
    async fn insert_account(&self, new: NewAccount) -> StoreResult<Account>;

    /// Open a transaction scope for a two-account transfer
    async fn begin_transfer<'a>(&'a self) -> StoreResult<Box<dyn TransferScope + 'a>>;
}

/// Transaction scope for a two-account read-modify-write
#[async_trait]
pub trait TransferScope: Send {
    /// Lock both accounts and return them in argument order.
    ///
    /// Locks are always taken in ascending id order regardless of argument
    /// order. A missing account comes back as `None`.
    async fn lock_pair(
        &mut self,
        first: AccountId,
        second: AccountId,
    ) -> StoreResult<(Option<Account>, Option<Account>)>;

    /// Stage a new balance for a locked account
    async fn set_balance(&mut self, id: AccountId, balance: MinorUnits) -> StoreResult<()>;

    /// Make every staged change durable as one unit
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Ascending lock order for a pair of account ids
pub fn lock_order(first: AccountId, second: AccountId) -> (AccountId, AccountId) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}
