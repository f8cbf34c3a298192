//! PostgreSQL storage backend
//!
//! Transfer scopes are sqlx transactions. Both account rows are locked with
//! `SELECT ... FOR UPDATE`, lower id first. A transaction dropped without
//! commit is rolled back by sqlx.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use super::models::{Account, Customer, NewAccount, NewCustomer, Page};
use super::repository::{LedgerStore, StoreResult, TransferScope, lock_order};
use crate::core_types::{AccountId, CustomerId, MinorUnits};
use crate::db::Database;

const CUSTOMER_COLUMNS: &str = "id, email, hashed_password, is_active";
const ACCOUNT_COLUMNS: &str = "id, balance, customer_id";

/// PostgreSQL [`LedgerStore`]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(self.db.health_check().await?)
    }

    async fn get_customer(&self, id: CustomerId) -> StoreResult<Option<Customer>> {
        let row = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row)
    }

    async fn get_customer_by_email(&self, email: &str) -> StoreResult<Option<Customer>> {
        let row = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row)
    }

    async fn list_customers(&self, page: Page) -> StoreResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id OFFSET $1 LIMIT $2"
        ))
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }

    async fn insert_customer(&self, new: NewCustomer) -> StoreResult<Customer> {
        let row = sqlx::query_as::<_, Customer>(&format!(
            "INSERT INTO customers (email, hashed_password) VALUES ($1, $2)
             RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&new.email)
        .bind(&new.hashed_password)
        .fetch_one(self.db.pool())
        .await?;
        Ok(row)
    }

    async fn get_account(&self, id: AccountId) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row)
    }

    async fn list_accounts(&self, page: Page) -> StoreResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id OFFSET $1 LIMIT $2"
        ))
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }

    async fn list_accounts_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> StoreResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE customer_id = $1 ORDER BY id"
        ))
        .bind(customer_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }

    async fn list_accounts_for_customers(
        &self,
        customer_ids: &[CustomerId],
    ) -> StoreResult<Vec<Account>> {
        if customer_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE customer_id = ANY($1) ORDER BY id"
        ))
        .bind(customer_ids.to_vec())
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }

    async fn insert_account(&self, new: NewAccount) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (balance, customer_id) VALUES ($1, $2)
             RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(new.balance)
        .bind(new.customer_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(row)
    }

    async fn begin_transfer<'a>(&'a self) -> StoreResult<Box<dyn TransferScope + 'a>> {
        let tx = self.db.pool().begin().await?;
        Ok(Box::new(PgTransferScope { tx }))
    }
}

struct PgTransferScope {
    tx: Transaction<'static, Postgres>,
}

impl PgTransferScope {
    async fn lock_one(&mut self, id: AccountId) -> StoreResult<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(row)
    }
}

#[async_trait]
impl TransferScope for PgTransferScope {
    async fn lock_pair(
        &mut self,
        first: AccountId,
        second: AccountId,
    ) -> StoreResult<(Option<Account>, Option<Account>)> {
        let (low, high) = lock_order(first, second);
        let low_row = self.lock_one(low).await?;
        let high_row = if high == low {
            low_row
        } else {
            self.lock_one(high).await?
        };

        if first <= second {
            Ok((low_row, high_row))
        } else {
            Ok((high_row, low_row))
        }
    }

    async fn set_balance(&mut self, id: AccountId, balance: MinorUnits) -> StoreResult<()> {
        sqlx::query("UPDATE accounts SET balance = $1 WHERE id = $2")
            .bind(balance)
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
