//! Customer/account service
//!
//! Create/read operations over a [`LedgerStore`]. Translates missing records
//! into `NotFound` and duplicate emails into `Conflict`.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};

use super::models::{Account, Customer, NewAccount, NewCustomer, Page};
use super::repository::LedgerStore;
use crate::core_types::{AccountId, CustomerId, MinorUnits};
use crate::error::{LedgerError, LedgerResult};

/// Argon2 cost parameters for customer secrets
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PasswordHashing {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl PasswordHashing {
    fn build(&self) -> anyhow::Result<Argon2<'static>> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| anyhow::anyhow!("Invalid argon2 parameters: {}", e))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn LedgerStore>,
    hasher: Argon2<'static>,
}

impl AccountService {
    pub fn new(store: Arc<dyn LedgerStore>, hashing: &PasswordHashing) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            hasher: hashing.build()?,
        })
    }

    pub async fn get_customer(&self, id: CustomerId) -> LedgerResult<Customer> {
        self.store
            .get_customer(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Customer cannot be found"))
    }

    pub async fn get_customer_by_email(&self, email: &str) -> LedgerResult<Customer> {
        self.store
            .get_customer_by_email(email)
            .await?
            .ok_or_else(|| LedgerError::not_found("Customer cannot be found"))
    }

    pub async fn list_customers(&self, page: Page) -> LedgerResult<Vec<Customer>> {
        Ok(self.store.list_customers(page).await?)
    }

    /// One page of customers, each paired with its accounts
    ///
    /// Two storage round trips regardless of page size.
    pub async fn list_customers_with_accounts(
        &self,
        page: Page,
    ) -> LedgerResult<Vec<(Customer, Vec<Account>)>> {
        let customers = self.store.list_customers(page).await?;
        let ids: Vec<CustomerId> = customers.iter().map(|c| c.id).collect();

        let mut owned: HashMap<CustomerId, Vec<Account>> = HashMap::new();
        for account in self.store.list_accounts_for_customers(&ids).await? {
            owned.entry(account.customer_id).or_default().push(account);
        }

        Ok(customers
            .into_iter()
            .map(|customer| {
                let accounts = owned.remove(&customer.id).unwrap_or_default();
                (customer, accounts)
            })
            .collect())
    }

    /// Register a new customer
    ///
    /// The email is checked up front; the storage unique constraint catches
    /// a concurrent registration of the same address.
    pub async fn create_customer(&self, email: &str, password: &str) -> LedgerResult<Customer> {
        if self.store.get_customer_by_email(email).await?.is_some() {
            return Err(LedgerError::conflict("Email already registered"));
        }

        let hashed_password = self.hash_password(password).await?;
        let customer = self
            .store
            .insert_customer(NewCustomer {
                email: email.to_string(),
                hashed_password,
            })
            .await?;

        tracing::info!(customer_id = customer.id, "Customer created");
        Ok(customer)
    }

    pub async fn get_account(&self, id: AccountId) -> LedgerResult<Account> {
        self.store
            .get_account(id)
            .await?
            .ok_or_else(|| LedgerError::not_found("Account cannot be found"))
    }

    pub async fn list_accounts(&self, page: Page) -> LedgerResult<Vec<Account>> {
        Ok(self.store.list_accounts(page).await?)
    }

    pub async fn list_accounts_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> LedgerResult<Vec<Account>> {
        self.get_customer(customer_id).await?;
        Ok(self.store.list_accounts_by_customer(customer_id).await?)
    }

    /// Open an account for an existing customer with an initial deposit
    pub async fn create_account(
        &self,
        customer_id: CustomerId,
        initial_balance: MinorUnits,
    ) -> LedgerResult<Account> {
        if initial_balance < 0 {
            return Err(LedgerError::invalid_amount(
                "Initial balance must not be negative",
            ));
        }
        self.get_customer(customer_id).await?;

        let account = self
            .store
            .insert_account(NewAccount {
                customer_id,
                balance: initial_balance,
            })
            .await
            .map_err(|e| match LedgerError::from(e) {
                LedgerError::NotFound(_) => LedgerError::not_found("Customer cannot be found"),
                other => other,
            })?;

        tracing::info!(
            account_id = account.id,
            customer_id,
            balance = initial_balance,
            "Account created"
        );
        Ok(account)
    }

    async fn hash_password(&self, password: &str) -> LedgerResult<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            hasher
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(|e| LedgerError::StorageFailure(format!("Hashing task failed: {}", e)))?
        .map_err(|e| LedgerError::StorageFailure(format!("Hashing failed: {}", e)))
    }
}
