//! Data models for customers and accounts

use sqlx::FromRow;

use crate::core_types::{AccountId, CustomerId, MinorUnits};

/// Customer record
///
/// `hashed_password` is an argon2 PHC string. It never leaves the service
/// layer; API responses are built from [`Customer`] without it.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Customer {
    pub id: CustomerId,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
}

/// Account record
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Account {
    pub id: AccountId,
    pub balance: MinorUnits,
    pub customer_id: CustomerId,
}

/// Insert payload for a customer (secret already hashed)
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub hashed_password: String,
}

/// Insert payload for an account
#[derive(Debug, Clone, Copy)]
pub struct NewAccount {
    pub customer_id: CustomerId,
    pub balance: MinorUnits,
}

/// Offset/limit window for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: offset.max(0),
            limit: limit.max(0),
        }
    }
}
