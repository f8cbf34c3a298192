//! Customer and account management module
//!
//! Storage seam, its two backends, and the thin service the gateway calls.

pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use models::{Account, Customer, NewAccount, NewCustomer, Page};
pub use postgres::PgStore;
pub use repository::{LedgerStore, StoreError, StoreResult, TransferScope};
pub use service::{AccountService, PasswordHashing};

// Re-export Database from top-level db module
pub use crate::db::Database;
