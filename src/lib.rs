//! Minibank - a minimal ledger service
//!
//! Customers own accounts; money moves between two accounts atomically.
//!
//! # Modules
//!
//! - [`core_types`] - Identifier and amount aliases
//! - [`error`] - Domain error taxonomy
//! - [`account`] - Storage seam, memory/PostgreSQL backends, customer/account service
//! - [`transfer`] - Transfer engine (lock, validate, write, commit)
//! - [`gateway`] - HTTP API (axum) and OpenAPI docs
//! - [`config`] / [`logging`] - YAML configuration and tracing setup

// Core types - must be first!
pub mod core_types;

pub mod account;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod transfer;

// Convenient re-exports at crate root
pub use account::{AccountService, LedgerStore, MemoryStore, PgStore};
pub use core_types::{AccountId, CustomerId, MinorUnits};
pub use error::{LedgerError, LedgerResult};
pub use transfer::{TransferEngine, TransferOutcome, TransferRequest};
