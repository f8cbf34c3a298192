//! Account-to-account transfers
//!
//! [`TransferEngine`] validates and applies a two-leg balance move inside one
//! storage transaction scope.
//!
//! # Validation order
//!
//! ```text
//! same account? ──▶ InvalidOperation
//! both exist?   ──▶ NotFound
//! amount >= 0?  ──▶ InvalidAmount
//! affordable?   ──▶ InsufficientFunds
//! debit + credit + commit
//! ```
//!
//! # Safety Invariants
//!
//! 1. **All-or-nothing**: both balances are written in one commit, or neither is
//! 2. **Conservation**: `source + destination` is unchanged by a transfer
//! 3. **Lock order**: rows are locked lower id first, so crossing transfers cannot deadlock

pub mod engine;
pub mod types;

#[cfg(test)]
mod integration_tests;

// Re-exports for convenience
pub use engine::{TransferEngine, settle};
pub use types::{TransferOutcome, TransferRequest};
