//! Ledger Error Types
//!
//! Every service and engine operation returns [`LedgerError`]. The gateway
//! matches on the kind to pick the HTTP status.

use thiserror::Error;

use crate::account::StoreError;

/// Ledger error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InvalidOperation(String),

    #[error("{0}")]
    InvalidAmount(String),

    #[error("Insufficient balance for the transfer")]
    InsufficientFunds,

    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl LedgerError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        LedgerError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        LedgerError::Conflict(msg.into())
    }

    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        LedgerError::InvalidOperation(msg.into())
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        LedgerError::InvalidAmount(msg.into())
    }

    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::Conflict(_) => "CONFLICT",
            LedgerError::InvalidOperation(_) => "INVALID_OPERATION",
            LedgerError::InvalidAmount(_) => "INVALID_AMOUNT",
            LedgerError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            LedgerError::StorageFailure(_) => "STORAGE_FAILURE",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::InvalidOperation(_) | LedgerError::InvalidAmount(_) => 400,
            LedgerError::NotFound(_) => 404,
            LedgerError::Conflict(_) => 409,
            LedgerError::InsufficientFunds => 422,
            LedgerError::StorageFailure(_) => 500,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(what) => {
                LedgerError::Conflict(format!("{} already registered", what))
            }
            StoreError::MissingReference(what) => {
                LedgerError::NotFound(format!("Referenced {} cannot be found", what))
            }
            other => LedgerError::StorageFailure(other.to_string()),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
