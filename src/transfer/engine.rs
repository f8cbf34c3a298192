//! Transfer Engine
//!
//! Runs the read-validate-write sequence for one transfer inside a
//! [`TransferScope`](crate::account::TransferScope). A scope that reports
//! contention is retried as a whole, up to `max_retries` times.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::types::{TransferOutcome, TransferRequest};
use crate::account::{LedgerStore, StoreError};
use crate::core_types::MinorUnits;
use crate::error::{LedgerError, LedgerResult};

/// Why a single attempt did not commit
enum AttemptError {
    /// Validation rejected the transfer; terminal
    Rejected(LedgerError),
    /// Storage failed; retryable only when it is contention
    Store(StoreError),
}

impl From<StoreError> for AttemptError {
    fn from(e: StoreError) -> Self {
        AttemptError::Store(e)
    }
}

/// Compute post-transfer balances
///
/// Rejects negative amounts, unaffordable amounts and credits that would
/// overflow the destination. On success the returned pair has the same sum
/// as the inputs.
pub fn settle(
    source_balance: MinorUnits,
    destination_balance: MinorUnits,
    amount: MinorUnits,
) -> LedgerResult<(MinorUnits, MinorUnits)> {
    if amount < 0 {
        return Err(LedgerError::invalid_amount(
            "Transfer amount must not be negative",
        ));
    }
    if source_balance < amount {
        return Err(LedgerError::InsufficientFunds);
    }
    let destination = destination_balance.checked_add(amount).ok_or_else(|| {
        LedgerError::invalid_amount("Transfer would overflow the destination balance")
    })?;

    Ok((source_balance - amount, destination))
}

/// Transfer Engine - validates and commits two-account transfers
pub struct TransferEngine {
    store: Arc<dyn LedgerStore>,
    max_retries: u32,
}

impl TransferEngine {
    pub fn new(store: Arc<dyn LedgerStore>, max_retries: u32) -> Self {
        Self { store, max_retries }
    }

    /// Move `req.amount` from the source account to the destination account
    ///
    /// Returns both post-transfer balances. On any error neither balance has
    /// changed.
    pub async fn transfer(&self, req: TransferRequest) -> LedgerResult<TransferOutcome> {
        if req.is_self_transfer() {
            warn!(
                account_id = req.source_account_id,
                "Rejected self-transfer"
            );
            return Err(LedgerError::invalid_operation(
                "Cannot transfer from the same account",
            ));
        }

        let mut attempt = 0;
        loop {
            match self.execute_once(req).await {
                Ok(outcome) => {
                    info!(
                        source = req.source_account_id,
                        destination = req.destination_account_id,
                        amount = req.amount,
                        source_balance = outcome.source_balance,
                        destination_balance = outcome.destination_balance,
                        "Transfer committed"
                    );
                    return Ok(outcome);
                }
                Err(AttemptError::Store(StoreError::Contention)) if attempt < self.max_retries => {
                    attempt += 1;
                    debug!(
                        source = req.source_account_id,
                        destination = req.destination_account_id,
                        attempt,
                        "Transfer contention - retrying"
                    );
                }
                Err(AttemptError::Store(e)) => {
                    error!(
                        source = req.source_account_id,
                        destination = req.destination_account_id,
                        attempts = attempt + 1,
                        error = %e,
                        "Transfer failed in storage"
                    );
                    return Err(e.into());
                }
                Err(AttemptError::Rejected(e)) => {
                    warn!(
                        source = req.source_account_id,
                        destination = req.destination_account_id,
                        amount = req.amount,
                        code = e.code(),
                        "Transfer rejected"
                    );
                    return Err(e);
                }
            }
        }
    }

    /// One scope: lock, validate, write both legs, commit.
    ///
    /// Any early return drops the scope, which rolls back.
    async fn execute_once(&self, req: TransferRequest) -> Result<TransferOutcome, AttemptError> {
        let mut scope = self.store.begin_transfer().await?;

        let (source, destination) = scope
            .lock_pair(req.source_account_id, req.destination_account_id)
            .await?;
        let (Some(source), Some(destination)) = (source, destination) else {
            return Err(AttemptError::Rejected(LedgerError::not_found(
                "One or both accounts do not exist",
            )));
        };

        let (source_balance, destination_balance) =
            settle(source.balance, destination.balance, req.amount)
                .map_err(AttemptError::Rejected)?;

        scope.set_balance(source.id, source_balance).await?;
        scope
            .set_balance(destination.id, destination_balance)
            .await?;
        scope.commit().await?;

        Ok(TransferOutcome {
            source_balance,
            destination_balance,
        })
    }
}
