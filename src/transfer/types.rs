//! Transfer request/outcome types

use crate::core_types::{AccountId, MinorUnits};

/// A request to move `amount` from one account to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    pub source_account_id: AccountId,
    pub destination_account_id: AccountId,
    pub amount: MinorUnits,
}

impl TransferRequest {
    pub fn new(
        source_account_id: AccountId,
        destination_account_id: AccountId,
        amount: MinorUnits,
    ) -> Self {
        Self {
            source_account_id,
            destination_account_id,
            amount,
        }
    }

    pub fn is_self_transfer(&self) -> bool {
        self.source_account_id == self.destination_account_id
    }
}

/// Post-transfer balances of both legs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    pub source_balance: MinorUnits,
    pub destination_balance: MinorUnits,
}
