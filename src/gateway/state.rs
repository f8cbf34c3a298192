use std::sync::Arc;

use crate::account::{AccountService, LedgerStore, Page};
use crate::config::ApiConfig;
use crate::transfer::TransferEngine;

use super::types::ListParams;

/// Gateway application state (shared)
#[derive(Clone)]
pub struct AppState {
    /// Customer and account operations
    pub accounts: AccountService,
    /// Transfer engine
    pub transfers: Arc<TransferEngine>,
    /// Backing store, used by the health probe
    pub store: Arc<dyn LedgerStore>,
    /// Pagination limits
    pub api: ApiConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        accounts: AccountService,
        transfers: Arc<TransferEngine>,
        api: ApiConfig,
    ) -> Self {
        Self {
            accounts,
            transfers,
            store,
            api,
        }
    }

    /// Resolve `?skip=&limit=` against the configured default and cap
    pub fn page(&self, params: &ListParams) -> Page {
        let limit = params
            .limit
            .unwrap_or(self.api.default_page_limit)
            .min(self.api.max_page_limit);
        Page::new(params.skip.unwrap_or(0), limit)
    }
}
