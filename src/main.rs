//! Minibank - ledger service
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌────────────────┐    ┌─────────────┐
//! │  Config  │───▶│ Gateway  │───▶│ AccountService │───▶│ LedgerStore │
//! │  (YAML)  │    │ (axum)   │    │ TransferEngine │    │ memory / pg │
//! └──────────┘    └──────────┘    └────────────────┘    └─────────────┘
//! ```
//!
//! Usage: `minibank [--env dev] [--port 8899]`

use std::sync::Arc;

use anyhow::Context;

use minibank::account::{AccountService, Database, LedgerStore, MemoryStore, PgStore};
use minibank::config::{AppConfig, StorageBackend};
use minibank::gateway::{self, AppState};
use minibank::transfer::TransferEngine;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn LedgerStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::Postgres => {
            let db = Database::connect(config.postgres_url()?, config.storage.max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db.init_schema()
                .await
                .context("Failed to initialize schema")?;
            Ok(Arc::new(PgStore::new(&db)))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = minibank::logging::init_logging(&app_config);

    tracing::info!("Starting minibank in {} mode", env);

    let store = open_store(&app_config).await?;
    let accounts = AccountService::new(store.clone(), &app_config.password_hashing)?;
    let transfers = Arc::new(TransferEngine::new(
        store.clone(),
        app_config.transfer.max_retries,
    ));
    let state = Arc::new(AppState::new(
        store,
        accounts,
        transfers,
        app_config.api.clone(),
    ));

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    gateway::run_server(&app_config.gateway.host, port, state).await
}
