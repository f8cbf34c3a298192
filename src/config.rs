use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::account::PasswordHashing;

/// Environment variable that overrides `storage.postgres_url`
pub const POSTGRES_URL_ENV: &str = "LEDGER_POSTGRES_URL";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: LogRotation,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub password_hashing: PasswordHashing,
}

/// Rolling policy for the log file
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Which [`LedgerStore`](crate::account::LedgerStore) backs the service
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    #[serde(default)]
    pub postgres_url: Option<String>,
    pub max_connections: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            postgres_url: None,
            max_connections: 10,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TransferConfig {
    /// Retries of a whole transfer scope after a serialization failure or deadlock
    pub max_retries: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    pub default_page_limit: i64,
    pub max_page_limit: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            default_page_limit: 100,
            max_page_limit: 1000,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", config_path))?;

        if let Ok(url) = std::env::var(POSTGRES_URL_ENV) {
            config.storage.postgres_url = Some(url);
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// PostgreSQL URL, required when the postgres backend is selected
    pub fn postgres_url(&self) -> Result<&str> {
        self.storage
            .postgres_url
            .as_deref()
            .with_context(|| format!("storage.postgres_url or {} must be set", POSTGRES_URL_ENV))
    }
}
