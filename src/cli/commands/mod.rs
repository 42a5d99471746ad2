//! CLI command implementations.

pub mod ideas;
pub mod improve;
pub mod recent;
pub mod report;
pub mod run;
pub mod status;
pub mod top;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::adapters::sqlite::{database_url, initialize_database, PoolConfig, SqliteDiscoveryStore};
use crate::domain::models::Config;

/// Settings shared by every command.
pub struct CommandContext {
    pub config: Config,
    pub token: Option<String>,
    pub json: bool,
}

impl CommandContext {
    pub fn new(config: Config, token: Option<String>, json: bool) -> Self {
        Self {
            config,
            token: token.filter(|t| !t.trim().is_empty()),
            json,
        }
    }

    /// Open the configured database, applying migrations.
    pub async fn open_store(&self) -> Result<Arc<SqliteDiscoveryStore>> {
        let url = database_url(&self.config.database.path);
        let pool = initialize_database(&url, Some(PoolConfig::from(&self.config.database)))
            .await
            .with_context(|| format!("Failed to open discovery store at {}", self.config.database.path))?;
        Ok(Arc::new(SqliteDiscoveryStore::new(pool)))
    }
}
