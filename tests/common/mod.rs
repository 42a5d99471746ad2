//! Common test utilities for integration tests
//!
//! Provides a canned search adapter and store/config fixtures shared by the
//! scenario tests.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gemscout::adapters::sqlite::{create_migrated_test_pool, SqliteDiscoveryStore};
use gemscout::{Config, RepositoryRecord, RepositorySearch, SearchQuery};

/// Search adapter that answers every query with the same records.
pub struct StubSearch {
    records: Vec<RepositoryRecord>,
    authenticated: bool,
    calls: AtomicUsize,
}

impl StubSearch {
    pub fn returning(records: Vec<RepositoryRecord>) -> Arc<Self> {
        Arc::new(Self {
            records,
            authenticated: true,
            calls: AtomicUsize::new(0),
        })
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepositorySearch for StubSearch {
    async fn search(&self, _query: &SearchQuery) -> Vec<RepositoryRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records.clone()
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// In-memory store with the schema applied.
pub async fn memory_store() -> Arc<SqliteDiscoveryStore> {
    let pool = create_migrated_test_pool().await.expect("Failed to create test pool");
    Arc::new(SqliteDiscoveryStore::new(pool))
}

/// Defaults with short delays and snapshots written to `export_dir`.
pub fn fast_config(export_dir: &Path) -> Config {
    let mut config = Config::default();
    config.discovery.query_delay_ms = 0;
    config.discovery.cycle_delay_ms = 20;
    config.discovery.queries_per_cycle = 2;
    config.discovery.export_every = 1_000;
    config.discovery.export_dir = export_dir.to_string_lossy().into_owned();
    config
}

/// Number of snapshot files in `dir`.
#[allow(dead_code)]
pub fn snapshot_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.file_name().to_string_lossy().starts_with("continuous_discovery_"))
                .count()
        })
        .unwrap_or(0)
}
