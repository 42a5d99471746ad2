//! Snapshot export of recent opportunities plus run counters.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::ScoredRepository;
use crate::domain::ports::DiscoveryStore;

/// Contents of one export file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySnapshot {
    pub exported_at: DateTime<Utc>,
    pub session_id: Uuid,
    pub session_start: DateTime<Utc>,
    pub total_scanned: u64,
    pub gems_found: u64,
    pub gems: Vec<ScoredRepository>,
}

/// `continuous_discovery_<YYYYmmdd_HHMMSS_mmm>_<seq>.json`
///
/// `sequence` keeps names unique when two exports land in the same millisecond.
pub fn snapshot_file_name(at: DateTime<Utc>, sequence: u64) -> String {
    format!(
        "continuous_discovery_{}_{:03}.json",
        at.format("%Y%m%d_%H%M%S_%3f"),
        sequence
    )
}

/// Writes snapshot files for the discovery loop
pub struct SnapshotExporter {
    store: Arc<dyn DiscoveryStore>,
    dir: PathBuf,
    limit: usize,
    sequence: AtomicU64,
}

impl SnapshotExporter {
    pub fn new(store: Arc<dyn DiscoveryStore>, dir: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            store,
            dir: dir.into(),
            limit,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Collect the most recent stored opportunities and write them with the counters.
    pub async fn export(
        &self,
        session_id: Uuid,
        session_start: DateTime<Utc>,
        total_scanned: u64,
        gems_found: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<PathBuf> {
        let gems: Vec<ScoredRepository> = self
            .store
            .latest(self.limit)
            .await?
            .into_iter()
            .filter(|g| g.score.is_opportunity)
            .collect();

        let snapshot = DiscoverySnapshot {
            exported_at: now,
            session_id,
            session_start,
            total_scanned,
            gems_found,
            gems,
        };
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        write_snapshot(&self.dir, &snapshot, sequence).await
    }
}

/// Serialize `snapshot` into `dir`, creating the directory if needed.
pub async fn write_snapshot(
    dir: &Path,
    snapshot: &DiscoverySnapshot,
    sequence: u64,
) -> DomainResult<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| DomainError::ExportFailed(format!("create {}: {e}", dir.display())))?;

    let path = dir.join(snapshot_file_name(snapshot.exported_at, sequence));
    let body = serde_json::to_vec_pretty(snapshot)?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|e| DomainError::ExportFailed(format!("write {}: {e}", path.display())))?;

    tracing::info!(path = %path.display(), gems = snapshot.gems.len(), "Exported discovery snapshot");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteDiscoveryStore};
    use crate::domain::models::RepositoryRecord;
    use crate::services::scorer::HeuristicScorer;
    use chrono::TimeZone;

    #[test]
    fn test_file_name_is_timestamped() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 7, 5, 3).unwrap() + chrono::Duration::milliseconds(42);
        assert_eq!(
            snapshot_file_name(at, 1),
            "continuous_discovery_20260309_070503_042_001.json"
        );
    }

    #[tokio::test]
    async fn test_exports_at_same_instant_do_not_overwrite() {
        let pool = create_migrated_test_pool().await.unwrap();
        let store = Arc::new(SqliteDiscoveryStore::new(pool));
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 7, 5, 3).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let exporter = SnapshotExporter::new(store, dir.path(), 10);
        let session = Uuid::new_v4();

        let first = exporter.export(session, now, 1, 0, now).await.unwrap();
        let second = exporter.export(session, now, 2, 0, now).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        let snapshot: DiscoverySnapshot =
            serde_json::from_slice(&std::fs::read(&first).unwrap()).unwrap();
        assert_eq!(snapshot.total_scanned, 1);
    }

    #[tokio::test]
    async fn test_export_writes_recent_gems_and_counters() {
        let pool = create_migrated_test_pool().await.unwrap();
        let store = Arc::new(SqliteDiscoveryStore::new(pool));
        let now = Utc.with_ymd_and_hms(2026, 3, 9, 7, 5, 3).unwrap();
        let scorer = HeuristicScorer::default();

        for i in 0..3 {
            let record = RepositoryRecord::new("octo", format!("sync-{i}"))
                .with_stars(10)
                .with_forks(1)
                .with_description("collaborative sync");
            let score = scorer.score(&record, now);
            store
                .upsert(&ScoredRepository::new(record, score, now - chrono::Duration::minutes(i)))
                .await
                .unwrap();
        }

        let dir = tempfile::tempdir().unwrap();
        let exporter = SnapshotExporter::new(store, dir.path().join("exports"), 2);
        let path = exporter
            .export(Uuid::new_v4(), now - chrono::Duration::hours(1), 90, 3, now)
            .await
            .unwrap();

        let snapshot: DiscoverySnapshot =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(snapshot.total_scanned, 90);
        assert_eq!(snapshot.gems_found, 3);
        assert_eq!(snapshot.gems.len(), 2);
        assert_eq!(snapshot.gems[0].record.name, "sync-0");
    }
}
