//! End-to-end runs of the discovery loop against a canned search adapter.

mod common;

use std::time::{Duration, Instant};

use common::{fast_config, memory_store, snapshot_count, StubSearch};
use gemscout::domain::models::ScoreField;
use gemscout::services::export::DiscoverySnapshot;
use gemscout::{DiscoveryLoop, DiscoveryStore, RateLimiter, RepositoryRecord};

async fn run_for(discovery: DiscoveryLoop, duration: Duration) -> gemscout::RunSummary {
    let handle = discovery.handle();
    let task = tokio::spawn(discovery.run());
    tokio::time::sleep(duration).await;
    handle.cancel();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("loop did not stop after cancellation")
        .expect("loop task panicked")
}

#[tokio::test]
async fn test_small_collaborative_repo_is_stored_as_opportunity() {
    let dir = tempfile::tempdir().unwrap();
    let store = memory_store().await;
    let search = StubSearch::returning(vec![RepositoryRecord::new("octo", "board")
        .with_stars(10)
        .with_forks(2)
        .with_description("realtime collaborative state sync")]);

    let discovery = DiscoveryLoop::new(&fast_config(dir.path()), search.clone(), store.clone()).with_seed(7);
    let summary = run_for(discovery, Duration::from_millis(100)).await;

    let stored = store.query_top(ScoreField::Opportunity, 10).await.unwrap();
    assert_eq!(stored.len(), 1);
    let gem = &stored[0];
    assert_eq!(gem.record.url, "https://github.com/octo/board");
    assert!(gem.score.is_opportunity);
    assert!(gem.score.multiplier >= 15.0, "multiplier {}", gem.score.multiplier);
    assert!(summary.gems_found >= 1);
    assert!(summary.total_scanned >= 1);
    assert!(search.calls() >= 1);
}

#[tokio::test]
async fn test_popular_repo_is_never_stored() {
    let dir = tempfile::tempdir().unwrap();
    let store = memory_store().await;
    let search = StubSearch::returning(vec![RepositoryRecord::new("big", "framework")
        .with_stars(10_000)
        .with_forks(3_000)
        .with_description("realtime collaborative memory context sync multiplayer chat")]);

    let discovery = DiscoveryLoop::new(&fast_config(dir.path()), search, store.clone());
    let summary = run_for(discovery, Duration::from_millis(100)).await;

    assert!(summary.total_scored >= 1);
    assert_eq!(summary.gems_found, 0);
    assert_eq!(store.count_repositories().await.unwrap(), 0);
}

#[tokio::test]
async fn test_interrupt_during_sleep_exports_once_and_stops_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let store = memory_store().await;
    let search = StubSearch::returning(vec![RepositoryRecord::new("octo", "sync")
        .with_stars(12)
        .with_forks(1)
        .with_description("collaborative sync")]);

    let mut config = fast_config(dir.path());
    config.discovery.query_delay_ms = 2_000;
    config.discovery.cycle_delay_ms = 5_000;
    config.discovery.queries_per_cycle = 8;

    let discovery = DiscoveryLoop::new(&config, search.clone(), store);
    let handle = discovery.handle();
    let task = tokio::spawn(discovery.run());

    tokio::time::sleep(Duration::from_millis(200)).await;
    let cancelled_at = Instant::now();
    handle.cancel();

    let summary = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("shutdown waited for the full remaining sleep")
        .unwrap();

    assert!(cancelled_at.elapsed() < Duration::from_secs(2));
    assert_eq!(summary.exports, 1);
    assert_eq!(snapshot_count(dir.path()), 1);
    assert_eq!(search.calls(), 1, "cancelled during the first query delay");

    let path = summary.last_export.expect("final export path");
    let snapshot: DiscoverySnapshot = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(snapshot.gems_found, summary.gems_found);
    assert_eq!(snapshot.gems.len(), 1);
}

#[tokio::test]
async fn test_exhausted_request_budget_waits_until_cancelled() {
    let dir = tempfile::tempdir().unwrap();
    let store = memory_store().await;
    let search = StubSearch::returning(Vec::new());

    let discovery = DiscoveryLoop::new(&fast_config(dir.path()), search.clone(), store)
        .with_rate_limiter(RateLimiter::new(1, Duration::from_secs(3_600)));
    let summary = run_for(discovery, Duration::from_millis(150)).await;

    assert_eq!(search.calls(), 1);
    assert_eq!(summary.total_scanned, 0);
    assert_eq!(summary.exports, 1);
}

#[tokio::test]
async fn test_periodic_export_every_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let store = memory_store().await;
    let search = StubSearch::returning(Vec::new());

    let mut config = fast_config(dir.path());
    config.discovery.export_every = 1;
    config.discovery.cycle_delay_ms = 50;

    let discovery = DiscoveryLoop::new(&config, search, store);
    let summary = run_for(discovery, Duration::from_millis(300)).await;

    assert!(summary.cycles >= 2);
    assert!(summary.exports >= summary.cycles);
    assert_eq!(snapshot_count(dir.path()) as u64, summary.exports);
}
