//! Continuous discovery loop.
//!
//! Repeats cycles of query selection, rate-limited search, scoring and
//! storage. Every `improve_every` cycles the self-improving controller
//! revises the discovery parameters; every `export_every` cycles a snapshot
//! is written. The loop runs until its cancellation token fires, then
//! performs exactly one final export and returns a [`RunSummary`].
//!
//! State machine:
//!
//! ```text
//! Idle -> Running -> (Searching -> Scoring -> Storing)* -> [Improving] -> [Exporting] -> Running
//!                 \-> ShuttingDown -> Terminated
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::models::{
    AnalysisStatus, Config, DiscoveryConfig, LearningConfig, Recommendation, ScoreField, ScoredRepository,
};
use crate::domain::ports::{DiscoveryStore, RepositorySearch, SearchQuery};

use super::export::SnapshotExporter;
use super::idea_generator::{IdeaGenerator, LearnedPatterns};
use super::query_planner::{DiscoveryParameters, QueryPlanner};
use super::rate_limiter::RateLimiter;
use super::scorer::HeuristicScorer;
use super::self_improvement::{ImprovementReport, SelfImprovingController};

/// Stored gems sampled when learning idea patterns.
const IDEA_SAMPLE: usize = 500;

/// Lifecycle phase of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Idle,
    Running,
    Searching,
    Scoring,
    Storing,
    Improving,
    Exporting,
    ShuttingDown,
    Terminated,
}

/// Process-wide run state, owned by the loop and discarded at exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryRunState {
    pub session_id: Uuid,
    pub session_start: DateTime<Utc>,
    pub phase: LoopPhase,
    pub running: bool,
    pub cycles: u64,
    pub total_scanned: u64,
    pub total_scored: u64,
    pub gems_found: u64,
    pub store_failures: u64,
    pub exports: u64,
    pub ideas_stored: u64,
}

impl DiscoveryRunState {
    fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            session_start: Utc::now(),
            phase: LoopPhase::Idle,
            running: false,
            cycles: 0,
            total_scanned: 0,
            total_scored: 0,
            gems_found: 0,
            store_failures: 0,
            exports: 0,
            ideas_stored: 0,
        }
    }

    /// Repositories scanned per hour since the session started
    pub fn scan_rate(&self, now: DateTime<Utc>) -> f64 {
        let hours = (now - self.session_start).num_seconds() as f64 / 3_600.0;
        if hours > 0.0 {
            self.total_scanned as f64 / hours
        } else {
            0.0
        }
    }
}

/// Final counters returned when the loop terminates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub session_id: Uuid,
    pub session_start: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub cycles: u64,
    pub total_scanned: u64,
    pub total_scored: u64,
    pub gems_found: u64,
    pub exports: u64,
    pub ideas_stored: u64,
    pub last_export: Option<PathBuf>,
    pub stored_repositories: u64,
    pub stored_ideas: u64,
    pub parameters: DiscoveryParameters,
}

/// The continuous discovery loop
pub struct DiscoveryLoop {
    search: Arc<dyn RepositorySearch>,
    store: Arc<dyn DiscoveryStore>,
    scorer: HeuristicScorer,
    limiter: RateLimiter,
    planner: QueryPlanner,
    controller: SelfImprovingController,
    exporter: SnapshotExporter,
    config: DiscoveryConfig,
    learning: LearningConfig,
    params: DiscoveryParameters,
    state: DiscoveryRunState,
    last_export: Option<PathBuf>,
    cancel: CancellationToken,
    rng: StdRng,
}

impl DiscoveryLoop {
    pub fn new(config: &Config, search: Arc<dyn RepositorySearch>, store: Arc<dyn DiscoveryStore>) -> Self {
        let limiter = RateLimiter::for_credential(&config.rate_limit, search.is_authenticated());
        Self {
            limiter,
            scorer: HeuristicScorer::new(config.scoring.clone()),
            planner: QueryPlanner::new(&config.discovery),
            controller: SelfImprovingController::new(store.clone(), config.learning.clone()),
            exporter: SnapshotExporter::new(
                store.clone(),
                config.discovery.export_dir.clone(),
                config.discovery.export_limit,
            ),
            params: DiscoveryParameters::new(&config.discovery, &config.scoring, &config.learning),
            config: config.discovery.clone(),
            learning: config.learning.clone(),
            state: DiscoveryRunState::new(),
            last_export: None,
            cancel: CancellationToken::new(),
            rng: StdRng::from_entropy(),
            search,
            store,
        }
    }

    /// Use a fixed seed for query sampling and idea generation
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replace the rate limiter, e.g. with a different ceiling
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    /// Handle that stops the loop when cancelled
    pub fn handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> &DiscoveryRunState {
        &self.state
    }

    pub fn parameters(&self) -> &DiscoveryParameters {
        &self.params
    }

    /// Sleep for `duration`, returning `false` if cancelled first.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(duration) => true,
        }
    }

    /// Run cycles until cancelled.
    pub async fn run(mut self) -> RunSummary {
        self.state.running = true;
        self.state.phase = LoopPhase::Running;
        info!(
            session = %self.state.session_id,
            authenticated = self.search.is_authenticated(),
            request_limit = self.limiter.max_requests(),
            "Starting continuous discovery"
        );

        while !self.cancel.is_cancelled() {
            self.state.cycles += 1;
            let cycle = self.state.cycles;
            self.state.phase = LoopPhase::Running;

            self.run_cycle().await;
            if self.cancel.is_cancelled() {
                break;
            }

            if cycle % self.config.improve_every.max(1) == 0
                && self.state.total_scored >= self.config.min_scored_for_improve
            {
                self.improve().await;
            }

            self.log_stats();

            if cycle % self.config.export_every.max(1) == 0 {
                self.export().await;
            }

            if !self.pause(Duration::from_millis(self.config.cycle_delay_ms)).await {
                break;
            }
        }

        self.shutdown().await
    }

    /// One pass over a freshly planned set of queries.
    async fn run_cycle(&mut self) {
        let plan = self.planner.plan(&mut self.rng, &self.params, self.state.total_scanned);
        info!(
            cycle = self.state.cycles,
            queries = plan.queries.len(),
            page = plan.page,
            language = plan.language.as_deref().unwrap_or("any"),
            "Starting discovery cycle"
        );

        let count = plan.queries.len();
        for (i, query) in plan.queries.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return;
            }

            self.run_query(query).await;

            if i + 1 < count && !self.pause(Duration::from_millis(self.config.query_delay_ms)).await {
                return;
            }
        }
    }

    async fn run_query(&mut self, query: &SearchQuery) {
        self.state.phase = LoopPhase::Searching;
        if !self.limiter.wait_until_allowed(&self.cancel).await {
            return;
        }

        debug!(query = %query.query, page = query.page, "Searching");
        let records = self.search.search(query).await;
        self.limiter.record_request();
        self.state.total_scanned += records.len() as u64;

        if records.is_empty() {
            debug!(query = %query.query, "No results");
            return;
        }

        self.state.phase = LoopPhase::Scoring;
        let now = Utc::now();
        for record in records {
            let score = self.scorer.score(&record, now);
            self.state.total_scored += 1;

            if !score.is_opportunity || score.base_score < self.params.min_base_score {
                continue;
            }

            self.state.phase = LoopPhase::Storing;
            let gem = ScoredRepository::new(record, score, now);
            match self.store.upsert(&gem).await {
                Ok(()) => {
                    self.state.gems_found += 1;
                    info!(
                        repo = %gem.record.full_name(),
                        stars = gem.record.stars,
                        multiplier = gem.score.multiplier,
                        base_score = gem.score.base_score,
                        "Found gem"
                    );
                }
                Err(e) => {
                    self.state.store_failures += 1;
                    warn!(url = %gem.record.url, error = %e, "Failed to store gem, skipping");
                }
            }
            self.state.phase = LoopPhase::Scoring;
        }
    }

    async fn improve(&mut self) {
        self.state.phase = LoopPhase::Improving;
        match self.controller.run_improvement_cycle(Utc::now()).await {
            Ok(report) => {
                self.apply_improvements(&report);
                self.generate_ideas().await;
            }
            Err(e) => warn!(error = %e, "Self-improvement failed, keeping previous parameters"),
        }
    }

    fn apply_improvements(&mut self, report: &ImprovementReport) {
        if report.is_insufficient() {
            info!("Insufficient data for self-improvement, keeping previous parameters");
            return;
        }

        let step = self.learning.selectivity_step;
        if report.quality.status == AnalysisStatus::Analyzed {
            match report.quality.recommendation {
                Recommendation::ExpandSearch => self.params.expand_search(step),
                Recommendation::IncreaseSelectivity => self.params.increase_selectivity(step),
                _ => {}
            }
        }

        if let (AnalysisStatus::Analyzed, Some(min), Some(max)) = (
            report.parameters.status,
            report.parameters.suggested_min_stars,
            report.parameters.suggested_max_stars,
        ) {
            self.params.set_star_range(min, max);
        }

        self.params.learn_queries(report.new_queries.iter().cloned());

        info!(
            min_stars = self.params.min_stars,
            max_stars = self.params.max_stars,
            min_base_score = self.params.min_base_score,
            queries_per_cycle = self.params.queries_per_cycle,
            learned_queries = self.params.learned_queries.len(),
            "Discovery parameters updated"
        );
    }

    async fn generate_ideas(&mut self) {
        let gems = match self.store.query_top(ScoreField::Multiplier, IDEA_SAMPLE).await {
            Ok(gems) => gems,
            Err(e) => {
                warn!(error = %e, "Could not load gems for idea generation");
                return;
            }
        };

        let patterns = LearnedPatterns::learn(&gems);
        if patterns.successful_categories.is_empty() {
            debug!("No high-multiplier gems to learn from yet");
            return;
        }

        let ideas = IdeaGenerator::new(patterns).generate(&mut self.rng, self.config.idea_count, Utc::now());
        let mut stored = 0u64;
        for idea in ideas.iter().take(self.config.ideas_stored) {
            match self.store.insert_idea(idea).await {
                Ok(_) => stored += 1,
                Err(e) => warn!(idea = %idea.name, error = %e, "Failed to store idea"),
            }
        }
        self.state.ideas_stored += stored;
        info!(generated = ideas.len(), stored, "Generated ideas from learned patterns");
    }

    async fn export(&mut self) {
        self.state.phase = LoopPhase::Exporting;
        let result = self
            .exporter
            .export(
                self.state.session_id,
                self.state.session_start,
                self.state.total_scanned,
                self.state.gems_found,
                Utc::now(),
            )
            .await;
        match result {
            Ok(path) => {
                self.state.exports += 1;
                self.last_export = Some(path);
            }
            Err(e) => warn!(error = %e, "Snapshot export failed"),
        }
    }

    fn log_stats(&self) {
        let now = Utc::now();
        let runtime = now - self.state.session_start;
        info!(
            cycle = self.state.cycles,
            runtime_mins = runtime.num_minutes(),
            total_scanned = self.state.total_scanned,
            gems_found = self.state.gems_found,
            scan_rate = %format!("{:.1}/h", self.state.scan_rate(now)),
            "Discovery stats"
        );
    }

    async fn shutdown(mut self) -> RunSummary {
        self.state.phase = LoopPhase::ShuttingDown;
        self.state.running = false;
        info!("Shutting down gracefully");

        self.export().await;

        let stored_repositories = self.store.count_repositories().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not count stored repositories");
            0
        });
        let stored_ideas = self.store.count_ideas().await.unwrap_or_else(|e| {
            warn!(error = %e, "Could not count stored ideas");
            0
        });

        self.state.phase = LoopPhase::Terminated;
        self.log_stats();
        info!(stored_repositories, stored_ideas, "Final statistics");

        RunSummary {
            session_id: self.state.session_id,
            session_start: self.state.session_start,
            finished_at: Utc::now(),
            cycles: self.state.cycles,
            total_scanned: self.state.total_scanned,
            total_scored: self.state.total_scored,
            gems_found: self.state.gems_found,
            exports: self.state.exports,
            ideas_stored: self.state.ideas_stored,
            last_export: self.last_export,
            stored_repositories,
            stored_ideas,
            parameters: self.params,
        }
    }
}

/// Wait for SIGINT or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "Could not install SIGTERM handler, listening for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Cancel `token` when a shutdown signal arrives.
pub fn cancel_on_shutdown_signal(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            () = shutdown_signal() => {
                info!("Received shutdown signal");
                token.cancel();
            }
            () = token.cancelled() => {}
        }
    })
}
