//! Application services for continuous discovery.

pub mod discovery_loop;
pub mod export;
pub mod idea_generator;
pub mod query_planner;
pub mod rate_limiter;
pub mod report;
pub mod scorer;
pub mod self_improvement;

pub use discovery_loop::{cancel_on_shutdown_signal, shutdown_signal, DiscoveryLoop, DiscoveryRunState, LoopPhase, RunSummary};
pub use export::{DiscoverySnapshot, SnapshotExporter};
pub use idea_generator::{IdeaGenerator, LearnedPatterns};
pub use query_planner::{DiscoveryParameters, QueryPlan, QueryPlanner, QUERY_CATALOG};
pub use rate_limiter::RateLimiter;
pub use report::{InsightsReport, ReportGenerator};
pub use scorer::{categorize, HeuristicScorer};
pub use self_improvement::{ImprovementReport, SelfImprovingController};
