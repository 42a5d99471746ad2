//! Domain models for the discovery pipeline.

pub mod config;
pub mod idea;
pub mod learning;
pub mod repository;

pub use config::{
    Config, DatabaseConfig, DiscoveryConfig, GitHubConfig, LearningConfig, LoggingConfig,
    RateLimitConfig, ScoringConfig,
};
pub use idea::GeneratedIdea;
pub use learning::{
    AnalysisStatus, LearningEvent, LearningEventKind, QueryEffectivenessSample, Recommendation,
    TrendDirection,
};
pub use repository::{RepositoryRecord, ScoreField, ScoreResult, ScoredRepository};
