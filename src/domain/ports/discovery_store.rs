use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    GeneratedIdea, LearningEvent, LearningEventKind, ScoreField, ScoredRepository,
};

/// Repository trait for the persistent discovery store
///
/// Every operation is a single statement against the backing store. Scored
/// repositories are keyed by URL; rows whose serialized blob cannot be
/// decoded are skipped (and logged) rather than failing the whole read.
#[async_trait]
pub trait DiscoveryStore: Send + Sync {
    /// Insert or fully overwrite the row keyed by `repository.record.url`
    async fn upsert(&self, repository: &ScoredRepository) -> DomainResult<()>;

    /// Records discovered strictly after `since`, most recent first
    async fn query_recent(&self, since: DateTime<Utc>) -> DomainResult<Vec<ScoredRepository>>;

    /// Top records by a score column, ties broken by stars descending
    async fn query_top(&self, by: ScoreField, limit: usize) -> DomainResult<Vec<ScoredRepository>>;

    /// Most recently discovered records, newest first
    async fn latest(&self, limit: usize) -> DomainResult<Vec<ScoredRepository>>;

    /// Every stored record
    async fn all_repositories(&self) -> DomainResult<Vec<ScoredRepository>>;

    async fn count_repositories(&self) -> DomainResult<u64>;

    /// Insert a generated idea, returning its assigned id
    async fn insert_idea(&self, idea: &GeneratedIdea) -> DomainResult<i64>;

    /// Most recent ideas first
    async fn list_ideas(&self, limit: usize) -> DomainResult<Vec<GeneratedIdea>>;

    async fn count_ideas(&self) -> DomainResult<u64>;

    /// Append a learning-log entry, dropping the oldest entries of the same
    /// kind beyond `cap`
    async fn append_learning_event(&self, event: &LearningEvent, cap: usize) -> DomainResult<()>;

    /// Most recent learning-log entries of a kind, newest first
    async fn list_learning_events(
        &self,
        kind: LearningEventKind,
        limit: usize,
    ) -> DomainResult<Vec<LearningEvent>>;
}
