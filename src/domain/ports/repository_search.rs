use async_trait::async_trait;

use crate::domain::models::RepositoryRecord;

/// A single search request against a repository-hosting search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Full query string including qualifiers (`language:`, `stars:`)
    pub query: String,
    /// Stop after this many accumulated results
    pub max_results: usize,
    /// 1-based result page to start from
    pub page: u64,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, max_results: usize, page: u64) -> Self {
        Self {
            query: query.into(),
            max_results,
            page: page.max(1),
        }
    }
}

/// Port for repository search adapters
///
/// Implementations are pure adapters: they never consult or update a rate
/// limiter, the caller owns pacing. Upstream failures (rate limiting,
/// transport, non-success statuses, undecodable bodies) degrade to an empty
/// result after logging a warning; this method never fails.
#[async_trait]
pub trait RepositorySearch: Send + Sync {
    /// Run a paginated search and normalize results into repository records
    async fn search(&self, query: &SearchQuery) -> Vec<RepositoryRecord>;

    /// Whether the adapter carries an authentication credential
    fn is_authenticated(&self) -> bool;
}
