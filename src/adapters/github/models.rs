//! GitHub search API response models.
//!
//! These structs map to the GitHub REST API v3 JSON payloads for
//! `/search/repositories`. They are internal to the adapter and are
//! converted into [`RepositoryRecord`]s before leaving it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::RepositoryRecord;

/// Envelope returned by `/search/repositories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSearchResponse {
    /// Total matches reported by the search index.
    #[serde(default)]
    pub total_count: u64,
    /// True when the search timed out and results may be partial.
    #[serde(default)]
    pub incomplete_results: bool,
    /// The page of matching repositories.
    #[serde(default)]
    pub items: Vec<GitHubRepository>,
}

/// A repository as returned in search results.
///
/// Every field the pipeline consumes is optional upstream; absent values
/// become zero or empty during conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepository {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub owner: Option<GitHubOwner>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

/// Owner account of a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

impl From<GitHubRepository> for RepositoryRecord {
    fn from(repo: GitHubRepository) -> Self {
        let owner = repo.owner.map(|o| o.login).unwrap_or_default();
        Self {
            owner,
            name: repo.name,
            url: repo.html_url,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            open_issues: repo.open_issues_count,
            description: repo.description.unwrap_or_default(),
            topics: repo.topics,
            language: repo.language.unwrap_or_default(),
            created_at: repo.created_at,
            pushed_at: repo.pushed_at,
        }
    }
}
