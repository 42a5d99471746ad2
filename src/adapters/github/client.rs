//! GitHub repository search client.
//!
//! Wraps `GET /search/repositories` of the GitHub REST API v3. The client is
//! a pure adapter: pacing is owned by the caller, which wraps each
//! [`RepositorySearch::search`] call with the discovery loop's rate limiter.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{GitHubConfig, RepositoryRecord};
use crate::domain::ports::{RepositorySearch, SearchQuery};

use super::models::GitHubSearchResponse;

/// Largest page size the search endpoint accepts.
pub const MAX_PER_PAGE: usize = 100;

/// HTTP client for GitHub repository search.
#[derive(Debug, Clone)]
pub struct GitHubSearchClient {
    /// The underlying HTTP client.
    http: Client,
    /// Optional personal access token or fine-grained token.
    token: Option<String>,
    /// Base URL, overridable for tests.
    api_base: String,
    user_agent: String,
    sort: String,
}

impl GitHubSearchClient {
    /// Create a new client with an optional token.
    pub fn new(config: &GitHubConfig, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            token: token.filter(|t| !t.trim().is_empty()),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            sort: config.sort.clone(),
        }
    }

    /// Build an authorized GET request for one page of search results.
    fn page_request(&self, query: &str, per_page: usize, page: u64) -> reqwest::RequestBuilder {
        let url = format!("{}/search/repositories", self.api_base);
        let mut request = self
            .http
            .get(url)
            .query(&[
                ("q", query.to_string()),
                ("sort", self.sort.clone()),
                ("order", "desc".to_string()),
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
            ])
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", &self.user_agent);

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        request
    }

    /// Fetch one page of results.
    async fn fetch_page(&self, query: &str, per_page: usize, page: u64) -> DomainResult<GitHubSearchResponse> {
        let resp = self
            .page_request(query, per_page, page)
            .send()
            .await
            .map_err(|e| DomainError::UpstreamFailed(format!("GitHub search request failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::UpstreamRateLimited(format!(
                "GitHub search returned {status}: {body}"
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::UpstreamFailed(format!(
                "GitHub search returned {status}: {body}"
            )));
        }

        resp.json::<GitHubSearchResponse>().await.map_err(|e| {
            DomainError::UpstreamFailed(format!("GitHub search parse failed: {e}"))
        })
    }

    /// Run a paginated search, stopping at `max_results` or when the
    /// endpoint has no further items.
    pub async fn try_search(&self, query: &SearchQuery) -> DomainResult<Vec<RepositoryRecord>> {
        if query.max_results == 0 {
            return Ok(Vec::new());
        }

        let per_page = query.max_results.min(MAX_PER_PAGE);
        let mut page = query.page.max(1);
        let mut records = Vec::with_capacity(query.max_results);

        loop {
            let response = self.fetch_page(&query.query, per_page, page).await?;
            let received = response.items.len();
            records.extend(response.items.into_iter().map(RepositoryRecord::from));

            if records.len() >= query.max_results || received < per_page {
                break;
            }
            page += 1;
        }

        records.truncate(query.max_results);
        Ok(records)
    }
}

#[async_trait]
impl RepositorySearch for GitHubSearchClient {
    async fn search(&self, query: &SearchQuery) -> Vec<RepositoryRecord> {
        match self.try_search(query).await {
            Ok(records) => records,
            Err(e @ DomainError::UpstreamRateLimited(_)) => {
                tracing::warn!(query = %query.query, page = query.page, error = %e, "GitHub rate limit hit, skipping query");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(query = %query.query, page = query.page, error = %e, "GitHub search failed, skipping query");
                Vec::new()
            }
        }
    }

    fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
