//! Per-cycle query selection.
//!
//! Each cycle samples a bounded set of queries from the fixed catalog plus
//! whatever the controller has learned, optionally narrows them to one
//! language, appends the current star-range qualifier and picks a result
//! page that rotates as the cumulative scanned count grows.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::models::{DiscoveryConfig, LearningConfig, ScoringConfig};
use crate::domain::ports::SearchQuery;

/// Fixed query catalog, grouped by the kind of repository it tends to surface.
pub const QUERY_CATALOG: &[&str] = &[
    // performance pain points
    "slow vector search",
    "high latency embeddings",
    "vector database performance",
    "optimize vector search",
    "vector search slow",
    "embedding latency",
    // agent memory
    "AI agent memory",
    "chatbot forgets context",
    "chatbot memory",
    "persistent agent memory",
    "AI memory retrieval",
    "agent context retention",
    // retrieval pipelines
    "real-time RAG",
    "RAG performance",
    "RAG latency",
    "fast RAG",
    "semantic search speed",
    "document retrieval slow",
    // alternative implementations
    "pinecone alternative",
    "weaviate performance",
    "qdrant slow",
    "chromadb performance",
    "redis vector",
    "sqlite embeddings",
    // use cases
    "code assistant memory",
    "customer support chatbot",
    "conversational AI memory",
    "recommendation engine speed",
    // collaborative and realtime
    "realtime collaborative",
    "chat memory",
    "collaborative editor",
    "websocket realtime",
];

/// Discovery parameters consumed every cycle and revised by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryParameters {
    pub min_stars: u64,
    pub max_stars: u64,
    /// Records below this base score are not stored even if they are opportunities
    pub min_base_score: f64,
    /// Lower bound for `min_base_score`
    pub base_score_floor: f64,
    pub queries_per_cycle: usize,
    pub max_queries_per_cycle: usize,
    /// Controller-generated queries, oldest first
    pub learned_queries: Vec<String>,
    pub max_learned_queries: usize,
}

impl DiscoveryParameters {
    pub fn new(discovery: &DiscoveryConfig, scoring: &ScoringConfig, learning: &LearningConfig) -> Self {
        Self {
            min_stars: discovery.min_stars,
            max_stars: discovery.max_stars,
            min_base_score: scoring.opportunity_threshold,
            base_score_floor: scoring.opportunity_threshold,
            queries_per_cycle: discovery.queries_per_cycle.max(1),
            max_queries_per_cycle: discovery.max_queries_per_cycle.max(discovery.queries_per_cycle),
            learned_queries: Vec::new(),
            max_learned_queries: learning.max_learned_queries,
        }
    }

    /// Search more broadly: two more queries per cycle and a lower score bar.
    pub fn expand_search(&mut self, step: f64) {
        self.queries_per_cycle = (self.queries_per_cycle + 2).min(self.max_queries_per_cycle);
        self.min_base_score = (self.min_base_score - step).max(self.base_score_floor);
    }

    /// Raise the score bar for stored records.
    pub fn increase_selectivity(&mut self, step: f64) {
        self.min_base_score = (self.min_base_score + step).min(10.0);
    }

    /// Adopt a suggested star range; an empty range is ignored.
    pub fn set_star_range(&mut self, min_stars: u64, max_stars: u64) {
        if min_stars < max_stars {
            self.min_stars = min_stars;
            self.max_stars = max_stars;
        }
    }

    /// Add learned queries, dropping duplicates and the oldest beyond the cap.
    pub fn learn_queries(&mut self, queries: impl IntoIterator<Item = String>) {
        for query in queries {
            let is_known = QUERY_CATALOG.iter().any(|q| q.eq_ignore_ascii_case(&query))
                || self.learned_queries.iter().any(|q| q.eq_ignore_ascii_case(&query));
            if !is_known {
                self.learned_queries.push(query);
            }
        }
        if self.learned_queries.len() > self.max_learned_queries {
            let excess = self.learned_queries.len() - self.max_learned_queries;
            self.learned_queries.drain(..excess);
        }
    }
}

/// The queries one cycle will issue, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub queries: Vec<SearchQuery>,
    /// Language filter drawn for this cycle, if any
    pub language: Option<String>,
    pub page: u64,
}

/// Builds each cycle's [`QueryPlan`]
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    languages: Vec<String>,
    results_per_query: usize,
    page_count: u64,
    scanned_per_page: u64,
}

impl QueryPlanner {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            languages: config.languages.clone(),
            results_per_query: config.results_per_query,
            page_count: config.page_count.max(1),
            scanned_per_page: config.scanned_per_page.max(1),
        }
    }

    /// 1-based page derived from the cumulative scanned count
    pub fn page_for(&self, total_scanned: u64) -> u64 {
        (total_scanned / self.scanned_per_page) % self.page_count + 1
    }

    pub fn plan<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        params: &DiscoveryParameters,
        total_scanned: u64,
    ) -> QueryPlan {
        let candidates: Vec<&str> = QUERY_CATALOG
            .iter()
            .copied()
            .chain(params.learned_queries.iter().map(String::as_str))
            .collect();

        let language = self
            .languages
            .choose(rng)
            .filter(|lang| !lang.is_empty())
            .cloned();
        let page = self.page_for(total_scanned);

        let queries = candidates
            .choose_multiple(rng, params.queries_per_cycle.min(candidates.len()))
            .map(|base| {
                let mut query = (*base).to_string();
                if let Some(lang) = &language {
                    query.push_str(&format!(" language:{lang}"));
                }
                query.push_str(&format!(" stars:{}..{}", params.min_stars, params.max_stars));
                SearchQuery::new(query, self.results_per_query, page)
            })
            .collect();

        QueryPlan {
            queries,
            language,
            page,
        }
    }
}
