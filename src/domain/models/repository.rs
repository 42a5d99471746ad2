//! Repository records and their heuristic scores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One repository as returned by a search, normalized before scoring.
///
/// The canonical URL is the identity of the record: the store keeps at most
/// one row per URL and a rediscovery overwrites the previous row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub owner: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub stars: u64,
    #[serde(default)]
    pub forks: u64,
    #[serde(default)]
    pub open_issues: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

impl RepositoryRecord {
    /// Create a record with the identity fields set and everything else empty.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        let url = format!("https://github.com/{owner}/{name}");
        Self {
            owner,
            name,
            url,
            stars: 0,
            forks: 0,
            open_issues: 0,
            description: String::new(),
            topics: Vec::new(),
            language: String::new(),
            created_at: None,
            pushed_at: None,
        }
    }

    pub fn with_stars(mut self, stars: u64) -> Self {
        self.stars = stars;
        self
    }

    pub fn with_forks(mut self, forks: u64) -> Self {
        self.forks = forks;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_pushed_at(mut self, pushed_at: DateTime<Utc>) -> Self {
        self.pushed_at = Some(pushed_at);
        self
    }

    /// `owner/name`, used for display and log fields.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// Output of the heuristic scorer for a single repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Additive opportunity score in `0.0..=10.0`.
    pub base_score: f64,
    /// `base_score * multiplier / 10`.
    pub opportunity_score: f64,
    /// Keyword-derived value multiplier in `1.0..=50.0`.
    pub multiplier: f64,
    pub undiscovered_score: f64,
    pub activity_score: f64,
    pub pain_point_score: f64,
    pub simplicity_score: f64,
    pub novelty_score: f64,
    pub category: String,
    pub multiplier_reasons: Vec<String>,
    pub estimated_base_value: u64,
    pub projected_value: u64,
    pub is_opportunity: bool,
}

/// A repository record together with its score and discovery time, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRepository {
    #[serde(flatten)]
    pub record: RepositoryRecord,
    #[serde(flatten)]
    pub score: ScoreResult,
    pub discovered_at: DateTime<Utc>,
}

impl ScoredRepository {
    pub fn new(record: RepositoryRecord, score: ScoreResult, discovered_at: DateTime<Utc>) -> Self {
        Self {
            record,
            score,
            discovered_at,
        }
    }

    /// Star band with at least one fork; the "near-ideal" shape used by trend analysis.
    pub fn is_near_ideal(&self, min_stars: u64, max_stars: u64) -> bool {
        self.record.stars >= min_stars && self.record.stars <= max_stars && self.record.forks > 0
    }
}

/// Score column used to rank stored repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    Opportunity,
    Multiplier,
    Base,
}

impl ScoreField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Opportunity => "opportunity_score",
            Self::Multiplier => "multiplier",
            Self::Base => "base_score",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "opportunity" | "opportunity_score" => Some(Self::Opportunity),
            "multiplier" => Some(Self::Multiplier),
            "base" | "base_score" => Some(Self::Base),
            _ => None,
        }
    }
}
