//! Ideas produced by template filling over learned discovery patterns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A generated product idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedIdea {
    /// Store-assigned id; `None` until inserted.
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub category: String,
    pub description: String,
    pub multiplier: f64,
    pub novelty_score: f64,
    pub market_size: u64,
    pub predicted_base_value: u64,
    pub predicted_value: u64,
    pub feasibility: String,
    pub time_to_build: String,
    pub tech_stack: Vec<String>,
    pub rationale: String,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedIdea {
    /// Ranking key used when choosing which ideas to keep.
    pub fn potential(&self) -> f64 {
        self.multiplier * self.novelty_score
    }
}
