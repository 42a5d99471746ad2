//! Observations recorded by the self-improving controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recommendation emitted by a controller analysis step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Search more broadly: more queries per cycle, lower score bar.
    ExpandSearch,
    /// Raise the quality bar for stored records.
    IncreaseSelectivity,
    /// Keep the current parameters.
    MaintainCourse,
    /// Emerging keywords were found; add queries built from them.
    AddNewQueries,
    /// Nothing new surfaced from keyword analysis.
    ContinueCurrent,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExpandSearch => "expand_search",
            Self::IncreaseSelectivity => "increase_selectivity",
            Self::MaintainCourse => "maintain_course",
            Self::AddNewQueries => "add_new_queries",
            Self::ContinueCurrent => "continue_current",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of the short-term quality score relative to the long-term one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an analysis step had enough stored data to produce a result.
///
/// `InsufficientData` is not an error: callers keep their previous parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Analyzed,
    InsufficientData,
}

/// Kind of persisted learning-log entry. The log is capped per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningEventKind {
    KeywordAnalysis,
    QualityTrend,
    ParameterSuggestion,
}

impl LearningEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeywordAnalysis => "keyword_analysis",
            Self::QualityTrend => "quality_trend",
            Self::ParameterSuggestion => "parameter_suggestion",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "keyword_analysis" => Some(Self::KeywordAnalysis),
            "quality_trend" => Some(Self::QualityTrend),
            "parameter_suggestion" => Some(Self::ParameterSuggestion),
            _ => None,
        }
    }
}

/// One controller observation over a trailing time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEffectivenessSample {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub records_observed: usize,
    pub emerging_keywords: Vec<String>,
    pub recommendation: Recommendation,
}

/// An entry in the controller's persisted learning log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningEvent {
    pub kind: LearningEventKind,
    pub recorded_at: DateTime<Utc>,
    pub sample: QueryEffectivenessSample,
    /// Step-specific details (trend scores, chosen star range, ...).
    #[serde(default)]
    pub details: serde_json::Value,
}

impl LearningEvent {
    pub fn new(kind: LearningEventKind, sample: QueryEffectivenessSample) -> Self {
        Self {
            kind,
            recorded_at: sample.window_end,
            sample,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_serializes_snake_case() {
        let json = serde_json::to_string(&Recommendation::IncreaseSelectivity).unwrap();
        assert_eq!(json, "\"increase_selectivity\"");
        assert_eq!(Recommendation::ExpandSearch.to_string(), "expand_search");
    }

    #[test]
    fn test_event_kind_round_trip() {
        for kind in [
            LearningEventKind::KeywordAnalysis,
            LearningEventKind::QualityTrend,
            LearningEventKind::ParameterSuggestion,
        ] {
            assert_eq!(LearningEventKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(LearningEventKind::from_str("bogus"), None);
    }
}
