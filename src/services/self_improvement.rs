//! Self-improving controller.
//!
//! Reads stored discoveries and runs three independent analysis steps:
//! keyword trends over the last day, quality trends across three trailing
//! windows, and a star-range suggestion over all records. Each step appends
//! a capped entry to the learning log and returns a recommendation. Too
//! little data is reported as [`AnalysisStatus::InsufficientData`], never as
//! an error; the caller then keeps its previous parameters.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    AnalysisStatus, LearningConfig, LearningEvent, LearningEventKind, QueryEffectivenessSample,
    Recommendation, ScoredRepository, TrendDirection,
};
use crate::domain::ports::DiscoveryStore;

/// Phrase patterns combined with learned keywords to build new queries.
const QUERY_PATTERNS: &[&str] = &[
    "{keyword} performance",
    "{keyword} slow",
    "{keyword} optimize",
    "{keyword} latency",
    "fast {keyword}",
    "{keyword} speed up",
    "improve {keyword}",
    "{keyword} bottleneck",
];

/// Star-count buckets for the parameter suggestion: (label, min, max, upper bound exclusive).
const STAR_BUCKETS: &[(&str, u64, u64)] = &[
    ("0-4", 0, 4),
    ("5-24", 5, 24),
    ("25-49", 25, 49),
    ("50-99", 50, 99),
    ("100+", 100, 500),
];

const KEYWORD_CANDIDATES: usize = 20;
const KEYWORDS_SURFACED: usize = 10;
const MIN_KEYWORD_LEN: usize = 5;
const MIN_KEYWORD_COUNT: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    pub status: AnalysisStatus,
    pub records_analyzed: usize,
    pub top_performers: usize,
    pub emerging_keywords: Vec<String>,
    pub recommendation: Recommendation,
}

/// Aggregates for one trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub label: String,
    pub hours: i64,
    pub total: usize,
    pub near_ideal: usize,
    pub avg_multiplier: f64,
    pub avg_stars: f64,
    /// `avg_multiplier * near_ideal / max(total, 1)`
    pub quality_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityTrend {
    pub status: AnalysisStatus,
    pub direction: TrendDirection,
    pub last_12h: WindowStats,
    pub last_24h: WindowStats,
    pub last_7d: WindowStats,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarBucket {
    pub label: String,
    pub min_stars: u64,
    pub max_stars: u64,
    pub count: usize,
    pub with_forks: usize,
    pub avg_multiplier: f64,
    /// Fraction of records in the bucket with at least one fork
    pub quality_ratio: f64,
}

impl StarBucket {
    fn strength(&self) -> f64 {
        self.quality_ratio * self.avg_multiplier
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSuggestion {
    pub status: AnalysisStatus,
    pub best_bucket: Option<StarBucket>,
    pub suggested_min_stars: Option<u64>,
    pub suggested_max_stars: Option<u64>,
    pub buckets: Vec<StarBucket>,
}

/// Result of one full controller run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImprovementReport {
    pub recorded_at: DateTime<Utc>,
    pub keywords: KeywordAnalysis,
    pub quality: QualityTrend,
    pub parameters: ParameterSuggestion,
    pub new_queries: Vec<String>,
    pub learning_cycles_completed: usize,
}

impl ImprovementReport {
    /// True when no step produced anything the loop could act on
    pub fn is_insufficient(&self) -> bool {
        self.keywords.status == AnalysisStatus::InsufficientData
            && self.quality.status == AnalysisStatus::InsufficientData
            && self.parameters.status == AnalysisStatus::InsufficientData
    }
}

/// Compare the short-term quality score against the long-term one.
pub fn classify_trend(short_term: f64, long_term: f64) -> TrendDirection {
    if short_term > long_term {
        TrendDirection::Improving
    } else if short_term < long_term {
        TrendDirection::Declining
    } else {
        TrendDirection::Stable
    }
}

/// Declining quality raises the bar; a thin recent near-ideal count broadens the search.
pub fn quality_recommendation(
    direction: TrendDirection,
    near_ideal_12h: usize,
    expand_below: u64,
) -> Recommendation {
    if direction == TrendDirection::Declining {
        Recommendation::IncreaseSelectivity
    } else if (near_ideal_12h as u64) < expand_below {
        Recommendation::ExpandSearch
    } else {
        Recommendation::MaintainCourse
    }
}

/// Bucket maximizing `quality_ratio * avg_multiplier`; the first wins ties.
pub fn pick_best_bucket(buckets: &[StarBucket]) -> Option<&StarBucket> {
    let mut best: Option<&StarBucket> = None;
    for bucket in buckets {
        if best.map_or(true, |current| bucket.strength() > current.strength()) {
            best = Some(bucket);
        }
    }
    best
}

/// Group records into the fixed star buckets; empty buckets are omitted.
pub fn star_buckets(records: &[ScoredRepository]) -> Vec<StarBucket> {
    STAR_BUCKETS
        .iter()
        .enumerate()
        .filter_map(|(i, (label, min, max))| {
            let is_last = i + 1 == STAR_BUCKETS.len();
            let members: Vec<&ScoredRepository> = records
                .iter()
                .filter(|r| r.record.stars >= *min && (is_last || r.record.stars <= *max))
                .collect();
            if members.is_empty() {
                return None;
            }

            let count = members.len();
            let with_forks = members.iter().filter(|r| r.record.forks > 0).count();
            let avg_multiplier = members.iter().map(|r| r.score.multiplier).sum::<f64>() / count as f64;
            Some(StarBucket {
                label: (*label).to_string(),
                min_stars: *min,
                max_stars: *max,
                count,
                with_forks,
                avg_multiplier: round_to(avg_multiplier, 1),
                quality_ratio: round_to(with_forks as f64 / count as f64, 2),
            })
        })
        .collect()
}

/// Frequent long tokens in the descriptions and topics of `records`.
pub fn emerging_keywords(records: &[ScoredRepository]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for repo in records {
        let tokens = repo
            .record
            .description
            .split_whitespace()
            .chain(repo.record.topics.iter().map(String::as_str))
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '-').to_lowercase())
            .filter(|t| !t.is_empty());
        for token in tokens {
            *counts.entry(token).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(KEYWORD_CANDIDATES)
        .filter(|(token, count)| token.chars().count() >= MIN_KEYWORD_LEN && *count >= MIN_KEYWORD_COUNT)
        .map(|(token, _)| token)
        .take(KEYWORDS_SURFACED)
        .collect()
}

/// Fill the phrase patterns with keywords, one pattern per keyword in rotation.
pub fn queries_from_keywords(keywords: &[String], count: usize) -> Vec<String> {
    keywords
        .iter()
        .take(count)
        .enumerate()
        .map(|(i, keyword)| QUERY_PATTERNS[i % QUERY_PATTERNS.len()].replace("{keyword}", keyword))
        .collect()
}

fn window_stats(label: &str, hours: i64, records: &[ScoredRepository], config: &LearningConfig) -> WindowStats {
    let total = records.len();
    let near_ideal = records
        .iter()
        .filter(|r| r.is_near_ideal(config.near_ideal_min_stars, config.near_ideal_max_stars))
        .count();
    let (avg_multiplier, avg_stars) = if total == 0 {
        (0.0, 0.0)
    } else {
        (
            records.iter().map(|r| r.score.multiplier).sum::<f64>() / total as f64,
            records.iter().map(|r| r.record.stars as f64).sum::<f64>() / total as f64,
        )
    };

    WindowStats {
        label: label.to_string(),
        hours,
        total,
        near_ideal,
        avg_multiplier: round_to(avg_multiplier, 1),
        avg_stars: round_to(avg_stars, 1),
        quality_score: round_to(avg_multiplier * near_ideal as f64 / total.max(1) as f64, 2),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Feedback controller over the discovery store
pub struct SelfImprovingController {
    store: Arc<dyn DiscoveryStore>,
    config: LearningConfig,
}

impl SelfImprovingController {
    pub fn new(store: Arc<dyn DiscoveryStore>, config: LearningConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &LearningConfig {
        &self.config
    }

    async fn record(
        &self,
        kind: LearningEventKind,
        sample: QueryEffectivenessSample,
        details: serde_json::Value,
    ) -> DomainResult<()> {
        let event = LearningEvent::new(kind, sample).with_details(details);
        self.store.append_learning_event(&event, self.config.history_cap).await
    }

    /// Emerging keywords among the top quartile of the last day's records
    pub async fn analyze_keyword_trends(&self, now: DateTime<Utc>) -> DomainResult<KeywordAnalysis> {
        let since = now - Duration::hours(24);
        let mut recent = self.store.query_recent(since).await?;
        recent.sort_by(|a, b| {
            b.score
                .multiplier
                .total_cmp(&a.score.multiplier)
                .then_with(|| b.score.opportunity_score.total_cmp(&a.score.opportunity_score))
        });

        let analysis = if recent.is_empty() {
            KeywordAnalysis {
                status: AnalysisStatus::InsufficientData,
                records_analyzed: 0,
                top_performers: 0,
                emerging_keywords: Vec::new(),
                recommendation: Recommendation::ContinueCurrent,
            }
        } else {
            let top = &recent[..(recent.len() / 4).max(1)];
            let keywords = emerging_keywords(top);
            KeywordAnalysis {
                status: AnalysisStatus::Analyzed,
                records_analyzed: recent.len(),
                top_performers: top.len(),
                recommendation: if keywords.is_empty() {
                    Recommendation::ContinueCurrent
                } else {
                    Recommendation::AddNewQueries
                },
                emerging_keywords: keywords,
            }
        };

        let sample = QueryEffectivenessSample {
            window_start: since,
            window_end: now,
            records_observed: analysis.records_analyzed,
            emerging_keywords: analysis.emerging_keywords.clone(),
            recommendation: analysis.recommendation,
        };
        self.record(
            LearningEventKind::KeywordAnalysis,
            sample,
            json!({
                "status": analysis.status,
                "top_performers": analysis.top_performers,
            }),
        )
        .await?;

        Ok(analysis)
    }

    /// Quality scores over the last 12h, 24h and 7d, and the resulting trend
    pub async fn analyze_quality_trends(&self, now: DateTime<Utc>) -> DomainResult<QualityTrend> {
        let week_start = now - Duration::days(7);
        let week = self.store.query_recent(week_start).await?;

        let within = |hours: i64| -> Vec<ScoredRepository> {
            let since = now - Duration::hours(hours);
            week.iter().filter(|r| r.discovered_at > since).cloned().collect()
        };

        let last_12h = window_stats("last_12h", 12, &within(12), &self.config);
        let last_24h = window_stats("last_24h", 24, &within(24), &self.config);
        let last_7d = window_stats("last_7d", 168, &week, &self.config);

        let status = if week.is_empty() {
            AnalysisStatus::InsufficientData
        } else {
            AnalysisStatus::Analyzed
        };
        let direction = classify_trend(last_24h.quality_score, last_7d.quality_score);
        let recommendation = match status {
            AnalysisStatus::Analyzed => {
                quality_recommendation(direction, last_12h.near_ideal, self.config.expand_below_near_ideal)
            }
            AnalysisStatus::InsufficientData => Recommendation::MaintainCourse,
        };

        let sample = QueryEffectivenessSample {
            window_start: week_start,
            window_end: now,
            records_observed: last_7d.total,
            emerging_keywords: Vec::new(),
            recommendation,
        };
        self.record(
            LearningEventKind::QualityTrend,
            sample,
            json!({
                "status": status,
                "trend": direction,
                "quality_score_24h": last_24h.quality_score,
                "quality_score_7d": last_7d.quality_score,
                "near_ideal_12h": last_12h.near_ideal,
            }),
        )
        .await?;

        Ok(QualityTrend {
            status,
            direction,
            last_12h,
            last_24h,
            last_7d,
            recommendation,
        })
    }

    /// Best star range over all stored records
    pub async fn suggest_parameters(&self, now: DateTime<Utc>) -> DomainResult<ParameterSuggestion> {
        let all = self.store.all_repositories().await?;
        let buckets = star_buckets(&all);
        let best_bucket = pick_best_bucket(&buckets).cloned();

        let suggestion = ParameterSuggestion {
            status: if best_bucket.is_some() {
                AnalysisStatus::Analyzed
            } else {
                AnalysisStatus::InsufficientData
            },
            suggested_min_stars: best_bucket.as_ref().map(|b| b.min_stars),
            suggested_max_stars: best_bucket.as_ref().map(|b| b.max_stars),
            best_bucket,
            buckets,
        };

        let window_start = all.iter().map(|r| r.discovered_at).min().unwrap_or(now);
        let sample = QueryEffectivenessSample {
            window_start,
            window_end: now,
            records_observed: all.len(),
            emerging_keywords: Vec::new(),
            recommendation: Recommendation::MaintainCourse,
        };
        self.record(
            LearningEventKind::ParameterSuggestion,
            sample,
            json!({
                "status": suggestion.status,
                "best_range": suggestion.best_bucket.as_ref().map(|b| b.label.clone()),
                "quality_ratio": suggestion.best_bucket.as_ref().map(|b| b.quality_ratio),
            }),
        )
        .await?;

        Ok(suggestion)
    }

    /// Queries built from the keywords of the latest analysis that saw data.
    ///
    /// An analysis with no emerging keywords clears them; one without any
    /// records leaves the previous set in place.
    pub async fn generate_queries(&self, count: usize) -> DomainResult<Vec<String>> {
        let events = self
            .store
            .list_learning_events(LearningEventKind::KeywordAnalysis, self.config.history_cap)
            .await?;
        let keywords = events
            .iter()
            .find(|e| e.sample.records_observed > 0)
            .map(|e| e.sample.emerging_keywords.clone())
            .unwrap_or_default();
        Ok(queries_from_keywords(&keywords, count))
    }

    /// Run every analysis step in sequence
    pub async fn run_improvement_cycle(&self, now: DateTime<Utc>) -> DomainResult<ImprovementReport> {
        let keywords = self.analyze_keyword_trends(now).await?;
        let quality = self.analyze_quality_trends(now).await?;
        let parameters = self.suggest_parameters(now).await?;
        let new_queries = self.generate_queries(self.config.generated_queries).await?;
        let learning_cycles_completed = self
            .store
            .list_learning_events(LearningEventKind::KeywordAnalysis, self.config.history_cap)
            .await?
            .len();

        tracing::info!(
            trend = %quality.direction,
            recommendation = %quality.recommendation,
            emerging = keywords.emerging_keywords.len(),
            best_range = parameters.best_bucket.as_ref().map(|b| b.label.as_str()).unwrap_or("-"),
            "Self-improvement cycle complete"
        );

        Ok(ImprovementReport {
            recorded_at: now,
            keywords,
            quality,
            parameters,
            new_queries,
            learning_cycles_completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteDiscoveryStore};
    use crate::domain::models::{RepositoryRecord, ScoreResult};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn repo(name: &str, stars: u64, forks: u64, multiplier: f64, hours_ago: i64) -> ScoredRepository {
        let record = RepositoryRecord::new("octo", name)
            .with_stars(stars)
            .with_forks(forks)
            .with_description("realtime websocket session manager");
        let score = ScoreResult {
            base_score: 5.0,
            opportunity_score: 5.0 * multiplier / 10.0,
            multiplier,
            undiscovered_score: 3.0,
            activity_score: 0.0,
            pain_point_score: 0.0,
            simplicity_score: 0.0,
            novelty_score: 0.0,
            category: "Real-time".to_string(),
            multiplier_reasons: Vec::new(),
            estimated_base_value: 1_000,
            projected_value: 1_000,
            is_opportunity: true,
        };
        ScoredRepository::new(record, score, now() - Duration::hours(hours_ago))
    }

    fn bucket(label: &str, min: u64, max: u64, ratio: f64, mult: f64) -> StarBucket {
        StarBucket {
            label: label.to_string(),
            min_stars: min,
            max_stars: max,
            count: 4,
            with_forks: 0,
            avg_multiplier: mult,
            quality_ratio: ratio,
        }
    }

    async fn controller_with(repos: &[ScoredRepository]) -> (SelfImprovingController, Arc<SqliteDiscoveryStore>) {
        let pool = create_migrated_test_pool().await.unwrap();
        let store = Arc::new(SqliteDiscoveryStore::new(pool));
        for r in repos {
            store.upsert(r).await.unwrap();
        }
        (
            SelfImprovingController::new(store.clone(), LearningConfig::default()),
            store,
        )
    }

    #[test]
    fn test_classify_trend() {
        assert_eq!(classify_trend(3.0, 1.0), TrendDirection::Improving);
        assert_eq!(classify_trend(1.0, 3.0), TrendDirection::Declining);
        assert_eq!(classify_trend(2.0, 2.0), TrendDirection::Stable);
    }

    #[test]
    fn test_quality_recommendation() {
        assert_eq!(
            quality_recommendation(TrendDirection::Declining, 50, 5),
            Recommendation::IncreaseSelectivity
        );
        assert_eq!(
            quality_recommendation(TrendDirection::Improving, 2, 5),
            Recommendation::ExpandSearch
        );
        assert_eq!(
            quality_recommendation(TrendDirection::Stable, 5, 5),
            Recommendation::MaintainCourse
        );
    }

    #[test]
    fn test_best_bucket_is_the_strong_one() {
        let buckets = vec![
            bucket("0-4", 0, 4, 0.0, 0.0),
            bucket("5-24", 5, 24, 0.0, 0.0),
            bucket("25-49", 25, 49, 1.0, 50.0),
            bucket("50-99", 50, 99, 0.0, 0.0),
            bucket("100+", 100, 500, 0.0, 0.0),
        ];
        let best = pick_best_bucket(&buckets).unwrap();
        assert_eq!((best.min_stars, best.max_stars), (25, 49));
        assert!(pick_best_bucket(&[]).is_none());
    }

    #[test]
    fn test_star_buckets_group_records() {
        let records = vec![
            repo("a", 2, 0, 10.0, 1),
            repo("b", 30, 1, 20.0, 1),
            repo("c", 40, 0, 10.0, 1),
            repo("d", 900, 3, 8.0, 1),
        ];
        let buckets = star_buckets(&records);
        let labels: Vec<_> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["0-4", "25-49", "100+"]);
        assert_eq!(buckets[1].count, 2);
        assert_eq!(buckets[1].quality_ratio, 0.5);
        assert_eq!(buckets[1].avg_multiplier, 15.0);
    }

    #[test]
    fn test_emerging_keywords_filter_noise() {
        let mut a = repo("a", 10, 1, 20.0, 1);
        a.record.description = "Realtime sync for a chat".to_string();
        a.record.topics = vec!["websocket".to_string()];
        let mut b = repo("b", 10, 1, 20.0, 1);
        b.record.description = "realtime, sync engine".to_string();
        b.record.topics = vec!["websocket".to_string()];

        let keywords = emerging_keywords(&[a, b]);
        assert_eq!(keywords, vec!["realtime", "websocket"]);
    }

    #[test]
    fn test_queries_rotate_patterns() {
        let keywords = vec!["sessions".to_string(), "websocket".to_string()];
        assert_eq!(
            queries_from_keywords(&keywords, 5),
            vec!["sessions performance", "websocket slow"]
        );
    }

    #[tokio::test]
    async fn test_empty_store_is_insufficient() {
        let (controller, store) = controller_with(&[]).await;
        let report = controller.run_improvement_cycle(now()).await.unwrap();

        assert!(report.is_insufficient());
        assert!(report.new_queries.is_empty());
        assert_eq!(
            store
                .list_learning_events(LearningEventKind::QualityTrend, 10)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_quality_improving_when_recent_day_is_better() {
        let mut repos: Vec<_> = (0..5).map(|i| repo(&format!("new{i}"), 20, 2, 20.0, 2)).collect();
        repos.extend((0..5).map(|i| repo(&format!("old{i}"), 2000, 0, 5.0, 72)));
        let (controller, _) = controller_with(&repos).await;

        let trend = controller.analyze_quality_trends(now()).await.unwrap();
        assert_eq!(trend.status, AnalysisStatus::Analyzed);
        assert!(trend.last_24h.quality_score > trend.last_7d.quality_score);
        assert_eq!(trend.direction, TrendDirection::Improving);
        assert_eq!(trend.recommendation, Recommendation::MaintainCourse);
    }

    #[tokio::test]
    async fn test_quality_declining_raises_selectivity() {
        let mut repos: Vec<_> = (0..5).map(|i| repo(&format!("new{i}"), 2000, 0, 5.0, 2)).collect();
        repos.extend((0..5).map(|i| repo(&format!("old{i}"), 20, 2, 20.0, 72)));
        let (controller, _) = controller_with(&repos).await;

        let trend = controller.analyze_quality_trends(now()).await.unwrap();
        assert_eq!(trend.direction, TrendDirection::Declining);
        assert_eq!(trend.recommendation, Recommendation::IncreaseSelectivity);
    }

    #[tokio::test]
    async fn test_quality_stable_with_thin_recent_data_expands() {
        let repos = vec![repo("only", 20, 2, 20.0, 2)];
        let (controller, _) = controller_with(&repos).await;

        let trend = controller.analyze_quality_trends(now()).await.unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.recommendation, Recommendation::ExpandSearch);
    }

    #[tokio::test]
    async fn test_keyword_analysis_feeds_query_generation() {
        let repos: Vec<_> = (0..8).map(|i| repo(&format!("r{i}"), 20, 2, 20.0, 1)).collect();
        let (controller, _) = controller_with(&repos).await;

        let report = controller.run_improvement_cycle(now()).await.unwrap();

        assert_eq!(report.keywords.status, AnalysisStatus::Analyzed);
        assert_eq!(report.keywords.top_performers, 2);
        assert_eq!(report.keywords.recommendation, Recommendation::AddNewQueries);
        assert_eq!(
            report.keywords.emerging_keywords,
            vec!["manager", "realtime", "session", "websocket"]
        );
        assert_eq!(report.new_queries[0], "manager performance");
        assert_eq!(report.new_queries.len(), 4);
        assert_eq!(report.learning_cycles_completed, 1);
        assert_eq!(report.parameters.suggested_min_stars, Some(5));
        assert_eq!(report.parameters.suggested_max_stars, Some(24));
    }

    #[tokio::test]
    async fn test_query_keywords_follow_latest_analysis() {
        let repos: Vec<_> = (0..8).map(|i| repo(&format!("r{i}"), 20, 2, 20.0, 1)).collect();
        let (controller, store) = controller_with(&repos).await;

        controller.analyze_keyword_trends(now()).await.unwrap();
        assert_eq!(
            controller.generate_queries(2).await.unwrap(),
            vec!["manager performance", "realtime slow"]
        );

        // A day with no records keeps the learned keywords.
        let later = now() + Duration::days(3);
        controller.analyze_keyword_trends(later).await.unwrap();
        assert_eq!(controller.generate_queries(2).await.unwrap().len(), 2);

        // A day whose top records share nothing clears them.
        let mut fresh = repo("fresh", 20, 2, 20.0, 0);
        fresh.record.description = "solitary entry".to_string();
        fresh.discovered_at = later + Duration::days(1) - Duration::hours(1);
        store.upsert(&fresh).await.unwrap();

        let analysis = controller.analyze_keyword_trends(later + Duration::days(1)).await.unwrap();
        assert_eq!(analysis.status, AnalysisStatus::Analyzed);
        assert!(analysis.emerging_keywords.is_empty());
        assert!(controller.generate_queries(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_learning_log_stays_capped() {
        let (controller, store) = controller_with(&[repo("x", 20, 2, 20.0, 1)]).await;
        let cap = controller.config().history_cap;

        for i in 0..(cap + 5) {
            controller
                .analyze_quality_trends(now() + Duration::minutes(i as i64))
                .await
                .unwrap();
        }

        let events = store
            .list_learning_events(LearningEventKind::QualityTrend, cap * 2)
            .await
            .unwrap();
        assert_eq!(events.len(), cap);
    }
}
