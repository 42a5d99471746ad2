//! Heuristic opportunity scorer.
//!
//! Maps a [`RepositoryRecord`] to a [`ScoreResult`] using fixed keyword
//! tables and the tunable thresholds in [`ScoringConfig`]. Scoring is pure:
//! the reference time is passed in, so identical inputs always produce
//! identical results.

use chrono::{DateTime, Utc};

use crate::domain::models::{RepositoryRecord, ScoreResult, ScoringConfig};

/// Keywords that raise the value multiplier, with their weights.
pub const MULTIPLIER_KEYWORDS: &[(&str, f64)] = &[
    ("realtime", 10.0),
    ("collaborative", 15.0),
    ("multiplayer", 15.0),
    ("chat", 12.0),
    ("dashboard", 8.0),
    ("analytics", 8.0),
    ("monitoring", 8.0),
    ("memory", 20.0),
    ("context", 15.0),
    ("history", 10.0),
    ("state", 12.0),
    ("sync", 15.0),
    ("live", 10.0),
    ("streaming", 8.0),
    ("websocket", 8.0),
    ("feed", 7.0),
    ("notification", 7.0),
    ("session", 10.0),
    ("cache", 6.0),
    ("queue", 6.0),
];

const PAIN_POINT_WORDS: &[&str] = &[
    "problem", "solution", "fix", "simplify", "easier", "better", "improve", "manage",
    "organize", "track", "automate", "faster", "efficient", "productivity",
];

const SIMPLICITY_WORDS: &[&str] = &[
    "simple", "minimal", "lightweight", "small", "basic", "starter", "boilerplate",
    "template", "example",
];

const SIMPLE_LANGUAGES: &[&str] = &["javascript", "typescript", "python", "go"];

const NOVELTY_WORDS: &[&str] = &[
    "new", "novel", "innovative", "unique", "different", "experimental", "prototype",
    "proof-of-concept", "poc", "exploration", "research", "fresh", "alternative",
];

/// Category rules, first match wins. The last rule matches whole words only.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    ("Communication", &["chat", "message", "conversation"]),
    ("Analytics", &["dashboard", "analytics", "monitoring"]),
    ("Collaboration", &["collaborative", "multiplayer", "team"]),
    ("Real-time", &["realtime", "live", "streaming"]),
];

const AI_WORDS: &[&str] = &["ai", "ml", "llm", "gpt"];

pub const CATEGORIES: &[&str] = &[
    "Communication",
    "Analytics",
    "Collaboration",
    "Real-time",
    "AI/ML",
    "General",
];

const KEYWORD_BONUS: f64 = 0.5;
const KEYWORD_CAP: f64 = 2.0;
const NOVELTY_KEYWORD_CAP: f64 = 3.0;
const MAX_BASE_SCORE: f64 = 10.0;
const MAX_MULTIPLIER: f64 = 50.0;
const MIN_BASE_VALUE: u64 = 1_000;
const VALUE_PER_STAR: u64 = 50;

/// Assign a category label from description and topics.
pub fn categorize(description: &str, topics: &[String]) -> &'static str {
    let text = format!("{} {}", description, topics.join(" ")).to_lowercase();

    for (category, words) in CATEGORY_RULES {
        if words.iter().any(|w| text.contains(w)) {
            return category;
        }
    }

    let is_ai = text
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| AI_WORDS.contains(&token));
    if is_ai {
        "AI/ML"
    } else {
        "General"
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn keyword_score(text: &str, words: &[&str], cap: f64) -> f64 {
    let hits = words.iter().filter(|w| text.contains(*w)).count() as f64;
    (hits * KEYWORD_BONUS).min(cap)
}

/// Deterministic heuristic scorer
#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer {
    config: ScoringConfig,
}

impl HeuristicScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score a record relative to `reference`, the time recency is measured from.
    pub fn score(&self, record: &RepositoryRecord, reference: DateTime<Utc>) -> ScoreResult {
        let category = categorize(&record.description, &record.topics);
        let text = format!(
            "{} {} {}",
            record.description,
            record.topics.join(" "),
            category
        )
        .to_lowercase();

        let undiscovered_score = self.undiscovered_score(record.stars, record.forks);
        let activity_score = self.activity_score(record.pushed_at, reference);
        let pain_point_score = keyword_score(&text, PAIN_POINT_WORDS, KEYWORD_CAP);

        let mut simplicity_score = keyword_score(&text, SIMPLICITY_WORDS, KEYWORD_CAP);
        if SIMPLE_LANGUAGES.contains(&record.language.to_lowercase().as_str()) {
            simplicity_score += KEYWORD_BONUS;
        }

        let novelty_score = keyword_score(&text, NOVELTY_WORDS, NOVELTY_KEYWORD_CAP)
            + creation_bonus(record.created_at, reference);

        let base_score = round_to(
            (undiscovered_score + activity_score + pain_point_score + simplicity_score + novelty_score)
                .min(MAX_BASE_SCORE),
            1,
        );

        let (multiplier, multiplier_reasons) = multiplier_for(&text);
        let opportunity_score = round_to(base_score * multiplier / 10.0, 2);

        let estimated_base_value = (record.stars.saturating_mul(VALUE_PER_STAR)).max(MIN_BASE_VALUE);
        let projected_value = (estimated_base_value as f64 * multiplier).round() as u64;

        let is_opportunity =
            base_score >= self.config.opportunity_threshold && record.stars < self.config.max_stars;

        ScoreResult {
            base_score,
            opportunity_score,
            multiplier,
            undiscovered_score: round_to(undiscovered_score, 1),
            activity_score: round_to(activity_score, 1),
            pain_point_score: round_to(pain_point_score, 1),
            simplicity_score: round_to(simplicity_score, 1),
            novelty_score: round_to(novelty_score, 1),
            category: category.to_string(),
            multiplier_reasons,
            estimated_base_value,
            projected_value,
            is_opportunity,
        }
    }

    fn undiscovered_score(&self, stars: u64, forks: u64) -> f64 {
        let mut score = match stars {
            0..=49 => 3.0,
            50..=99 => 2.5,
            100..=249 => 2.0,
            250..=499 => 1.5,
            _ => 0.0,
        };

        if forks > 0 && stars < 100 {
            score += 1.0;
        }
        if stars > 0 && forks as f64 / stars as f64 >= self.config.fork_ratio {
            score += 0.5;
        }
        score
    }

    fn activity_score(&self, pushed_at: Option<DateTime<Utc>>, reference: DateTime<Utc>) -> f64 {
        let Some(pushed_at) = pushed_at else {
            return 0.0;
        };
        let days = (reference - pushed_at).num_days().max(0);
        if days <= self.config.recent_push_days {
            1.5
        } else if days <= self.config.active_push_days {
            1.0
        } else {
            0.0
        }
    }
}

fn creation_bonus(created_at: Option<DateTime<Utc>>, reference: DateTime<Utc>) -> f64 {
    let Some(created_at) = created_at else {
        return 0.0;
    };
    match (reference - created_at).num_days().max(0) {
        0..=179 => 1.5,
        180..=364 => 1.0,
        _ => 0.0,
    }
}

/// Mean of the top three matching weights, x1.5 when three or more match.
fn multiplier_for(text: &str) -> (f64, Vec<String>) {
    let matches: Vec<(&str, f64)> = MULTIPLIER_KEYWORDS
        .iter()
        .filter(|(keyword, _)| text.contains(keyword))
        .copied()
        .collect();

    if matches.is_empty() {
        return (1.0, Vec::new());
    }

    let mut weights: Vec<f64> = matches.iter().map(|(_, w)| *w).collect();
    weights.sort_by(|a, b| b.total_cmp(a));
    let top: Vec<f64> = weights.into_iter().take(3).collect();
    let mut multiplier = top.iter().sum::<f64>() / top.len() as f64;

    if matches.len() >= 3 {
        multiplier *= 1.5;
    }

    let multiplier = round_to(multiplier.clamp(1.0, MAX_MULTIPLIER), 1);
    let reasons = matches.iter().map(|(k, _)| (*k).to_string()).collect();
    (multiplier, reasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap()
    }

    fn scorer() -> HeuristicScorer {
        HeuristicScorer::new(ScoringConfig::default())
    }

    #[test]
    fn test_collaborative_sync_repo_is_opportunity() {
        let record = RepositoryRecord::new("octo", "board")
            .with_stars(10)
            .with_forks(2)
            .with_description("realtime collaborative state sync");

        let result = scorer().score(&record, reference());

        assert_eq!(result.multiplier, 21.0);
        assert!(result.multiplier >= 15.0);
        assert!(result.is_opportunity);
        assert_eq!(result.category, "Collaboration");
        assert_eq!(
            result.multiplier_reasons,
            vec!["realtime", "collaborative", "state", "sync"]
        );
    }

    #[test]
    fn test_popular_repo_is_never_opportunity() {
        let record = RepositoryRecord::new("big", "framework")
            .with_stars(10_000)
            .with_forks(1000)
            .with_description("realtime collaborative memory context sync simple new fix")
            .with_language("typescript")
            .with_pushed_at(reference() - Duration::days(1))
            .with_created_at(reference() - Duration::days(10));

        let result = scorer().score(&record, reference());

        assert!(!result.is_opportunity);
        assert_eq!(result.undiscovered_score, 0.5);
    }

    #[test]
    fn test_multiplier_without_keywords_is_one() {
        let record = RepositoryRecord::new("a", "b").with_description("a parser");
        let result = scorer().score(&record, reference());
        assert_eq!(result.multiplier, 1.0);
        assert!(result.multiplier_reasons.is_empty());
        assert_eq!(result.estimated_base_value, 1_000);
    }

    #[test]
    fn test_multiplier_is_capped() {
        let (multiplier, _) = multiplier_for("memory memory memory");
        assert_eq!(multiplier, 20.0);

        let (multiplier, reasons) = multiplier_for("memory context sync collaborative multiplayer");
        assert_eq!(reasons.len(), 5);
        assert!(multiplier <= MAX_MULTIPLIER);
        assert_eq!(multiplier, 25.0);
    }

    #[test]
    fn test_activity_bonus_follows_push_age() {
        let s = scorer();
        assert_eq!(s.activity_score(Some(reference() - Duration::days(3)), reference()), 1.5);
        assert_eq!(s.activity_score(Some(reference() - Duration::days(90)), reference()), 1.0);
        assert_eq!(s.activity_score(Some(reference() - Duration::days(400)), reference()), 0.0);
        assert_eq!(s.activity_score(None, reference()), 0.0);
    }

    #[test]
    fn test_novelty_keywords_and_creation_age() {
        let record = RepositoryRecord::new("octo", "lab")
            .with_stars(1000)
            .with_description("new novel innovative unique different experimental")
            .with_created_at(reference() - Duration::days(10));

        let result = scorer().score(&record, reference());
        assert_eq!(result.novelty_score, 4.5);

        assert_eq!(creation_bonus(Some(reference() - Duration::days(179)), reference()), 1.5);
        assert_eq!(creation_bonus(Some(reference() - Duration::days(180)), reference()), 1.0);
        assert_eq!(creation_bonus(Some(reference() - Duration::days(364)), reference()), 1.0);
        assert_eq!(creation_bonus(Some(reference() - Duration::days(365)), reference()), 0.0);
        assert_eq!(creation_bonus(None, reference()), 0.0);
    }

    #[test]
    fn test_categorize_rules() {
        assert_eq!(categorize("team chat app", &[]), "Communication");
        assert_eq!(categorize("metrics", &["dashboard".to_string()]), "Analytics");
        assert_eq!(categorize("an llm wrapper", &[]), "AI/ML");
        assert_eq!(categorize("sends email reminders", &[]), "General");
    }

    #[test]
    fn test_threshold_is_configurable() {
        let strict = HeuristicScorer::new(ScoringConfig {
            opportunity_threshold: 9.5,
            ..ScoringConfig::default()
        });
        let record = RepositoryRecord::new("octo", "board")
            .with_stars(10)
            .with_forks(2)
            .with_description("realtime collaborative state sync");
        assert!(!strict.score(&record, reference()).is_opportunity);
    }

    fn arb_record() -> impl Strategy<Value = RepositoryRecord> {
        let words = prop::sample::subsequence(
            vec![
                "realtime", "chat", "memory", "simple", "new", "fix", "dashboard", "sync",
                "prototype", "queue", "team", "llm",
            ],
            0..8,
        );
        (0u64..20_000, 0u64..2_000, words, 0i64..800, 0i64..800).prop_map(
            |(stars, forks, words, pushed, created)| {
                RepositoryRecord::new("owner", "repo")
                    .with_stars(stars)
                    .with_forks(forks)
                    .with_description(words.join(" "))
                    .with_language("python")
                    .with_pushed_at(reference() - Duration::days(pushed))
                    .with_created_at(reference() - Duration::days(created))
            },
        )
    }

    proptest! {
        #[test]
        fn prop_score_is_deterministic(record in arb_record()) {
            let s = scorer();
            prop_assert_eq!(s.score(&record, reference()), s.score(&record, reference()));
        }

        #[test]
        fn prop_scores_stay_in_range(record in arb_record()) {
            let result = scorer().score(&record, reference());
            prop_assert!((0.0..=10.0).contains(&result.base_score));
            prop_assert!((1.0..=50.0).contains(&result.multiplier));
            if result.is_opportunity {
                prop_assert!(record.stars < 500);
                prop_assert!(result.base_score >= 3.0);
            }
        }
    }
}
