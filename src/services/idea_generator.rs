//! Template-based idea generation from learned discovery patterns.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::models::{GeneratedIdea, ScoredRepository};

/// Gems at or above this multiplier contribute to the learned patterns.
const LEARNING_MULTIPLIER: f64 = 10.0;

const TEMPLATES: &[(&str, &[&str])] = &[
    (
        "Communication",
        &[
            "{adjective} {realtime_feature} for {audience} with persistent memory",
            "Collaborative {tool} with {feature1} and {feature2}",
            "{platform} for {niche} featuring {benefit}",
        ],
    ),
    (
        "Analytics",
        &[
            "Real-time {metric} dashboard for {industry}",
            "{adjective} analytics platform for {usecase}",
            "Monitoring {target} with {feature1}",
        ],
    ),
    (
        "Collaboration",
        &[
            "Multiplayer {tool} for {audience} with shared state",
            "{adjective} workspace for {niche} teams",
            "Collaborative {platform} with real-time {feature1}",
        ],
    ),
    (
        "Real-time",
        &[
            "Live {realtime_feature} streaming for {usecase}",
            "Real-time {tool} with {deploy_benefit}",
            "{adjective} synchronization platform for {audience}",
        ],
    ),
    (
        "AI/ML",
        &[
            "AI {tool} with persistent memory",
            "{adjective} LLM {platform} for {usecase}",
            "Context-aware {tool} for {audience}",
        ],
    ),
];

const VOCAB: &[(&str, &[&str])] = &[
    ("adjective", &["Smart", "Fast", "Simple", "Minimal", "Powerful", "Elegant", "Modern", "Intelligent"]),
    ("realtime_feature", &["chat", "sync", "collaboration", "streaming", "updates"]),
    ("audience", &["developers", "teams", "startups", "enterprises", "creators", "researchers"]),
    ("tool", &["editor", "dashboard", "workspace", "platform", "interface", "system"]),
    ("feature1", &["real-time sync", "history tracking", "version control", "collaborative editing"]),
    ("feature2", &["AI suggestions", "automatic backups", "offline mode", "instant search"]),
    ("platform", &["Hub", "Space", "Studio", "Lab", "Center", "Portal"]),
    ("niche", &["indie game dev", "ML research", "content creation", "data science", "web3"]),
    ("benefit", &["instant memory", "fast queries", "time-travel debugging", "context preservation"]),
    ("metric", &["performance", "usage", "engagement", "conversion", "quality"]),
    ("industry", &["SaaS", "e-commerce", "fintech", "healthtech", "edtech"]),
    ("usecase", &["code review", "data analysis", "content moderation", "customer support"]),
    ("target", &["API endpoints", "user sessions", "system health", "data pipelines"]),
    ("deploy_benefit", &["zero setup", "automatic scaling", "built-in analytics", "instant deployment"]),
];

const HIGH_VALUE_KEYWORDS: &[&str] = &["realtime", "real-time", "collaborative", "memory", "context", "sync", "multiplayer"];

const FALLBACK_CATEGORIES: &[&str] = &["Communication", "Analytics", "Collaboration"];

const TECH_STACKS: &[&[&str]] = &[
    &["TypeScript", "React", "Node.js", "SQLite"],
    &["Python", "FastAPI", "React", "PostgreSQL"],
    &["Go", "HTMX", "PostgreSQL"],
    &["Rust", "Axum", "SvelteKit", "SQLite"],
];

/// Counts learned from high-multiplier gems
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearnedPatterns {
    pub successful_categories: BTreeMap<String, usize>,
    pub high_multiplier_keywords: BTreeMap<String, usize>,
    pub tech_stacks: BTreeMap<String, usize>,
    pub gems_seen: usize,
}

impl LearnedPatterns {
    pub fn learn(gems: &[ScoredRepository]) -> Self {
        let mut patterns = Self::default();
        for gem in gems.iter().filter(|g| g.score.multiplier >= LEARNING_MULTIPLIER) {
            *patterns
                .successful_categories
                .entry(gem.score.category.clone())
                .or_default() += 1;
            for keyword in &gem.score.multiplier_reasons {
                *patterns.high_multiplier_keywords.entry(keyword.clone()).or_default() += 1;
            }
            if !gem.record.language.is_empty() {
                *patterns.tech_stacks.entry(gem.record.language.clone()).or_default() += 1;
            }
        }
        patterns.gems_seen = gems.len();
        patterns
    }

    /// Most frequent keywords first, ties alphabetical
    pub fn top_keywords(&self, n: usize) -> Vec<(String, usize)> {
        let mut ranked: Vec<_> = self
            .high_multiplier_keywords
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, options: &[&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}

fn market_size(category: &str) -> u64 {
    match category {
        "Communication" => 5_000_000,
        "Analytics" => 10_000_000,
        "Collaboration" => 8_000_000,
        "Real-time" => 6_000_000,
        "AI/ML" => 15_000_000,
        _ => 5_000_000,
    }
}

fn feasibility(multiplier: f64) -> &'static str {
    if multiplier > 30.0 {
        "High complexity, 6-12 months"
    } else if multiplier > 15.0 {
        "Medium complexity, 3-6 months"
    } else {
        "Low complexity, 1-3 months"
    }
}

fn time_to_build(multiplier: f64) -> &'static str {
    if multiplier > 30.0 {
        "6-9 months"
    } else if multiplier > 15.0 {
        "3-6 months"
    } else {
        "4-12 weeks"
    }
}

/// Generates ideas by filling category templates
#[derive(Debug, Clone)]
pub struct IdeaGenerator {
    patterns: LearnedPatterns,
}

impl IdeaGenerator {
    pub fn new(patterns: LearnedPatterns) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &LearnedPatterns {
        &self.patterns
    }

    /// Generate `count` ideas, best `multiplier * novelty` first.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, count: usize, now: DateTime<Utc>) -> Vec<GeneratedIdea> {
        let mut ideas: Vec<GeneratedIdea> = (0..count).map(|_| self.generate_one(rng, now)).collect();
        ideas.sort_by(|a, b| b.potential().total_cmp(&a.potential()));
        ideas
    }

    fn generate_one<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> GeneratedIdea {
        let category = self.pick_category(rng);
        let templates = TEMPLATES
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, t)| *t)
            .unwrap_or(TEMPLATES[0].1);

        let template = pick(rng, templates);
        let name = fill_template(rng, template);
        let description = describe(rng, category);
        let multiplier = predict_multiplier(rng, &format!("{name} {description}"));
        let market_size = market_size(category);
        let predicted_base_value = market_size / 100;
        let predicted_value = (predicted_base_value as f64 * multiplier).round() as u64;
        let tech_stack = TECH_STACKS
            .choose(rng)
            .map(|stack| stack.iter().map(|s| (*s).to_string()).collect())
            .unwrap_or_default();
        let rationale = match rng.gen_range(0..3) {
            0 => format!("{name} depends on low-latency shared state that most teams rebuild from scratch"),
            1 => format!("Without a fast memory layer, {name} needs custom infrastructure ({multiplier:.1}x the cost)"),
            _ => format!("Users expect instant history and context from {name}; a persistent store makes that cheap"),
        };

        GeneratedIdea {
            id: None,
            name,
            category: category.to_string(),
            description,
            multiplier: (multiplier * 10.0).round() / 10.0,
            novelty_score: (rng.gen_range(7.0..10.0_f64) * 10.0).round() / 10.0,
            market_size,
            predicted_base_value,
            predicted_value,
            feasibility: feasibility(multiplier).to_string(),
            time_to_build: time_to_build(multiplier).to_string(),
            tech_stack,
            rationale,
            generated_at: now,
        }
    }

    /// Categories weighted by learned success; unknown categories fall back to a random template set.
    fn pick_category<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        let learned: Vec<(&String, &usize)> = self.patterns.successful_categories.iter().collect();
        let chosen = WeightedIndex::new(learned.iter().map(|(_, w)| **w))
            .ok()
            .map(|dist| learned[dist.sample(rng)].0.as_str());

        match chosen {
            Some(category) => TEMPLATES
                .iter()
                .map(|(c, _)| *c)
                .find(|c| *c == category)
                .unwrap_or_else(|| TEMPLATES[rng.gen_range(0..TEMPLATES.len())].0),
            None => pick(rng, FALLBACK_CATEGORIES),
        }
    }
}

fn fill_template<R: Rng + ?Sized>(rng: &mut R, template: &str) -> String {
    let mut result = template.to_string();
    for (key, options) in VOCAB {
        let placeholder = format!("{{{key}}}");
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, pick(rng, options));
        }
    }
    result
}

fn describe<R: Rng + ?Sized>(rng: &mut R, category: &str) -> String {
    let category = category.to_lowercase();
    match rng.gen_range(0..3) {
        0 => format!(
            "A {category} platform built on {}.",
            pick(rng, &["real-time collaboration", "instant state sync", "persistent memory", "fast queries"])
        ),
        1 => format!(
            "Solves {} in {category} tools.",
            pick(rng, &["slow state management", "lost context", "poor real-time performance", "data consistency"])
        ),
        _ => format!(
            "Built for teams who need {}.",
            pick(rng, &["reliable real-time updates", "scalable state storage", "instant history access", "collaborative workflows"])
        ),
    }
}

fn predict_multiplier<R: Rng + ?Sized>(rng: &mut R, text: &str) -> f64 {
    let text = text.to_lowercase();
    let mut multiplier: f64 = 1.0;
    for keyword in HIGH_VALUE_KEYWORDS {
        if text.contains(keyword) {
            multiplier += rng.gen_range(3.0..8.0_f64);
        }
    }
    multiplier.min(50.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{RepositoryRecord, ScoreResult};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gem(category: &str, multiplier: f64, reasons: &[&str]) -> ScoredRepository {
        let record = RepositoryRecord::new("octo", format!("{category}-{multiplier}")).with_language("Rust");
        let score = ScoreResult {
            base_score: 5.0,
            opportunity_score: 5.0,
            multiplier,
            undiscovered_score: 3.0,
            activity_score: 0.0,
            pain_point_score: 0.0,
            simplicity_score: 0.0,
            novelty_score: 0.0,
            category: category.to_string(),
            multiplier_reasons: reasons.iter().map(|s| s.to_string()).collect(),
            estimated_base_value: 1_000,
            projected_value: 10_000,
            is_opportunity: true,
        };
        ScoredRepository::new(record, score, Utc::now())
    }

    #[test]
    fn test_learn_only_counts_high_multiplier_gems() {
        let patterns = LearnedPatterns::learn(&[
            gem("Analytics", 12.0, &["dashboard", "sync"]),
            gem("Analytics", 15.0, &["sync"]),
            gem("General", 2.0, &["cache"]),
        ]);

        assert_eq!(patterns.gems_seen, 3);
        assert_eq!(patterns.successful_categories.get("Analytics"), Some(&2));
        assert!(!patterns.successful_categories.contains_key("General"));
        assert_eq!(patterns.top_keywords(1), vec![("sync".to_string(), 2)]);
        assert_eq!(patterns.tech_stacks.get("Rust"), Some(&2));
    }

    #[test]
    fn test_generated_ideas_are_sorted_and_filled() {
        let patterns = LearnedPatterns::learn(&[gem("AI/ML", 20.0, &["memory"])]);
        let generator = IdeaGenerator::new(patterns);
        let mut rng = StdRng::seed_from_u64(11);

        let ideas = generator.generate(&mut rng, 20, Utc::now());

        assert_eq!(ideas.len(), 20);
        for pair in ideas.windows(2) {
            assert!(pair[0].potential() >= pair[1].potential());
        }
        for idea in &ideas {
            assert_eq!(idea.category, "AI/ML");
            assert!(!idea.name.contains('{'), "unfilled template: {}", idea.name);
            assert!((1.0..=50.0).contains(&idea.multiplier));
            assert!((7.0..=10.0).contains(&idea.novelty_score));
            assert_eq!(idea.market_size, 15_000_000);
            assert!(!idea.tech_stack.is_empty());
        }
    }

    #[test]
    fn test_unknown_learned_category_falls_back_to_templates() {
        let patterns = LearnedPatterns::learn(&[gem("General", 20.0, &[])]);
        let generator = IdeaGenerator::new(patterns);
        let mut rng = StdRng::seed_from_u64(3);

        for idea in generator.generate(&mut rng, 10, Utc::now()) {
            assert!(TEMPLATES.iter().any(|(c, _)| *c == idea.category));
        }
    }

    #[test]
    fn test_empty_patterns_use_fallback_categories() {
        let generator = IdeaGenerator::new(LearnedPatterns::default());
        let mut rng = StdRng::seed_from_u64(5);
        for idea in generator.generate(&mut rng, 10, Utc::now()) {
            assert!(FALLBACK_CATEGORIES.contains(&idea.category.as_str()));
        }
    }

    #[test]
    fn test_feasibility_bands() {
        assert_eq!(feasibility(40.0), "High complexity, 6-12 months");
        assert_eq!(time_to_build(20.0), "3-6 months");
        assert_eq!(time_to_build(5.0), "4-12 weeks");
    }
}
