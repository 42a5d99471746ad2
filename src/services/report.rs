//! Markdown insights report over the discovery store.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::{LearningConfig, ScoredRepository};
use crate::domain::ports::DiscoveryStore;

use super::self_improvement::ImprovementReport;

const TOP_PER_PERIOD: usize = 10;
const TARGET_MRR: u64 = 10_000;
const BASE_PRICE: u64 = 299;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodStats {
    pub hours: i64,
    pub total: usize,
    pub near_ideal: usize,
    pub avg_multiplier: f64,
    pub avg_stars: f64,
    /// Highest multiplier first, ties by stars
    pub top: Vec<ScoredRepository>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub count: usize,
    pub avg_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllTimeStats {
    pub total: usize,
    pub near_ideal: usize,
    pub avg_multiplier: f64,
    pub avg_stars: f64,
    pub first_discovery: Option<DateTime<Utc>>,
    pub last_discovery: Option<DateTime<Utc>>,
    pub ideas_generated: u64,
    /// Largest category first
    pub categories: Vec<CategoryStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueProjection {
    pub scenario: String,
    pub conversion_rate: f64,
    pub price_per_month: u64,
    pub customers: u64,
    pub mrr: u64,
    pub arr: u64,
}

/// Conservative, realistic and optimistic conversion scenarios for `near_ideal` gems.
pub fn revenue_projections(near_ideal: usize) -> Vec<RevenueProjection> {
    [("conservative", 0.10, 299), ("realistic", 0.20, 450), ("optimistic", 0.30, 650)]
        .into_iter()
        .map(|(scenario, rate, price)| {
            let customers = (near_ideal as f64 * rate).floor() as u64;
            let mrr = (near_ideal as f64 * rate * price as f64).floor() as u64;
            RevenueProjection {
                scenario: scenario.to_string(),
                conversion_rate: rate,
                price_per_month: price,
                customers,
                mrr,
                arr: mrr * 12,
            }
        })
        .collect()
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        ((sum / n as f64) * 10.0).round() / 10.0
    }
}

/// `1234567` -> `1,234,567`
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Everything the markdown report renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsReport {
    pub generated_at: DateTime<Utc>,
    pub last_12h: PeriodStats,
    pub last_24h: PeriodStats,
    pub last_7d: PeriodStats,
    pub all_time: AllTimeStats,
    pub improvement: ImprovementReport,
    pub revenue: Vec<RevenueProjection>,
}

/// Builds [`InsightsReport`]s from the store
pub struct ReportGenerator {
    store: Arc<dyn DiscoveryStore>,
    config: LearningConfig,
}

impl ReportGenerator {
    pub fn new(store: Arc<dyn DiscoveryStore>, config: LearningConfig) -> Self {
        Self { store, config }
    }

    fn is_near_ideal(&self, repo: &ScoredRepository) -> bool {
        repo.is_near_ideal(self.config.near_ideal_min_stars, self.config.near_ideal_max_stars)
    }

    fn period_stats(&self, hours: i64, records: &[ScoredRepository]) -> PeriodStats {
        let mut top: Vec<ScoredRepository> = records.to_vec();
        top.sort_by(|a, b| {
            b.score
                .multiplier
                .total_cmp(&a.score.multiplier)
                .then_with(|| b.record.stars.cmp(&a.record.stars))
        });
        top.truncate(TOP_PER_PERIOD);

        PeriodStats {
            hours,
            total: records.len(),
            near_ideal: records.iter().filter(|r| self.is_near_ideal(r)).count(),
            avg_multiplier: average(records.iter().map(|r| r.score.multiplier)),
            avg_stars: average(records.iter().map(|r| r.record.stars as f64)),
            top,
        }
    }

    pub async fn build(&self, now: DateTime<Utc>, improvement: ImprovementReport) -> DomainResult<InsightsReport> {
        let all = self.store.all_repositories().await?;
        let ideas_generated = self.store.count_ideas().await?;

        let within = |hours: i64| -> Vec<ScoredRepository> {
            let since = now - Duration::hours(hours);
            all.iter().filter(|r| r.discovered_at > since).cloned().collect()
        };

        let mut by_category: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for repo in &all {
            by_category
                .entry(repo.score.category.clone())
                .or_default()
                .push(repo.score.multiplier);
        }
        let mut categories: Vec<CategoryStats> = by_category
            .into_iter()
            .map(|(category, multipliers)| CategoryStats {
                category,
                count: multipliers.len(),
                avg_multiplier: average(multipliers.into_iter()),
            })
            .collect();
        categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));

        let all_time = AllTimeStats {
            total: all.len(),
            near_ideal: all.iter().filter(|r| self.is_near_ideal(r)).count(),
            avg_multiplier: average(all.iter().map(|r| r.score.multiplier)),
            avg_stars: average(all.iter().map(|r| r.record.stars as f64)),
            first_discovery: all.iter().map(|r| r.discovered_at).min(),
            last_discovery: all.iter().map(|r| r.discovered_at).max(),
            ideas_generated,
            categories,
        };

        Ok(InsightsReport {
            generated_at: now,
            last_12h: self.period_stats(12, &within(12)),
            last_24h: self.period_stats(24, &within(24)),
            last_7d: self.period_stats(168, &within(168)),
            revenue: revenue_projections(all_time.near_ideal),
            all_time,
            improvement,
        })
    }
}

impl InsightsReport {
    /// Subject line summarizing near-ideal counts.
    pub fn subject(&self) -> String {
        format!(
            "Discovery: {} near-ideal gems (12h) | {} total",
            self.last_12h.near_ideal, self.all_time.near_ideal
        )
    }
}

impl fmt::Display for InsightsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h12, h24, d7, all) = (&self.last_12h, &self.last_24h, &self.last_7d, &self.all_time);
        let quality = &self.improvement.quality;

        writeln!(f, "# Discovery Insights Report")?;
        writeln!(f, "**Generated**: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f)?;
        writeln!(f, "## Summary")?;
        writeln!(f)?;
        writeln!(f, "- **New gems (12h)**: {}", h12.total)?;
        writeln!(f, "- **Near-ideal gems (12h)**: {}", h12.near_ideal)?;
        writeln!(f, "- **Average multiplier (12h)**: {}x", h12.avg_multiplier)?;
        writeln!(f, "- **Average stars (12h)**: {}", h12.avg_stars)?;
        writeln!(f, "- **Quality trend**: {}", quality.direction.as_str().to_uppercase())?;
        writeln!(f)?;

        writeln!(f, "## Performance Trends")?;
        writeln!(f)?;
        writeln!(f, "| Metric | 12h | 24h | 7d | All-Time |")?;
        writeln!(f, "|--------|-----|-----|----|----------|")?;
        writeln!(f, "| Total Gems | {} | {} | {} | {} |", h12.total, h24.total, d7.total, all.total)?;
        writeln!(
            f,
            "| Near-Ideal Gems | {} | {} | {} | {} |",
            h12.near_ideal, h24.near_ideal, d7.near_ideal, all.near_ideal
        )?;
        writeln!(
            f,
            "| Avg Multiplier | {}x | {}x | {}x | {}x |",
            h12.avg_multiplier, h24.avg_multiplier, d7.avg_multiplier, all.avg_multiplier
        )?;
        writeln!(
            f,
            "| Avg Stars | {} | {} | {} | {} |",
            h12.avg_stars, h24.avg_stars, d7.avg_stars, all.avg_stars
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "Discovery rate: {:.1}/h (12h), {:.1}/h (24h), {:.1}/h (7d)",
            h12.total as f64 / 12.0,
            h24.total as f64 / 24.0,
            d7.total as f64 / 168.0
        )?;
        writeln!(f)?;

        writeln!(f, "## Top Discoveries (12h)")?;
        writeln!(f)?;
        if h12.top.is_empty() {
            writeln!(f, "*No gems found in the last 12 hours.*")?;
            writeln!(f)?;
        }
        for (i, gem) in h12.top.iter().enumerate() {
            writeln!(
                f,
                "### {}. **{}** ({} stars, {} forks)",
                i + 1,
                gem.record.name,
                gem.record.stars,
                gem.record.forks
            )?;
            writeln!(f, "- **Multiplier**: {}x", gem.score.multiplier)?;
            writeln!(f, "- **Category**: {}", gem.score.category)?;
            writeln!(f, "- **Owner**: {}", gem.record.owner)?;
            writeln!(f, "- **URL**: {}", gem.record.url)?;
            writeln!(f)?;
        }

        writeln!(f, "## Revenue Projections")?;
        writeln!(f)?;
        writeln!(f, "Based on **{}** near-ideal gems:", all.near_ideal)?;
        writeln!(f)?;
        for projection in &self.revenue {
            writeln!(
                f,
                "- **{}** ({:.0}% at ${}/mo): {} customers, MRR ${}, ARR ${}",
                projection.scenario,
                projection.conversion_rate * 100.0,
                projection.price_per_month,
                projection.customers,
                thousands(projection.mrr),
                thousands(projection.arr)
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Path to ${} MRR: {} customers at ${}/month",
            thousands(TARGET_MRR),
            TARGET_MRR / BASE_PRICE,
            BASE_PRICE
        )?;
        writeln!(f)?;

        writeln!(f, "## Learning Insights")?;
        writeln!(f)?;
        writeln!(f, "**Trend**: {} | **Recommendation**: {}", quality.direction, quality.recommendation)?;
        writeln!(f)?;
        writeln!(
            f,
            "- Last 12h: {} ({} near-ideal)",
            quality.last_12h.quality_score, quality.last_12h.near_ideal
        )?;
        writeln!(
            f,
            "- Last 24h: {} ({} near-ideal)",
            quality.last_24h.quality_score, quality.last_24h.near_ideal
        )?;
        writeln!(
            f,
            "- Last 7d: {} ({} near-ideal)",
            quality.last_7d.quality_score, quality.last_7d.near_ideal
        )?;
        writeln!(f)?;

        let keywords = &self.improvement.keywords;
        if !keywords.emerging_keywords.is_empty() {
            writeln!(f, "### Emerging Keywords ({} recent gems analyzed)", keywords.records_analyzed)?;
            writeln!(f)?;
            for (i, keyword) in keywords.emerging_keywords.iter().take(5).enumerate() {
                writeln!(f, "{}. `{}`", i + 1, keyword)?;
            }
            writeln!(f)?;
        }

        if let Some(best) = &self.improvement.parameters.best_bucket {
            writeln!(f, "### Best Star Range: {}", best.label)?;
            writeln!(f)?;
            writeln!(f, "- Quality ratio: {}", best.quality_ratio)?;
            writeln!(f, "- Avg multiplier: {}x", best.avg_multiplier)?;
            writeln!(f, "- Gems with forks: {}", best.with_forks)?;
            writeln!(f, "- Suggested filter: stars:{}..{}", best.min_stars, best.max_stars)?;
            writeln!(f)?;
        }

        if !self.improvement.new_queries.is_empty() {
            writeln!(f, "### New Queries")?;
            writeln!(f)?;
            for (i, query) in self.improvement.new_queries.iter().enumerate() {
                writeln!(f, "{}. `{}`", i + 1, query)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "## Category Breakdown (All-Time)")?;
        writeln!(f)?;
        for category in &all.categories {
            writeln!(
                f,
                "- **{}**: {} gems (avg {}x)",
                category.category, category.count, category.avg_multiplier
            )?;
        }
        writeln!(f)?;

        writeln!(f, "## Learning Progress")?;
        writeln!(f)?;
        writeln!(f, "- Learning cycles completed: {}", self.improvement.learning_cycles_completed)?;
        writeln!(f, "- Stored gems: {}", all.total)?;
        writeln!(f, "- Ideas generated: {}", all.ideas_generated)?;
        if let (Some(first), Some(last)) = (all.first_discovery, all.last_discovery) {
            writeln!(
                f,
                "- Discovery span: {} to {}",
                first.format("%Y-%m-%d %H:%M"),
                last.format("%Y-%m-%d %H:%M")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteDiscoveryStore};
    use crate::domain::models::RepositoryRecord;
    use crate::services::scorer::HeuristicScorer;
    use crate::services::self_improvement::SelfImprovingController;
    use chrono::TimeZone;

    #[test]
    fn test_revenue_projections() {
        let projections = revenue_projections(40);
        assert_eq!(projections.len(), 3);
        assert_eq!(projections[0].customers, 4);
        assert_eq!(projections[0].mrr, 1_196);
        assert_eq!(projections[1].mrr, 3_600);
        assert_eq!(projections[2].arr, 7_800 * 12);
    }

    #[test]
    fn test_thousands_separator() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[tokio::test]
    async fn test_report_renders_periods_and_categories() {
        let pool = create_migrated_test_pool().await.unwrap();
        let store = Arc::new(SqliteDiscoveryStore::new(pool));
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let scorer = HeuristicScorer::default();

        let fixtures = [
            ("live-chat", 12, 3, "realtime chat with session history", 1),
            ("metrics", 40, 0, "analytics dashboard", 30),
            ("old-board", 80, 4, "collaborative whiteboard sync", 100),
        ];
        for (name, stars, forks, description, hours_ago) in fixtures {
            let record = RepositoryRecord::new("octo", name)
                .with_stars(stars)
                .with_forks(forks)
                .with_description(description);
            let score = scorer.score(&record, now);
            store
                .upsert(&ScoredRepository::new(record, score, now - Duration::hours(hours_ago)))
                .await
                .unwrap();
        }

        let controller = SelfImprovingController::new(store.clone(), LearningConfig::default());
        let improvement = controller.run_improvement_cycle(now).await.unwrap();
        let report = ReportGenerator::new(store, LearningConfig::default())
            .build(now, improvement)
            .await
            .unwrap();

        assert_eq!(report.last_12h.total, 1);
        assert_eq!(report.last_7d.total, 3);
        assert_eq!(report.all_time.near_ideal, 2);
        assert_eq!(report.all_time.categories.len(), 3);

        let markdown = report.to_string();
        assert!(markdown.starts_with("# Discovery Insights Report"));
        assert!(markdown.contains("**live-chat**"));
        assert!(markdown.contains("| Total Gems | 1 | 1 | 3 | 3 |"));
        assert!(markdown.contains("Communication"));
        assert!(report.subject().contains("1 near-ideal gems (12h)"));
    }
}
