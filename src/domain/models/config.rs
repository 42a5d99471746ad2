use serde::{Deserialize, Serialize};

/// Main configuration structure for gemscout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// GitHub search endpoint configuration
    #[serde(default)]
    pub github: GitHubConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Outbound request window configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Heuristic scorer thresholds
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Continuous discovery loop configuration
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Self-improving controller configuration
    #[serde(default)]
    pub learning: LearningConfig,
}

/// GitHub search endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GitHubConfig {
    /// Base URL of the REST API
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Sort field for repository search (`updated`, `stars`, ...)
    #[serde(default = "default_sort")]
    pub sort: String,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    "gemscout".to_string()
}

fn default_sort() -> String {
    "updated".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            sort: default_sort(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".gemscout/continuous_discovery.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation for file logs: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Outbound request window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Length of the trailing window in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Requests allowed per window when a token is configured
    #[serde(default = "default_authenticated_limit")]
    pub authenticated_limit: usize,

    /// Requests allowed per window without a token
    #[serde(default = "default_anonymous_limit")]
    pub anonymous_limit: usize,
}

const fn default_window_secs() -> u64 {
    3_600
}

const fn default_authenticated_limit() -> usize {
    5_000
}

const fn default_anonymous_limit() -> usize {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            authenticated_limit: default_authenticated_limit(),
            anonymous_limit: default_anonymous_limit(),
        }
    }
}

impl RateLimitConfig {
    /// Ceiling for the trailing window, selected solely by credential presence.
    pub fn limit_for(&self, authenticated: bool) -> usize {
        if authenticated {
            self.authenticated_limit
        } else {
            self.anonymous_limit
        }
    }
}

/// Heuristic scorer thresholds.
///
/// These are empirically chosen defaults, not derived constants; every one of
/// them can be overridden from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoringConfig {
    /// Minimum base score for the opportunity predicate
    #[serde(default = "default_opportunity_threshold")]
    pub opportunity_threshold: f64,

    /// Repositories at or above this star count are never opportunities
    #[serde(default = "default_max_stars")]
    pub max_stars: u64,

    /// Pushes within this many days earn the full activity bonus
    #[serde(default = "default_recent_push_days")]
    pub recent_push_days: i64,

    /// Pushes within this many days earn the reduced activity bonus
    #[serde(default = "default_active_push_days")]
    pub active_push_days: i64,

    /// Fork/star ratio that earns the fork-ratio bonus
    #[serde(default = "default_fork_ratio")]
    pub fork_ratio: f64,
}

const fn default_opportunity_threshold() -> f64 {
    3.0
}

const fn default_max_stars() -> u64 {
    500
}

const fn default_recent_push_days() -> i64 {
    30
}

const fn default_active_push_days() -> i64 {
    180
}

const fn default_fork_ratio() -> f64 {
    0.1
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            opportunity_threshold: default_opportunity_threshold(),
            max_stars: default_max_stars(),
            recent_push_days: default_recent_push_days(),
            active_push_days: default_active_push_days(),
            fork_ratio: default_fork_ratio(),
        }
    }
}

/// Continuous discovery loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiscoveryConfig {
    /// Queries sampled from the catalog each cycle
    #[serde(default = "default_queries_per_cycle")]
    pub queries_per_cycle: usize,

    /// Upper bound on queries per cycle after the controller expands the search
    #[serde(default = "default_max_queries_per_cycle")]
    pub max_queries_per_cycle: usize,

    /// Results requested per search call
    #[serde(default = "default_results_per_query")]
    pub results_per_query: usize,

    /// Number of result pages rotated through
    #[serde(default = "default_page_count")]
    pub page_count: u64,

    /// Scanned repositories per page advance
    #[serde(default = "default_scanned_per_page")]
    pub scanned_per_page: u64,

    /// Delay between queries within a cycle, in milliseconds
    #[serde(default = "default_query_delay_ms")]
    pub query_delay_ms: u64,

    /// Delay between cycles, in milliseconds
    #[serde(default = "default_cycle_delay_ms")]
    pub cycle_delay_ms: u64,

    /// Run the controller every N cycles
    #[serde(default = "default_improve_every")]
    pub improve_every: u64,

    /// Minimum cumulative scored records before the controller runs
    #[serde(default = "default_min_scored_for_improve")]
    pub min_scored_for_improve: u64,

    /// Export a snapshot every N cycles
    #[serde(default = "default_export_every")]
    pub export_every: u64,

    /// Most recent opportunities included in a snapshot
    #[serde(default = "default_export_limit")]
    pub export_limit: usize,

    /// Directory snapshots are written to
    #[serde(default = "default_export_dir")]
    pub export_dir: String,

    /// Ideas generated after each controller run
    #[serde(default = "default_idea_count")]
    pub idea_count: usize,

    /// Best generated ideas kept in the store
    #[serde(default = "default_ideas_stored")]
    pub ideas_stored: usize,

    /// Language filters drawn per cycle; an empty entry means no filter
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Initial lower star bound for search qualifiers
    #[serde(default)]
    pub min_stars: u64,

    /// Initial upper star bound for search qualifiers
    #[serde(default = "default_search_max_stars")]
    pub max_stars: u64,
}

const fn default_queries_per_cycle() -> usize {
    8
}

const fn default_max_queries_per_cycle() -> usize {
    16
}

const fn default_results_per_query() -> usize {
    30
}

const fn default_page_count() -> u64 {
    10
}

const fn default_scanned_per_page() -> u64 {
    1_000
}

const fn default_query_delay_ms() -> u64 {
    2_000
}

const fn default_cycle_delay_ms() -> u64 {
    5_000
}

const fn default_improve_every() -> u64 {
    5
}

const fn default_min_scored_for_improve() -> u64 {
    10
}

const fn default_export_every() -> u64 {
    10
}

const fn default_export_limit() -> usize {
    100
}

fn default_export_dir() -> String {
    ".".to_string()
}

const fn default_idea_count() -> usize {
    20
}

const fn default_ideas_stored() -> usize {
    10
}

fn default_languages() -> Vec<String> {
    ["python", "typescript", "javascript", "python", "typescript", ""]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

const fn default_search_max_stars() -> u64 {
    100
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            queries_per_cycle: default_queries_per_cycle(),
            max_queries_per_cycle: default_max_queries_per_cycle(),
            results_per_query: default_results_per_query(),
            page_count: default_page_count(),
            scanned_per_page: default_scanned_per_page(),
            query_delay_ms: default_query_delay_ms(),
            cycle_delay_ms: default_cycle_delay_ms(),
            improve_every: default_improve_every(),
            min_scored_for_improve: default_min_scored_for_improve(),
            export_every: default_export_every(),
            export_limit: default_export_limit(),
            export_dir: default_export_dir(),
            idea_count: default_idea_count(),
            ideas_stored: default_ideas_stored(),
            languages: default_languages(),
            min_stars: 0,
            max_stars: default_search_max_stars(),
        }
    }
}

/// Self-improving controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LearningConfig {
    /// Learning-log entries kept per kind
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,

    /// Learned queries kept by the loop
    #[serde(default = "default_max_learned_queries")]
    pub max_learned_queries: usize,

    /// Queries generated from emerging keywords per controller run
    #[serde(default = "default_generated_queries")]
    pub generated_queries: usize,

    /// Near-ideal star band lower bound
    #[serde(default = "default_near_ideal_min_stars")]
    pub near_ideal_min_stars: u64,

    /// Near-ideal star band upper bound
    #[serde(default = "default_near_ideal_max_stars")]
    pub near_ideal_max_stars: u64,

    /// Near-ideal count in the last 12h below which the search expands
    #[serde(default = "default_expand_below")]
    pub expand_below_near_ideal: u64,

    /// Score step applied on selectivity changes
    #[serde(default = "default_selectivity_step")]
    pub selectivity_step: f64,
}

const fn default_history_cap() -> usize {
    30
}

const fn default_max_learned_queries() -> usize {
    20
}

const fn default_generated_queries() -> usize {
    5
}

const fn default_near_ideal_min_stars() -> u64 {
    5
}

const fn default_near_ideal_max_stars() -> u64 {
    100
}

const fn default_expand_below() -> u64 {
    5
}

const fn default_selectivity_step() -> f64 {
    0.5
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            history_cap: default_history_cap(),
            max_learned_queries: default_max_learned_queries(),
            generated_queries: default_generated_queries(),
            near_ideal_min_stars: default_near_ideal_min_stars(),
            near_ideal_max_stars: default_near_ideal_max_stars(),
            expand_below_near_ideal: default_expand_below(),
            selectivity_step: default_selectivity_step(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_depends_on_credential() {
        let config = RateLimitConfig::default();
        assert_eq!(config.limit_for(true), 5_000);
        assert_eq!(config.limit_for(false), 60);
    }

    #[test]
    fn test_discovery_defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.queries_per_cycle, 8);
        assert_eq!(config.improve_every, 5);
        assert_eq!(config.export_every, 10);
        assert_eq!(config.languages.len(), 6);
        assert!(config.languages.iter().any(String::is_empty));
    }
}
