use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::adapters::github::MAX_PER_PAGE;
use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid rate limit window: {0}s. Must be positive")]
    InvalidRateWindow(u64),

    #[error("Invalid request limit: {0}. Must be at least 1")]
    InvalidRequestLimit(usize),

    #[error("Invalid star range: {0}..{1}. Minimum must be below maximum")]
    InvalidStarRange(u64, u64),

    #[error("Invalid opportunity threshold: {0}. Must be between 0 and 10")]
    InvalidThreshold(f64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .gemscout/config.yaml (project config)
    /// 3. .gemscout/local.yaml (local overrides, optional)
    /// 4. Environment variables (GEMSCOUT_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".gemscout/config.yaml"))
            .merge(Yaml::file(".gemscout/local.yaml"))
            .merge(Env::prefixed("GEMSCOUT_").split("__"))
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.rate_limit.window_secs == 0 {
            return Err(ConfigError::InvalidRateWindow(config.rate_limit.window_secs));
        }
        for limit in [config.rate_limit.authenticated_limit, config.rate_limit.anonymous_limit] {
            if limit == 0 {
                return Err(ConfigError::InvalidRequestLimit(limit));
            }
        }

        let threshold = config.scoring.opportunity_threshold;
        if !(0.0..=10.0).contains(&threshold) {
            return Err(ConfigError::InvalidThreshold(threshold));
        }

        let discovery = &config.discovery;
        if discovery.min_stars >= discovery.max_stars {
            return Err(ConfigError::InvalidStarRange(discovery.min_stars, discovery.max_stars));
        }
        if discovery.queries_per_cycle == 0 {
            return Err(ConfigError::ValidationFailed(
                "discovery.queries_per_cycle must be at least 1".to_string(),
            ));
        }
        // One search call must stay one request against the rate window.
        if discovery.results_per_query == 0 || discovery.results_per_query > MAX_PER_PAGE {
            return Err(ConfigError::ValidationFailed(format!(
                "discovery.results_per_query must be between 1 and {MAX_PER_PAGE}, got {}",
                discovery.results_per_query
            )));
        }
        if discovery.improve_every == 0 || discovery.export_every == 0 {
            return Err(ConfigError::ValidationFailed(
                "discovery.improve_every and discovery.export_every must be at least 1".to_string(),
            ));
        }

        if config.learning.near_ideal_min_stars > config.learning.near_ideal_max_stars {
            return Err(ConfigError::ValidationFailed(format!(
                "learning near-ideal band {}..{} is empty",
                config.learning.near_ideal_min_stars, config.learning.near_ideal_max_stars
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.database.path, ".gemscout/continuous_discovery.db");
        assert_eq!(config.rate_limit.window_secs, 3_600);
        assert_eq!(config.learning.history_cap, 30);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
database:
  path: /custom/gems.db
logging:
  level: debug
  format: json
scoring:
  opportunity_threshold: 4.5
discovery:
  queries_per_cycle: 3
  languages: [rust]
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.database.path, "/custom/gems.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level, "debug");
        assert!((config.scoring.opportunity_threshold - 4.5).abs() < f64::EPSILON);
        assert_eq!(config.scoring.max_stars, 500);
        assert_eq!(config.discovery.queries_per_cycle, 3);
        assert_eq!(config.discovery.languages, vec!["rust".to_string()]);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn test_validate_empty_database_path() {
        let mut config = Config::default();
        config.database.path = String::new();

        assert!(matches!(ConfigLoader::validate(&config), Err(ConfigError::EmptyDatabasePath)));
    }

    #[test]
    fn test_validate_zero_request_limit() {
        let mut config = Config::default();
        config.rate_limit.anonymous_limit = 0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRequestLimit(0))
        ));
    }

    #[test]
    fn test_validate_empty_star_range() {
        let mut config = Config::default();
        config.discovery.min_stars = 100;
        config.discovery.max_stars = 100;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidStarRange(100, 100))
        ));
    }

    #[test]
    fn test_validate_threshold_out_of_range() {
        let mut config = Config::default();
        config.scoring.opportunity_threshold = 12.0;

        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_validate_results_per_query_fits_one_page() {
        let mut config = Config::default();
        config.discovery.results_per_query = MAX_PER_PAGE;
        assert!(ConfigLoader::validate(&config).is_ok());

        config.discovery.results_per_query = MAX_PER_PAGE + 1;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_env_override() {
        temp_env::with_vars(
            [
                ("GEMSCOUT_LOGGING__LEVEL", Some("debug")),
                ("GEMSCOUT_RATE_LIMIT__ANONYMOUS_LIMIT", Some("30")),
                ("GEMSCOUT_SCORING__MAX_STARS", Some("250")),
            ],
            || {
                let config: Config = ConfigLoader::figment().extract().unwrap();
                assert_eq!(config.logging.level, "debug");
                assert_eq!(config.rate_limit.anonymous_limit, 30);
                assert_eq!(config.scoring.max_stars, 250);
                assert_eq!(config.rate_limit.authenticated_limit, 5_000);
            },
        );
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "discovery:\n  export_dir: /tmp/exports\n  export_every: 3").unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.discovery.export_dir, "/tmp/exports");
        assert_eq!(config.discovery.export_every, 3);
        assert_eq!(config.discovery.improve_every, 5);
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  level: loud").unwrap();
        file.flush().unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(base_file, "logging:\n  level: info\n  format: json").unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "logging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.logging.level, "debug", "Override should win");
        assert_eq!(config.logging.format, "json", "Base value should persist when not overridden");
    }
}
