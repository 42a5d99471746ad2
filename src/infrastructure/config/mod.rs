//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment: programmatic defaults, project
//! YAML files, then `GEMSCOUT_*` environment overrides.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
