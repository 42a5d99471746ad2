//! Gemscout - continuous discovery of under-the-radar repositories
//!
//! Gemscout repeatedly searches GitHub under a trailing-window request budget,
//! scores each result with deterministic heuristics, stores promising
//! repositories in SQLite and periodically analyzes what it has stored to
//! steer the next searches.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the port traits
//! - **Adapters** (`adapters`): GitHub search over reqwest, SQLite store over sqlx
//! - **Service Layer** (`services`): rate limiter, scorer, controller, loop, export, report
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gemscout::adapters::{github::GitHubSearchClient, sqlite::*};
//! use gemscout::services::DiscoveryLoop;
//!
//! let config = gemscout::Config::default();
//! let pool = initialize_database(&database_url(&config.database.path), None).await?;
//! let search = Arc::new(GitHubSearchClient::new(&config.github, std::env::var("GITHUB_TOKEN").ok()));
//! let summary = DiscoveryLoop::new(&config, search, Arc::new(SqliteDiscoveryStore::new(pool)))
//!     .run()
//!     .await;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Config, GeneratedIdea, LearningEvent, RepositoryRecord, ScoreResult, ScoredRepository,
};
pub use domain::ports::{DiscoveryStore, RepositorySearch, SearchQuery};
pub use services::{DiscoveryLoop, HeuristicScorer, RateLimiter, RunSummary, SelfImprovingController};
