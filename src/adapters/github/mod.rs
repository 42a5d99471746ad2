//! GitHub repository search adapter.

pub mod client;
pub mod models;

pub use client::{GitHubSearchClient, MAX_PER_PAGE};
pub use models::{GitHubRepository, GitHubSearchResponse};
