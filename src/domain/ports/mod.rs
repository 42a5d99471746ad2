//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - RepositorySearch: repository-hosting search endpoint
//! - DiscoveryStore: persistence for scored repositories, ideas and the learning log

pub mod discovery_store;
pub mod repository_search;

pub use discovery_store::DiscoveryStore;
pub use repository_search::{RepositorySearch, SearchQuery};
