//! Adapters for external systems.

pub mod github;
pub mod sqlite;
