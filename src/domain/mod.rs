//! Domain layer for the gemscout discovery pipeline
//!
//! This module contains the repository/score data model, the controller's
//! learning records, and the port traits adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
