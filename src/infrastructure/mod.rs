//! Infrastructure layer module
//!
//! Configuration loading and logging setup. Storage and HTTP adapters live
//! under `adapters`.

pub mod config;
pub mod logging;
