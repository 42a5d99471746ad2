//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::commands::{ideas::IdeasArgs, recent::RecentArgs, report::ReportArgs, run::RunArgs, top::TopArgs};

#[derive(Parser, Debug)]
#[command(name = "gemscout")]
#[command(about = "Continuous discovery of under-the-radar GitHub repositories", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this YAML file instead of .gemscout/
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// GitHub token; selects the authenticated request ceiling
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the continuous discovery loop until interrupted
    Run(RunArgs),

    /// Show the highest-scoring stored repositories
    Top(TopArgs),

    /// Show repositories discovered recently
    Recent(RecentArgs),

    /// Run one self-improvement cycle against the store
    Improve,

    /// List or generate product ideas
    Ideas(IdeasArgs),

    /// Build the discovery insights report
    Report(ReportArgs),

    /// Show store counts and the latest learning state
    Status,
}
