//! `gemscout run`: the continuous discovery loop.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::CommandContext;
use crate::adapters::github::GitHubSearchClient;
use crate::cli::output::{output, CommandOutput};
use crate::services::{cancel_on_shutdown_signal, DiscoveryLoop, RunSummary};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Seed query sampling and idea generation for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the configured snapshot directory
    #[arg(long)]
    pub export_dir: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let s = &self.summary;
        let runtime = s.finished_at - s.session_start;
        let mut lines = vec![
            format!("Session {} finished after {} min", s.session_id, runtime.num_minutes()),
            format!("  Cycles:          {}", s.cycles),
            format!("  Scanned:         {}", s.total_scanned),
            format!("  Scored:          {}", s.total_scored),
            format!("  Gems found:      {}", s.gems_found),
            format!("  Ideas stored:    {}", s.ideas_stored),
            format!("  Stored repos:    {}", s.stored_repositories),
            format!("  Stored ideas:    {}", s.stored_ideas),
            format!(
                "  Star range:      {}..{} (min base score {:.1})",
                s.parameters.min_stars, s.parameters.max_stars, s.parameters.min_base_score
            ),
        ];
        if let Some(path) = &s.last_export {
            lines.push(format!("  Last export:     {}", path.display()));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: RunArgs, mut ctx: CommandContext) -> Result<()> {
    if let Some(dir) = args.export_dir {
        ctx.config.discovery.export_dir = dir;
    }

    let store = ctx.open_store().await?;
    let search = Arc::new(GitHubSearchClient::new(&ctx.config.github, ctx.token.clone()));

    let mut discovery = DiscoveryLoop::new(&ctx.config, search, store);
    if let Some(seed) = args.seed {
        discovery = discovery.with_seed(seed);
    }

    let listener = cancel_on_shutdown_signal(discovery.handle());
    let summary = discovery.run().await;
    listener.abort();

    output(&RunOutput { summary }, ctx.json);
    Ok(())
}
