//! `gemscout recent`: repositories discovered in a trailing window.

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::Args;

use super::top::RepositoryListOutput;
use super::CommandContext;
use crate::cli::output::output;
use crate::domain::ports::DiscoveryStore;

#[derive(Args, Debug)]
pub struct RecentArgs {
    /// Trailing window in hours
    #[arg(long, default_value = "24")]
    pub hours: i64,

    /// Maximum number of repositories to display
    #[arg(short, long, default_value = "50")]
    pub limit: usize,
}

pub async fn execute(args: RecentArgs, ctx: CommandContext) -> Result<()> {
    let store = ctx.open_store().await?;
    let since = Utc::now() - Duration::hours(args.hours.max(0));

    let mut repos = store.query_recent(since).await?;
    repos.sort_by(|a, b| b.discovered_at.cmp(&a.discovered_at));
    repos.truncate(args.limit);

    output(&RepositoryListOutput::new(&repos), ctx.json);
    Ok(())
}
