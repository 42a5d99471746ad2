//! `gemscout report`: markdown insights report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use super::CommandContext;
use crate::services::{ReportGenerator, SelfImprovingController};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub async fn execute(args: ReportArgs, ctx: CommandContext) -> Result<()> {
    let store = ctx.open_store().await?;
    let now = Utc::now();

    let improvement = SelfImprovingController::new(store.clone(), ctx.config.learning.clone())
        .run_improvement_cycle(now)
        .await
        .context("Self-improvement cycle failed")?;
    let report = ReportGenerator::new(store, ctx.config.learning.clone())
        .build(now, improvement)
        .await
        .context("Failed to build insights report")?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, report.to_string())
                .await
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("{}", report.subject());
            println!("Report written to {}", path.display());
        }
        None => println!("{report}"),
    }
    Ok(())
}
