//! `gemscout top`: best stored repositories by a score column.

use anyhow::{anyhow, Result};
use clap::Args;
use serde::Serialize;

use super::CommandContext;
use crate::cli::output::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::models::{ScoreField, ScoredRepository};
use crate::domain::ports::DiscoveryStore;

#[derive(Args, Debug)]
pub struct TopArgs {
    /// Ranking column: opportunity, multiplier or base
    #[arg(short, long, default_value = "opportunity")]
    pub by: String,

    /// Maximum number of repositories to display
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct RepositoryRow {
    pub name: String,
    pub url: String,
    pub stars: u64,
    pub forks: u64,
    pub language: String,
    pub category: String,
    pub base_score: f64,
    pub multiplier: f64,
    pub opportunity_score: f64,
    pub projected_value: u64,
    pub multiplier_reasons: Vec<String>,
    pub description: String,
    pub discovered_at: String,
}

impl From<&ScoredRepository> for RepositoryRow {
    fn from(repo: &ScoredRepository) -> Self {
        Self {
            name: repo.record.full_name(),
            url: repo.record.url.clone(),
            stars: repo.record.stars,
            forks: repo.record.forks,
            language: repo.record.language.clone(),
            category: repo.score.category.clone(),
            base_score: repo.score.base_score,
            multiplier: repo.score.multiplier,
            opportunity_score: repo.score.opportunity_score,
            projected_value: repo.score.projected_value,
            multiplier_reasons: repo.score.multiplier_reasons.clone(),
            description: repo.record.description.clone(),
            discovered_at: repo.discovered_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RepositoryListOutput {
    pub repositories: Vec<RepositoryRow>,
    pub total: usize,
}

impl RepositoryListOutput {
    pub fn new(repos: &[ScoredRepository]) -> Self {
        Self {
            repositories: repos.iter().map(RepositoryRow::from).collect(),
            total: repos.len(),
        }
    }
}

impl CommandOutput for RepositoryListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["name", "stars", "forks", "base", "mult", "opp", "category", "description"]);
        for repo in &self.repositories {
            table.add_row(vec![
                truncate(&repo.name, 36),
                repo.stars.to_string(),
                repo.forks.to_string(),
                format!("{:.1}", repo.base_score),
                format!("{:.1}x", repo.multiplier),
                format!("{:.2}", repo.opportunity_score),
                repo.category.clone(),
                truncate(&repo.description, 48),
            ]);
        }
        render_list("repository", "repositories", &table, self.total)
    }
}

pub async fn execute(args: TopArgs, ctx: CommandContext) -> Result<()> {
    let field = ScoreField::from_str(&args.by)
        .ok_or_else(|| anyhow!("Invalid ranking column: {}. Use opportunity, multiplier or base", args.by))?;

    let store = ctx.open_store().await?;
    let repos = store.query_top(field, args.limit).await?;

    output(&RepositoryListOutput::new(&repos), ctx.json);
    Ok(())
}
