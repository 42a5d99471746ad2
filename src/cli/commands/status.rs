//! `gemscout status`: store counts, credential state and the latest learning entries.

use anyhow::Result;
use serde::Serialize;

use super::CommandContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{LearningEvent, LearningEventKind};
use crate::domain::ports::DiscoveryStore;

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub database: String,
    pub authenticated: bool,
    pub request_limit: usize,
    pub window_secs: u64,
    pub repositories: u64,
    pub ideas: u64,
    pub latest_learning: Vec<LearningEvent>,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Database:      {}", self.database),
            format!(
                "Credential:    {} ({} requests / {}s)",
                if self.authenticated { "token" } else { "anonymous" },
                self.request_limit,
                self.window_secs
            ),
            format!("Repositories:  {}", self.repositories),
            format!("Ideas:         {}", self.ideas),
        ];

        if self.latest_learning.is_empty() {
            lines.push("Learning log:  empty".to_string());
        } else {
            lines.push("Learning log:".to_string());
            for event in &self.latest_learning {
                lines.push(format!(
                    "  {:<21} {}  {} records  -> {}",
                    event.kind.as_str(),
                    event.recorded_at.format("%Y-%m-%d %H:%M"),
                    event.sample.records_observed,
                    event.sample.recommendation
                ));
            }
        }
        lines.join("\n")
    }
}

pub async fn execute(ctx: CommandContext) -> Result<()> {
    let store = ctx.open_store().await?;

    let mut latest_learning = Vec::new();
    for kind in [
        LearningEventKind::KeywordAnalysis,
        LearningEventKind::QualityTrend,
        LearningEventKind::ParameterSuggestion,
    ] {
        latest_learning.extend(store.list_learning_events(kind, 1).await?);
    }

    let authenticated = ctx.token.is_some();
    let status = StatusOutput {
        database: ctx.config.database.path.clone(),
        authenticated,
        request_limit: ctx.config.rate_limit.limit_for(authenticated),
        window_secs: ctx.config.rate_limit.window_secs,
        repositories: store.count_repositories().await?,
        ideas: store.count_ideas().await?,
        latest_learning,
    };

    output(&status, ctx.json);
    Ok(())
}
