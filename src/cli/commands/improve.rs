//! `gemscout improve`: one self-improvement cycle over stored discoveries.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use super::CommandContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::AnalysisStatus;
use crate::services::{ImprovementReport, SelfImprovingController};

#[derive(Debug, Serialize)]
pub struct ImprovementOutput {
    #[serde(flatten)]
    pub report: ImprovementReport,
}

fn status_label(status: AnalysisStatus) -> &'static str {
    match status {
        AnalysisStatus::Analyzed => "analyzed",
        AnalysisStatus::InsufficientData => "insufficient data",
    }
}

impl CommandOutput for ImprovementOutput {
    fn to_human(&self) -> String {
        let r = &self.report;
        let mut lines = vec![format!("Self-improvement cycle #{}", r.learning_cycles_completed)];

        lines.push(format!(
            "\nKeywords ({}): {} records, {} top performers",
            status_label(r.keywords.status),
            r.keywords.records_analyzed,
            r.keywords.top_performers
        ));
        if !r.keywords.emerging_keywords.is_empty() {
            lines.push(format!("  Emerging: {}", r.keywords.emerging_keywords.join(", ")));
        }

        lines.push(format!(
            "\nQuality ({}): trend {}, recommendation {}",
            status_label(r.quality.status),
            r.quality.direction,
            r.quality.recommendation
        ));
        for window in [&r.quality.last_12h, &r.quality.last_24h, &r.quality.last_7d] {
            lines.push(format!(
                "  {:<9} total {:>4}  near-ideal {:>3}  avg mult {:>5.1}  quality {:.2}",
                window.label, window.total, window.near_ideal, window.avg_multiplier, window.quality_score
            ));
        }

        lines.push(format!("\nParameters ({})", status_label(r.parameters.status)));
        if let Some(best) = &r.parameters.best_bucket {
            lines.push(format!(
                "  Best star range: {} ({} repos, {:.0}% with forks, avg mult {:.1})",
                best.label,
                best.count,
                best.quality_ratio * 100.0,
                best.avg_multiplier
            ));
        }

        if !r.new_queries.is_empty() {
            lines.push("\nNew queries:".to_string());
            lines.extend(r.new_queries.iter().map(|q| format!("  - {q}")));
        }
        lines.join("\n")
    }
}

pub async fn execute(ctx: CommandContext) -> Result<()> {
    let store = ctx.open_store().await?;
    let controller = SelfImprovingController::new(store, ctx.config.learning.clone());
    let report = controller
        .run_improvement_cycle(Utc::now())
        .await
        .context("Self-improvement cycle failed")?;

    output(&ImprovementOutput { report }, ctx.json);
    Ok(())
}
