//! `gemscout ideas`: stored ideas, or a fresh batch from learned patterns.

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::CommandContext;
use crate::cli::output::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::models::{GeneratedIdea, ScoreField};
use crate::domain::ports::DiscoveryStore;
use crate::services::{IdeaGenerator, LearnedPatterns};

/// Stored gems sampled when learning patterns.
const PATTERN_SAMPLE: usize = 500;

#[derive(Args, Debug)]
pub struct IdeasArgs {
    /// Maximum number of ideas to display
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Generate this many new ideas and store the best before listing
    #[arg(short, long)]
    pub generate: Option<usize>,

    /// Seed for reproducible generation
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct IdeaListOutput {
    pub ideas: Vec<GeneratedIdea>,
    pub total: usize,
    pub generated: usize,
}

impl CommandOutput for IdeaListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["name", "category", "mult", "novelty", "value", "feasibility", "build time"]);
        for idea in &self.ideas {
            table.add_row(vec![
                truncate(&idea.name, 40),
                idea.category.clone(),
                format!("{:.0}x", idea.multiplier),
                format!("{:.1}", idea.novelty_score),
                format!("${}", idea.predicted_value),
                idea.feasibility.clone(),
                idea.time_to_build.clone(),
            ]);
        }

        let listing = render_list("idea", "ideas", &table, self.total);
        if self.generated > 0 {
            format!("Stored {} new idea(s).\n\n{listing}", self.generated)
        } else {
            listing
        }
    }
}

pub async fn execute(args: IdeasArgs, ctx: CommandContext) -> Result<()> {
    let store = ctx.open_store().await?;

    let mut generated = 0;
    if let Some(count) = args.generate {
        let gems = store.query_top(ScoreField::Multiplier, PATTERN_SAMPLE).await?;
        let patterns = LearnedPatterns::learn(&gems);
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let ideas = IdeaGenerator::new(patterns).generate(&mut rng, count, Utc::now());
        for idea in ideas.iter().take(ctx.config.discovery.ideas_stored) {
            store.insert_idea(idea).await?;
            generated += 1;
        }
    }

    let ideas = store.list_ideas(args.limit).await?;
    let total = ideas.len();
    output(&IdeaListOutput { ideas, total, generated }, ctx.json);
    Ok(())
}
