//! SQLite implementation of the DiscoveryStore.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    GeneratedIdea, LearningEvent, LearningEventKind, ScoreField, ScoredRepository,
};
use crate::domain::ports::DiscoveryStore;

use super::format_datetime;

#[derive(Clone)]
pub struct SqliteDiscoveryStore {
    pool: SqlitePool,
}

impl SqliteDiscoveryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DiscoveryStore for SqliteDiscoveryStore {
    async fn upsert(&self, repository: &ScoredRepository) -> DomainResult<()> {
        let data = serde_json::to_string(repository)?;
        let record = &repository.record;
        let score = &repository.score;

        sqlx::query(
            r#"INSERT INTO discovered_repositories
               (url, owner, name, stars, forks, open_issues, language, category,
                base_score, opportunity_score, multiplier, is_opportunity, discovered_at, data)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(url) DO UPDATE SET
                owner = excluded.owner,
                name = excluded.name,
                stars = excluded.stars,
                forks = excluded.forks,
                open_issues = excluded.open_issues,
                language = excluded.language,
                category = excluded.category,
                base_score = excluded.base_score,
                opportunity_score = excluded.opportunity_score,
                multiplier = excluded.multiplier,
                is_opportunity = excluded.is_opportunity,
                discovered_at = excluded.discovered_at,
                data = excluded.data"#
        )
        .bind(&record.url)
        .bind(&record.owner)
        .bind(&record.name)
        .bind(record.stars as i64)
        .bind(record.forks as i64)
        .bind(record.open_issues as i64)
        .bind(&record.language)
        .bind(&score.category)
        .bind(score.base_score)
        .bind(score.opportunity_score)
        .bind(score.multiplier)
        .bind(score.is_opportunity)
        .bind(format_datetime(repository.discovered_at))
        .bind(&data)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn query_recent(&self, since: DateTime<Utc>) -> DomainResult<Vec<ScoredRepository>> {
        let rows: Vec<RepositoryRow> = sqlx::query_as(
            "SELECT url, data FROM discovered_repositories WHERE discovered_at > ? ORDER BY discovered_at DESC"
        )
        .bind(format_datetime(since))
        .fetch_all(&self.pool)
        .await?;

        Ok(decode_rows(rows))
    }

    async fn query_top(&self, by: ScoreField, limit: usize) -> DomainResult<Vec<ScoredRepository>> {
        // Column names come from a closed enum, never from input.
        let sql = format!(
            "SELECT url, data FROM discovered_repositories ORDER BY {} DESC, stars DESC LIMIT ?",
            by.column()
        );
        let rows: Vec<RepositoryRow> = sqlx::query_as(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(decode_rows(rows))
    }

    async fn latest(&self, limit: usize) -> DomainResult<Vec<ScoredRepository>> {
        let rows: Vec<RepositoryRow> = sqlx::query_as(
            "SELECT url, data FROM discovered_repositories ORDER BY discovered_at DESC LIMIT ?"
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(decode_rows(rows))
    }

    async fn all_repositories(&self) -> DomainResult<Vec<ScoredRepository>> {
        let rows: Vec<RepositoryRow> = sqlx::query_as(
            "SELECT url, data FROM discovered_repositories ORDER BY discovered_at DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(decode_rows(rows))
    }

    async fn count_repositories(&self) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM discovered_repositories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn insert_idea(&self, idea: &GeneratedIdea) -> DomainResult<i64> {
        let data = serde_json::to_string(idea)?;

        let result = sqlx::query(
            r#"INSERT INTO generated_ideas (name, category, multiplier, novelty_score, generated_at, data)
               VALUES (?, ?, ?, ?, ?, ?)"#
        )
        .bind(&idea.name)
        .bind(&idea.category)
        .bind(idea.multiplier)
        .bind(idea.novelty_score)
        .bind(format_datetime(idea.generated_at))
        .bind(&data)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn list_ideas(&self, limit: usize) -> DomainResult<Vec<GeneratedIdea>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT id, data FROM generated_ideas ORDER BY id DESC LIMIT ?"
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let ideas = rows
            .into_iter()
            .filter_map(|(id, data)| match serde_json::from_str::<GeneratedIdea>(&data) {
                Ok(mut idea) => {
                    idea.id = Some(id);
                    Some(idea)
                }
                Err(e) => {
                    tracing::warn!(idea_id = id, error = %e, "skipping undecodable idea row");
                    None
                }
            })
            .collect();

        Ok(ideas)
    }

    async fn count_ideas(&self) -> DomainResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM generated_ideas")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn append_learning_event(&self, event: &LearningEvent, cap: usize) -> DomainResult<()> {
        let data = serde_json::to_string(event)?;

        sqlx::query("INSERT INTO learning_events (kind, recorded_at, data) VALUES (?, ?, ?)")
            .bind(event.kind.as_str())
            .bind(format_datetime(event.recorded_at))
            .bind(&data)
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"DELETE FROM learning_events
               WHERE kind = ? AND id NOT IN
               (SELECT id FROM learning_events WHERE kind = ? ORDER BY id DESC LIMIT ?)"#
        )
        .bind(event.kind.as_str())
        .bind(event.kind.as_str())
        .bind(cap as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_learning_events(
        &self,
        kind: LearningEventKind,
        limit: usize,
    ) -> DomainResult<Vec<LearningEvent>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT id, data FROM learning_events WHERE kind = ? ORDER BY id DESC LIMIT ?"
        )
        .bind(kind.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let events = rows
            .into_iter()
            .filter_map(|(id, data)| match serde_json::from_str::<LearningEvent>(&data) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(event_id = id, error = %e, "skipping undecodable learning event");
                    None
                }
            })
            .collect();

        Ok(events)
    }
}

#[derive(sqlx::FromRow)]
struct RepositoryRow {
    url: String,
    data: String,
}

/// Decode the lossless JSON blob of each row, skipping rows that fail to parse.
fn decode_rows(rows: Vec<RepositoryRow>) -> Vec<ScoredRepository> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_str::<ScoredRepository>(&row.data) {
            Ok(repository) => Some(repository),
            Err(e) => {
                tracing::warn!(url = %row.url, error = %e, "skipping undecodable repository row");
                None
            }
        })
        .collect()
}
