//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ClickEvent, DestinationClicks, NewClickEvent};
use crate::domain::repositories::{ClickRepository, ClickWindow};
use crate::error::AppError;

/// PostgreSQL repository for the click event log.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: i64,
    split_id: i64,
    destination_url: String,
    clicked_at: DateTime<Utc>,
    ip: Option<String>,
    user_agent: Option<String>,
    referer: Option<String>,
}

impl From<ClickRow> for ClickEvent {
    fn from(r: ClickRow) -> Self {
        ClickEvent {
            id: r.id,
            split_id: r.split_id,
            destination_url: r.destination_url,
            clicked_at: r.clicked_at,
            ip: r.ip,
            user_agent: r.user_agent,
            referer: r.referer,
        }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record_click(&self, new_click: NewClickEvent) -> Result<ClickEvent, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the split serializes concurrent increments
        let updated = sqlx::query("UPDATE splits SET total_clicks = total_clicks + 1 WHERE id = $1")
            .bind(new_click.split_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Split not found",
                json!({ "split_id": new_click.split_id }),
            ));
        }

        let row = sqlx::query_as::<_, ClickRow>(
            r#"
            INSERT INTO split_clicks (split_id, destination_url, clicked_at, ip, user_agent, referer)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, split_id, destination_url, clicked_at, ip, user_agent, referer
            "#,
        )
        .bind(new_click.split_id)
        .bind(&new_click.destination_url)
        .bind(new_click.clicked_at)
        .bind(new_click.metadata.ip.as_deref())
        .bind(new_click.metadata.user_agent.as_deref())
        .bind(new_click.metadata.referer.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn clicks_by_destination(
        &self,
        split_id: i64,
        window: ClickWindow,
    ) -> Result<Vec<DestinationClicks>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT destination_url, COUNT(*)
            FROM split_clicks
            WHERE split_id = $1
              AND ($2::timestamptz IS NULL OR clicked_at >= $2)
              AND ($3::timestamptz IS NULL OR clicked_at <= $3)
            GROUP BY destination_url
            ORDER BY COUNT(*) DESC
            "#,
        )
        .bind(split_id)
        .bind(window.from)
        .bind(window.to)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(url, clicks)| DestinationClicks { url, clicks })
            .collect())
    }

    async fn recent_clicks(
        &self,
        split_id: i64,
        window: ClickWindow,
        limit: i64,
    ) -> Result<Vec<ClickEvent>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT id, split_id, destination_url, clicked_at, ip, user_agent, referer
            FROM split_clicks
            WHERE split_id = $1
              AND ($2::timestamptz IS NULL OR clicked_at >= $2)
              AND ($3::timestamptz IS NULL OR clicked_at <= $3)
            ORDER BY clicked_at DESC, id DESC
            LIMIT $4
            "#,
        )
        .bind(split_id)
        .bind(window.from)
        .bind(window.to)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(ClickEvent::from).collect())
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM split_clicks")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
