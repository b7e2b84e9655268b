//! PostgreSQL implementation of split repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::entities::{Destination, NewSplit, Split, SplitUpdate};
use crate::domain::repositories::SplitRepository;
use crate::error::AppError;

/// PostgreSQL repository for splits and their destination lists.
///
/// Destinations live in `split_destinations`, one row per entry, ordered by
/// `position`. Every mutation runs in a transaction so a split is never
/// observed with a partial destination list.
pub struct PgSplitRepository {
    pool: Arc<PgPool>,
}

impl PgSplitRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SplitRow {
    id: i64,
    slug: String,
    name: String,
    total_clicks: i64,
    is_active: bool,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SplitRow {
    fn into_split(self, destinations: Vec<Destination>) -> Split {
        Split {
            id: self.id,
            slug: self.slug,
            name: self.name,
            destinations,
            total_clicks: self.total_clicks,
            is_active: self.is_active,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DestinationRow {
    split_id: i64,
    url: String,
    weight: f64,
}

/// Loads destination lists for `ids`, keyed by split id, in position order.
async fn load_destinations(
    conn: &mut PgConnection,
    ids: &[i64],
) -> Result<HashMap<i64, Vec<Destination>>, AppError> {
    let rows = sqlx::query_as::<_, DestinationRow>(
        r#"
        SELECT split_id, url, weight
        FROM split_destinations
        WHERE split_id = ANY($1)
        ORDER BY split_id, position
        "#,
    )
    .bind(ids)
    .fetch_all(conn)
    .await?;

    let mut by_split: HashMap<i64, Vec<Destination>> = HashMap::with_capacity(ids.len());
    for row in rows {
        by_split
            .entry(row.split_id)
            .or_default()
            .push(Destination::new(row.url, row.weight));
    }

    Ok(by_split)
}

async fn insert_destinations(
    conn: &mut PgConnection,
    split_id: i64,
    destinations: &[Destination],
) -> Result<(), AppError> {
    let positions: Vec<i32> = (0..destinations.len() as i32).collect();
    let urls: Vec<String> = destinations.iter().map(|d| d.url.clone()).collect();
    let weights: Vec<f64> = destinations.iter().map(|d| d.weight).collect();

    sqlx::query(
        r#"
        INSERT INTO split_destinations (split_id, position, url, weight)
        SELECT $1, t.position, t.url, t.weight
        FROM UNNEST($2::int4[], $3::text[], $4::float8[]) AS t(position, url, weight)
        "#,
    )
    .bind(split_id)
    .bind(&positions)
    .bind(&urls)
    .bind(&weights)
    .execute(conn)
    .await?;

    Ok(())
}

/// Attaches destination lists to split rows read on the same connection.
async fn with_destinations(
    conn: &mut PgConnection,
    rows: Vec<SplitRow>,
) -> Result<Vec<Split>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut destinations = load_destinations(conn, &ids).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let dests = destinations.remove(&row.id).unwrap_or_default();
            row.into_split(dests)
        })
        .collect())
}

impl PgSplitRepository {
    /// Opens a read-only snapshot so split rows and destination lists come
    /// from the same committed version.
    async fn begin_snapshot(&self) -> Result<sqlx::Transaction<'_, sqlx::Postgres>, AppError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

#[async_trait]
impl SplitRepository for PgSplitRepository {
    async fn create(&self, new_split: NewSplit) -> Result<Split, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SplitRow>(
            r#"
            INSERT INTO splits (slug, name)
            VALUES ($1, $2)
            RETURNING id, slug, name, total_clicks, is_active, version, created_at, updated_at
            "#,
        )
        .bind(&new_split.slug)
        .bind(&new_split.name)
        .fetch_one(&mut *tx)
        .await?;

        insert_destinations(&mut tx, row.id, &new_split.destinations).await?;

        tx.commit().await?;

        Ok(row.into_split(new_split.destinations))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Split>, AppError> {
        let mut tx = self.begin_snapshot().await?;

        let row = sqlx::query_as::<_, SplitRow>(
            r#"
            SELECT id, slug, name, total_clicks, is_active, version, created_at, updated_at
            FROM splits
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let split = match row {
            Some(row) => with_destinations(&mut tx, vec![row]).await?.pop(),
            None => None,
        };
        tx.commit().await?;

        Ok(split)
    }

    async fn find_active_by_slug(&self, slug: &str) -> Result<Option<Split>, AppError> {
        let mut tx = self.begin_snapshot().await?;

        let row = sqlx::query_as::<_, SplitRow>(
            r#"
            SELECT id, slug, name, total_clicks, is_active, version, created_at, updated_at
            FROM splits
            WHERE slug = $1 AND is_active
            "#,
        )
        .bind(slug)
        .fetch_optional(&mut *tx)
        .await?;

        let split = match row {
            Some(row) => with_destinations(&mut tx, vec![row]).await?.pop(),
            None => None,
        };
        tx.commit().await?;

        Ok(split)
    }

    async fn list(
        &self,
        offset: i64,
        limit: i64,
        include_inactive: bool,
    ) -> Result<Vec<Split>, AppError> {
        let mut tx = self.begin_snapshot().await?;

        let rows = sqlx::query_as::<_, SplitRow>(
            r#"
            SELECT id, slug, name, total_clicks, is_active, version, created_at, updated_at
            FROM splits
            WHERE $1 OR is_active
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(include_inactive)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await?;

        let splits = with_destinations(&mut tx, rows).await?;
        tx.commit().await?;

        Ok(splits)
    }

    async fn count(&self, include_inactive: bool) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM splits WHERE $1 OR is_active")
            .bind(include_inactive)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn update(&self, id: i64, update: SplitUpdate) -> Result<Split, AppError> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM splits WHERE id = $1 AND is_active FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            return Err(AppError::not_found(
                "Split not found or deactivated",
                json!({ "id": id }),
            ));
        }

        let version_bump: i32 = if let Some(destinations) = &update.destinations {
            sqlx::query("DELETE FROM split_destinations WHERE split_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_destinations(&mut tx, id, destinations).await?;
            1
        } else {
            0
        };

        let row = sqlx::query_as::<_, SplitRow>(
            r#"
            UPDATE splits
            SET name = COALESCE($2, name),
                version = version + $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, slug, name, total_clicks, is_active, version, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(version_bump)
        .fetch_one(&mut *tx)
        .await?;

        let destinations = match update.destinations {
            Some(destinations) => destinations,
            None => load_destinations(&mut tx, &[id])
                .await?
                .remove(&id)
                .unwrap_or_default(),
        };

        tx.commit().await?;

        Ok(row.into_split(destinations))
    }

    async fn deactivate(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE splits SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active",
        )
        .bind(id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purge(&self, id: i64, cascade_clicks: bool) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        if cascade_clicks {
            sqlx::query("DELETE FROM split_clicks WHERE split_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        // split_destinations rows go with the split via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM splits WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
