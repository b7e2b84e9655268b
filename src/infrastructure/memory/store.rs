//! In-process storage backend.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::{
    ClickEvent, DestinationClicks, NewClickEvent, NewSplit, Split, SplitUpdate,
};
use crate::domain::repositories::{ClickRepository, ClickWindow, SplitRepository};
use crate::error::AppError;

#[derive(Default)]
struct State {
    splits: BTreeMap<i64, Split>,
    clicks: Vec<ClickEvent>,
    last_split_id: i64,
    last_click_id: i64,
}

impl State {
    fn active_slug_taken(&self, slug: &str) -> bool {
        self.splits.values().any(|s| s.is_active && s.slug == slug)
    }
}

/// Splits and click events held in memory behind one lock.
///
/// Implements both [`SplitRepository`] and [`ClickRepository`] with the same
/// guarantees as the PostgreSQL backend: active slugs are unique, and a click
/// append and its counter increment happen under a single write lock. Data is
/// lost on restart.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        debug!("Using in-memory storage backend");
        Self::default()
    }
}

#[async_trait]
impl SplitRepository for InMemoryStore {
    async fn create(&self, new_split: NewSplit) -> Result<Split, AppError> {
        let mut state = self.state.write().await;

        if state.active_slug_taken(&new_split.slug) {
            return Err(AppError::duplicate_slug(&new_split.slug));
        }

        state.last_split_id += 1;
        let now = Utc::now();
        let split = Split {
            id: state.last_split_id,
            slug: new_split.slug,
            name: new_split.name,
            destinations: new_split.destinations,
            total_clicks: 0,
            is_active: true,
            version: 1,
            created_at: now,
            updated_at: now,
        };
        state.splits.insert(split.id, split.clone());

        Ok(split)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Split>, AppError> {
        Ok(self.state.read().await.splits.get(&id).cloned())
    }

    async fn find_active_by_slug(&self, slug: &str) -> Result<Option<Split>, AppError> {
        Ok(self
            .state
            .read()
            .await
            .splits
            .values()
            .find(|s| s.is_active && s.slug == slug)
            .cloned())
    }

    async fn list(
        &self,
        offset: i64,
        limit: i64,
        include_inactive: bool,
    ) -> Result<Vec<Split>, AppError> {
        let state = self.state.read().await;

        // Ids grow with creation time, so reverse id order is newest first
        Ok(state
            .splits
            .values()
            .rev()
            .filter(|s| include_inactive || s.is_active)
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self, include_inactive: bool) -> Result<i64, AppError> {
        let state = self.state.read().await;
        Ok(state
            .splits
            .values()
            .filter(|s| include_inactive || s.is_active)
            .count() as i64)
    }

    async fn update(&self, id: i64, update: SplitUpdate) -> Result<Split, AppError> {
        let mut state = self.state.write().await;

        let split = state
            .splits
            .get_mut(&id)
            .filter(|s| s.is_active)
            .ok_or_else(|| {
                AppError::not_found("Split not found or deactivated", json!({ "id": id }))
            })?;

        if let Some(name) = update.name {
            split.name = name;
        }
        if let Some(destinations) = update.destinations {
            split.destinations = destinations;
            split.version += 1;
        }
        split.updated_at = Utc::now();

        Ok(split.clone())
    }

    async fn deactivate(&self, id: i64) -> Result<bool, AppError> {
        let mut state = self.state.write().await;

        match state.splits.get_mut(&id) {
            Some(split) if split.is_active => {
                split.is_active = false;
                split.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge(&self, id: i64, cascade_clicks: bool) -> Result<bool, AppError> {
        let mut state = self.state.write().await;

        if state.splits.remove(&id).is_none() {
            return Ok(false);
        }
        if cascade_clicks {
            state.clicks.retain(|c| c.split_id != id);
        }

        Ok(true)
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[async_trait]
impl ClickRepository for InMemoryStore {
    async fn record_click(&self, new_click: NewClickEvent) -> Result<ClickEvent, AppError> {
        let mut state = self.state.write().await;

        let split = state.splits.get_mut(&new_click.split_id).ok_or_else(|| {
            AppError::not_found(
                "Split not found",
                json!({ "split_id": new_click.split_id }),
            )
        })?;
        split.total_clicks += 1;

        state.last_click_id += 1;
        let click = ClickEvent {
            id: state.last_click_id,
            split_id: new_click.split_id,
            destination_url: new_click.destination_url,
            clicked_at: new_click.clicked_at,
            ip: new_click.metadata.ip,
            user_agent: new_click.metadata.user_agent,
            referer: new_click.metadata.referer,
        };
        state.clicks.push(click.clone());

        Ok(click)
    }

    async fn clicks_by_destination(
        &self,
        split_id: i64,
        window: ClickWindow,
    ) -> Result<Vec<DestinationClicks>, AppError> {
        let state = self.state.read().await;

        let mut counts: HashMap<&str, i64> = HashMap::new();
        for click in state
            .clicks
            .iter()
            .filter(|c| c.split_id == split_id && window.contains(c.clicked_at))
        {
            *counts.entry(click.destination_url.as_str()).or_default() += 1;
        }

        let mut result: Vec<DestinationClicks> = counts
            .into_iter()
            .map(|(url, clicks)| DestinationClicks {
                url: url.to_string(),
                clicks,
            })
            .collect();
        result.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.url.cmp(&b.url)));

        Ok(result)
    }

    async fn recent_clicks(
        &self,
        split_id: i64,
        window: ClickWindow,
        limit: i64,
    ) -> Result<Vec<ClickEvent>, AppError> {
        let state = self.state.read().await;

        let mut clicks: Vec<ClickEvent> = state
            .clicks
            .iter()
            .filter(|c| c.split_id == split_id && window.contains(c.clicked_at))
            .cloned()
            .collect();
        clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at).then(b.id.cmp(&a.id)));
        clicks.truncate(limit.max(0) as usize);

        Ok(clicks)
    }

    async fn count_all(&self) -> Result<i64, AppError> {
        Ok(self.state.read().await.clicks.len() as i64)
    }
}
