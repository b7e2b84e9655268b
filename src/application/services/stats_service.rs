//! Click statistics: observed traffic share against configured weights.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{
    ClickEvent, Destination, DestinationClicks, Split, SplitRef, total_weight,
};
use crate::domain::repositories::{ClickRepository, ClickWindow, SplitRepository};
use crate::error::AppError;

pub const DEFAULT_RECENT_CLICKS: i64 = 10;
pub const MAX_RECENT_CLICKS: i64 = 100;

/// Observed and configured share of one destination.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationStats {
    pub url: String,
    pub weight: f64,
    pub configured_percentage: f64,
    pub clicks: i64,
    pub percentage: f64,
}

/// Result of [`aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Number of click events counted.
    pub recorded_clicks: i64,
    /// One entry per configured destination, in configured order.
    pub destinations: Vec<DestinationStats>,
    /// Clicks on URLs that are no longer configured, most clicked first.
    pub other_destinations: Vec<DestinationStats>,
}

/// Full statistics report for one split.
#[derive(Debug, Clone)]
pub struct SplitStats {
    pub split: Split,
    pub window: ClickWindow,
    pub recorded_clicks: i64,
    pub destinations: Vec<DestinationStats>,
    pub other_destinations: Vec<DestinationStats>,
    pub recent_clicks: Vec<ClickEvent>,
}

/// Share of `part` in `total` as a percentage rounded to one decimal.
///
/// Returns 0 when `total` is not positive.
pub fn percentage(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    (part * 1000.0 / total).round() / 10.0
}

/// Joins per-URL click counts with the configured destinations.
///
/// Percentages use the sum of all counts as denominator, so configured and
/// retired destinations together add up to 100.
pub fn aggregate(destinations: &[Destination], counts: &[DestinationClicks]) -> Aggregate {
    let recorded_clicks: i64 = counts.iter().map(|c| c.clicks).sum();
    let weight_sum = total_weight(destinations);

    let mut by_url: HashMap<&str, i64> = HashMap::with_capacity(counts.len());
    for count in counts {
        *by_url.entry(count.url.as_str()).or_default() += count.clicks;
    }

    let configured = destinations
        .iter()
        .map(|d| {
            let clicks = by_url.remove(d.url.as_str()).unwrap_or(0);
            DestinationStats {
                url: d.url.clone(),
                weight: d.weight,
                configured_percentage: percentage(d.weight, weight_sum),
                clicks,
                percentage: percentage(clicks as f64, recorded_clicks as f64),
            }
        })
        .collect();

    let mut other: Vec<DestinationStats> = by_url
        .into_iter()
        .map(|(url, clicks)| DestinationStats {
            url: url.to_string(),
            weight: 0.0,
            configured_percentage: 0.0,
            clicks,
            percentage: percentage(clicks as f64, recorded_clicks as f64),
        })
        .collect();
    other.sort_by(|a, b| b.clicks.cmp(&a.clicks).then_with(|| a.url.cmp(&b.url)));

    Aggregate {
        recorded_clicks,
        destinations: configured,
        other_destinations: other,
    }
}

/// Service computing statistics from the click event log.
pub struct StatsService {
    splits: Arc<dyn SplitRepository>,
    clicks: Arc<dyn ClickRepository>,
}

impl StatsService {
    pub fn new(splits: Arc<dyn SplitRepository>, clicks: Arc<dyn ClickRepository>) -> Self {
        Self { splits, clicks }
    }

    /// Computes statistics for a split within `window`.
    ///
    /// Inactive splits are reachable by id so their history stays readable.
    /// `recent` is clamped to `0..=100`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the split does not exist.
    /// Returns [`AppError::Validation`] if `window.from` is after `window.to`.
    pub async fn compute(
        &self,
        split_ref: &SplitRef,
        window: ClickWindow,
        recent: i64,
    ) -> Result<SplitStats, AppError> {
        if let (Some(from), Some(to)) = (window.from, window.to)
            && from > to
        {
            return Err(AppError::bad_request(
                "'from' must not be after 'to'",
                json!({ "from": from, "to": to }),
            ));
        }

        let split = match split_ref {
            SplitRef::Id(id) => self.splits.find_by_id(*id).await?,
            SplitRef::Slug(slug) => self.splits.find_active_by_slug(slug).await?,
        }
        .ok_or_else(|| {
            AppError::not_found("Split not found", json!({ "split": split_ref.to_string() }))
        })?;

        let counts = self.clicks.clicks_by_destination(split.id, window).await?;

        let recent = recent.clamp(0, MAX_RECENT_CLICKS);
        let recent_clicks = if recent > 0 {
            self.clicks.recent_clicks(split.id, window, recent).await?
        } else {
            Vec::new()
        };

        let Aggregate {
            recorded_clicks,
            destinations,
            other_destinations,
        } = aggregate(&split.destinations, &counts);

        Ok(SplitStats {
            split,
            window,
            recorded_clicks,
            destinations,
            other_destinations,
            recent_clicks,
        })
    }

    /// Total click events across all splits.
    pub async fn total_recorded_clicks(&self) -> Result<i64, AppError> {
        self.clicks.count_all().await
    }
}
