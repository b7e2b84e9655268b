//! DTOs for split statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::clicks::ClickInfo;
use crate::application::services::stats_service::{DestinationStats, SplitStats};

/// Observed click share against configured weights for one split.
///
/// `total_clicks` is the split's running counter; `recorded_clicks` counts
/// click events inside the requested window and is the denominator for every
/// `percentage`.
#[derive(Debug, Serialize)]
pub struct SplitStatsResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub is_active: bool,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub total_clicks: i64,
    pub recorded_clicks: i64,
    pub window: WindowInfo,
    pub destinations: Vec<DestinationStatsInfo>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub other_destinations: Vec<DestinationStatsInfo>,

    pub recent_clicks: Vec<ClickInfo>,
}

#[derive(Debug, Serialize)]
pub struct WindowInfo {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct DestinationStatsInfo {
    pub url: String,
    pub weight: f64,
    pub configured_percentage: f64,
    pub clicks: i64,
    pub percentage: f64,
}

impl From<DestinationStats> for DestinationStatsInfo {
    fn from(d: DestinationStats) -> Self {
        Self {
            url: d.url,
            weight: d.weight,
            configured_percentage: d.configured_percentage,
            clicks: d.clicks,
            percentage: d.percentage,
        }
    }
}

impl From<SplitStats> for SplitStatsResponse {
    fn from(stats: SplitStats) -> Self {
        Self {
            id: stats.split.id,
            slug: stats.split.slug,
            name: stats.split.name,
            is_active: stats.split.is_active,
            version: stats.split.version,
            created_at: stats.split.created_at,
            total_clicks: stats.split.total_clicks,
            recorded_clicks: stats.recorded_clicks,
            window: WindowInfo {
                from: stats.window.from,
                to: stats.window.to,
            },
            destinations: stats.destinations.into_iter().map(Into::into).collect(),
            other_destinations: stats
                .other_destinations
                .into_iter()
                .map(Into::into)
                .collect(),
            recent_clicks: stats.recent_clicks.into_iter().map(Into::into).collect(),
        }
    }
}
