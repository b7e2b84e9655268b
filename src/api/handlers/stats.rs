//! Handler for split statistics.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::json;

use crate::api::dto::pagination::StatsQueryParams;
use crate::api::dto::stats::SplitStatsResponse;
use crate::application::services::stats_service::{DEFAULT_RECENT_CLICKS, MAX_RECENT_CLICKS};
use crate::domain::entities::SplitRef;
use crate::error::AppError;
use crate::state::AppState;

/// Retrieves observed click distribution for a split.
///
/// # Endpoint
///
/// `GET /api/splits/{id|slug}/stats`
///
/// # Query Parameters
///
/// - `from` (optional): Start date (RFC3339 format)
/// - `to` (optional): End date (RFC3339 format)
/// - `recent` (optional): Number of latest clicks to include (default: 10, max: 100)
///
/// # Response
///
/// Per-destination clicks and percentages next to the configured weights.
/// Deactivated splits remain readable by numeric id.
///
/// # Errors
///
/// Returns 404 Not Found if the split doesn't exist.
/// Returns 400 Bad Request for an inverted date range or invalid `recent`.
pub async fn split_stats_handler(
    State(state): State<AppState>,
    Path(split_ref): Path<String>,
    Query(params): Query<StatsQueryParams>,
) -> Result<Json<SplitStatsResponse>, AppError> {
    let recent = params.recent.unwrap_or(DEFAULT_RECENT_CLICKS);
    if !(0..=MAX_RECENT_CLICKS).contains(&recent) {
        return Err(AppError::bad_request(
            format!("recent must be between 0 and {}", MAX_RECENT_CLICKS),
            json!({ "recent": recent }),
        ));
    }

    let stats = state
        .stats_service
        .compute(
            &SplitRef::parse(&split_ref),
            params.date_filter.window(),
            recent,
        )
        .await?;

    Ok(Json(stats.into()))
}
