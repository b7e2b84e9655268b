//! Handler for split redirects.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use tracing::debug;

use crate::domain::entities::RequestMetadata;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects a visitor to one destination of a split, chosen by weight.
///
/// # Endpoint
///
/// `GET /r/{slug}`
///
/// # Request Flow
///
/// 1. Resolve the active split for `slug`
/// 2. Pick a destination with the weighted selector
/// 3. Queue the click for the background worker (never awaited)
/// 4. Return 302 Found with `Location` set to the destination
///
/// # Click Tracking
///
/// Click events are sent to a bounded channel for async processing.
/// If the queue is full, the click is dropped and the redirect still succeeds.
///
/// # Errors
///
/// Returns 404 Not Found if the slug is unknown, the split is deactivated, or
/// no destination has a positive weight.
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    let (split, destination) = match state.split_service.choose_destination(&slug).await {
        Ok(chosen) => chosen,
        Err(AppError::NoSelectableDestination { details, .. }) => {
            return Err(AppError::not_found(
                "Split has no selectable destination",
                details,
            ));
        }
        Err(e) => return Err(e),
    };

    let metadata = RequestMetadata {
        ip: Some(client_ip(&headers, addr, state.behind_proxy)),
        user_agent: header_string(&headers, header::USER_AGENT),
        referer: header_string(&headers, header::REFERER),
    };

    state.click_recorder.record(&split, &destination, metadata);
    metrics::counter!("redirects_total").increment(1);

    debug!(split_id = split.id, slug = %split.slug, url = %destination.url, "Redirecting");

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, destination.url.as_str()),
            (header::CACHE_CONTROL, "no-store"),
        ],
    )
        .into_response())
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
