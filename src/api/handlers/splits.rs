//! Handlers for split management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::api::dto::split::{
    CreateSplitRequest, DeactivateSplitResponse, SplitListResponse, SplitResponse,
    UpdateSplitRequest,
};
use crate::domain::entities::SplitRef;
use crate::error::AppError;
use crate::state::AppState;

/// Lists active splits, newest first.
///
/// # Endpoint
///
/// `GET /api/splits`
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `page_size` (optional): Items per page (default: 25, max: 100)
///
/// # Errors
///
/// Returns 400 Bad Request if pagination parameters are invalid.
pub async fn list_splits_handler(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<SplitListResponse>, AppError> {
    let (offset, limit) = params
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let (splits, total) = state.split_service.list(offset, limit, false).await?;

    Ok(Json(SplitListResponse {
        pagination: PaginationMeta::new(params.page(), params.page_size(), total),
        items: splits.into_iter().map(SplitResponse::from).collect(),
    }))
}

/// Creates a split.
///
/// # Endpoint
///
/// `POST /api/splits`
///
/// # Request Body
///
/// ```json
/// {
///   "slug": "spring-sale",
///   "name": "Spring sale landing test",
///   "destinations": ["https://shop.example/a", "https://shop.example/b"],
///   "weights": [70, 30]
/// }
/// ```
///
/// `slug` and `weights` are optional. Missing or mismatched weights split
/// traffic equally.
///
/// # Errors
///
/// - 400 for validation, destination or weight errors
/// - 409 if an active split already uses the slug
/// - 422 if every weight is zero
pub async fn create_split_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateSplitRequest>,
) -> Result<(StatusCode, Json<SplitResponse>), AppError> {
    payload.validate()?;

    let split = state
        .split_service
        .create(
            payload.slug,
            payload.name,
            payload.destinations,
            payload.weights,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(split.into())))
}

/// Returns a split by numeric id or active slug.
///
/// # Endpoint
///
/// `GET /api/splits/{id|slug}`
pub async fn get_split_handler(
    State(state): State<AppState>,
    Path(split_ref): Path<String>,
) -> Result<Json<SplitResponse>, AppError> {
    let split = state.split_service.get(&SplitRef::parse(&split_ref)).await?;

    Ok(Json(split.into()))
}

/// Partially updates an active split.
///
/// # Endpoint
///
/// `PUT /api/splits/{id|slug}`
///
/// # Request Body
///
/// Any of `name`, `destinations`, `weights`. Sending only `weights`
/// reweights the current destinations and must match their count.
///
/// # Errors
///
/// - 400 for an empty body or invalid fields
/// - 404 if the split is unknown or deactivated
pub async fn update_split_handler(
    State(state): State<AppState>,
    Path(split_ref): Path<String>,
    Json(payload): Json<UpdateSplitRequest>,
) -> Result<Json<SplitResponse>, AppError> {
    payload.validate()?;

    let split = state
        .split_service
        .update(&SplitRef::parse(&split_ref), payload.into())
        .await?;

    Ok(Json(split.into()))
}

/// Deactivates a split. Its slug can then be reused.
///
/// # Endpoint
///
/// `DELETE /api/splits/{id|slug}`
///
/// # Errors
///
/// Returns 404 if the split is unknown or already deactivated.
pub async fn delete_split_handler(
    State(state): State<AppState>,
    Path(split_ref): Path<String>,
) -> Result<Json<DeactivateSplitResponse>, AppError> {
    let split = state
        .split_service
        .deactivate(&SplitRef::parse(&split_ref))
        .await?;

    Ok(Json(DeactivateSplitResponse {
        id: split.id,
        slug: split.slug,
        is_active: split.is_active,
        message: "Split deactivated".to_string(),
    }))
}
