//! DTOs for split management endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use super::pagination::PaginationMeta;
use crate::domain::entities::{Destination, Split, SplitPatch};

/// Compiled regex for caller-chosen slugs.
static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("slug regex is valid"));

/// Request to create a split.
///
/// `weights` is optional; when missing or of a different length than
/// `destinations`, traffic is spread equally.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSplitRequest {
    #[validate(length(min = 3, max = 64))]
    #[validate(regex(path = "*SLUG_REGEX"))]
    pub slug: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub destinations: Vec<String>,

    pub weights: Option<Vec<f64>>,
}

/// Partial update of a split. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSplitRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    pub destinations: Option<Vec<String>>,

    pub weights: Option<Vec<f64>>,
}

impl From<UpdateSplitRequest> for SplitPatch {
    fn from(req: UpdateSplitRequest) -> Self {
        SplitPatch {
            name: req.name,
            destinations: req.destinations,
            weights: req.weights,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DestinationInfo {
    pub url: String,
    pub weight: f64,
}

impl From<Destination> for DestinationInfo {
    fn from(d: Destination) -> Self {
        Self {
            url: d.url,
            weight: d.weight,
        }
    }
}

/// A split as returned by the management API.
#[derive(Debug, Serialize)]
pub struct SplitResponse {
    pub id: i64,
    pub slug: String,
    pub name: String,
    /// Path that redirects visitors through this split.
    pub redirect_path: String,
    pub destinations: Vec<DestinationInfo>,
    pub total_clicks: i64,
    pub is_active: bool,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Split> for SplitResponse {
    fn from(split: Split) -> Self {
        Self {
            id: split.id,
            redirect_path: format!("/r/{}", split.slug),
            slug: split.slug,
            name: split.name,
            destinations: split.destinations.into_iter().map(Into::into).collect(),
            total_clicks: split.total_clicks,
            is_active: split.is_active,
            version: split.version,
            created_at: split.created_at,
            updated_at: split.updated_at,
        }
    }
}

/// Paginated list of splits, newest first.
#[derive(Debug, Serialize)]
pub struct SplitListResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<SplitResponse>,
}

/// Acknowledgment returned after deactivating a split.
#[derive(Debug, Serialize)]
pub struct DeactivateSplitResponse {
    pub id: i64,
    pub slug: String,
    pub is_active: bool,
    pub message: String,
}
