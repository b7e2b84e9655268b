//! Click event entity: the immutable record of one redirect.

use chrono::{DateTime, Utc};

/// A persisted redirect occurrence.
///
/// `split_id` is a reference, not ownership: the row survives a purged split
/// unless the retention policy cascades.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub id: i64,
    pub split_id: i64,
    pub destination_url: String,
    pub clicked_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Requester metadata captured at redirect time. Opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMetadata {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Input data for appending a click event.
///
/// The timestamp is taken at redirect time so queueing delay does not skew
/// the event log.
#[derive(Debug, Clone)]
pub struct NewClickEvent {
    pub split_id: i64,
    pub destination_url: String,
    pub clicked_at: DateTime<Utc>,
    pub metadata: RequestMetadata,
}

/// Number of recorded clicks for one destination URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationClicks {
    pub url: String,
    pub clicks: i64,
}
