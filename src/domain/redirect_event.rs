//! Redirect event model for asynchronous click recording.

use chrono::{DateTime, Utc};

use crate::domain::entities::{Destination, NewClickEvent, RequestMetadata, Split};

/// An in-memory record of one redirect, queued for persistence.
///
/// Passed from the redirect handler to the background worker over a bounded
/// channel so the HTTP response never waits on the click log.
///
/// # Usage Flow
///
/// 1. Created by [`crate::application::services::ClickRecorder::record`]
/// 2. Sent to channel (non-blocking)
/// 3. Processed by [`crate::domain::click_worker::run_click_worker`]
/// 4. Converted to [`NewClickEvent`] for persistence
#[derive(Debug, Clone)]
pub struct RedirectEvent {
    pub split_id: i64,
    pub slug: String,
    pub destination_url: String,
    pub clicked_at: DateTime<Utc>,
    pub metadata: RequestMetadata,
}

impl RedirectEvent {
    /// Captures a redirect of `split` to `destination`, timestamped now.
    pub fn new(split: &Split, destination: &Destination, metadata: RequestMetadata) -> Self {
        Self {
            split_id: split.id,
            slug: split.slug.clone(),
            destination_url: destination.url.clone(),
            clicked_at: Utc::now(),
            metadata,
        }
    }

    pub fn to_new_click(&self) -> NewClickEvent {
        NewClickEvent {
            split_id: self.split_id,
            destination_url: self.destination_url.clone(),
            clicked_at: self.clicked_at,
            metadata: self.metadata.clone(),
        }
    }
}
