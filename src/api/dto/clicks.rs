//! DTOs for click event data.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::ClickEvent;

/// Individual click event information.
///
/// Optional fields are omitted from JSON when `None` for cleaner responses.
#[derive(Debug, Serialize)]
pub struct ClickInfo {
    pub destination_url: String,

    pub clicked_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl From<ClickEvent> for ClickInfo {
    fn from(c: ClickEvent) -> Self {
        Self {
            destination_url: c.destination_url,
            clicked_at: c.clicked_at,
            user_agent: c.user_agent,
            referer: c.referer,
            ip: c.ip,
        }
    }
}
