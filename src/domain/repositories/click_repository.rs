//! Repository trait for the click log.

use crate::domain::entities::{ClickEvent, DestinationClicks, NewClickEvent};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Time window for click queries. `None` bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl ClickWindow {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// Returns true if `at` falls inside the window (bounds inclusive).
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}

/// Repository interface for appending and querying click events.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryStore`] - process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click event and increments the split's `total_clicks`.
    ///
    /// Both writes happen in one transaction so concurrent recorders never
    /// lose an increment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the split no longer exists.
    /// Returns [`AppError::Persistence`] on storage errors.
    async fn record_click(&self, new_click: NewClickEvent) -> Result<ClickEvent, AppError>;

    /// Counts events per destination URL for a split.
    async fn clicks_by_destination(
        &self,
        split_id: i64,
        window: ClickWindow,
    ) -> Result<Vec<DestinationClicks>, AppError>;

    /// Returns the newest `limit` events for a split.
    async fn recent_clicks(
        &self,
        split_id: i64,
        window: ClickWindow,
        limit: i64,
    ) -> Result<Vec<ClickEvent>, AppError>;

    /// Counts every event ever recorded, orphans included.
    async fn count_all(&self) -> Result<i64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_open_window_contains_everything() {
        assert!(ClickWindow::default().contains(Utc::now()));
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let now = Utc::now();
        let window = ClickWindow::new(Some(now), Some(now + Duration::hours(1)));

        assert!(window.contains(now));
        assert!(window.contains(now + Duration::hours(1)));
        assert!(!window.contains(now - Duration::seconds(1)));
        assert!(!window.contains(now + Duration::hours(2)));
    }
}
