//! Repository trait for split storage.

use crate::domain::entities::{NewSplit, Split, SplitUpdate};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing splits and their destination lists.
///
/// Every mutating method is atomic: either the split row and its destinations
/// are written together or nothing is.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgSplitRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryStore`] - process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SplitRepository: Send + Sync {
    /// Inserts a new split with version 1.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateSlug`] if an active split already uses the slug.
    /// Returns [`AppError::Persistence`] on storage errors.
    async fn create(&self, new_split: NewSplit) -> Result<Split, AppError>;

    /// Finds a split by id, active or not.
    async fn find_by_id(&self, id: i64) -> Result<Option<Split>, AppError>;

    /// Finds the active split that owns `slug`.
    async fn find_active_by_slug(&self, slug: &str) -> Result<Option<Split>, AppError>;

    /// Lists splits newest first.
    ///
    /// Inactive splits are skipped unless `include_inactive` is set.
    async fn list(
        &self,
        offset: i64,
        limit: i64,
        include_inactive: bool,
    ) -> Result<Vec<Split>, AppError>;

    /// Counts splits, with the same activity filter as [`Self::list`].
    async fn count(&self, include_inactive: bool) -> Result<i64, AppError>;

    /// Applies a validated update to an active split.
    ///
    /// Replacing destinations increments `version`; `updated_at` always moves.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the split does not exist or is inactive.
    async fn update(&self, id: i64, update: SplitUpdate) -> Result<Split, AppError>;

    /// Soft-deletes a split.
    ///
    /// Returns `Ok(false)` if the split was not found or already inactive.
    async fn deactivate(&self, id: i64) -> Result<bool, AppError>;

    /// Hard-deletes a split and its destinations.
    ///
    /// Click events are deleted too when `cascade_clicks` is set, otherwise
    /// they stay as orphaned audit records. Returns `Ok(false)` if not found.
    async fn purge(&self, id: i64, cascade_clicks: bool) -> Result<bool, AppError>;

    /// Checks that the backing store answers.
    async fn ping(&self) -> bool;
}
