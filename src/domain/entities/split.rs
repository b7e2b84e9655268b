//! Split entity: a slug mapped to a weighted set of destinations.

use chrono::{DateTime, Utc};
use std::fmt;

use super::destination::Destination;

/// A weighted redirect configuration.
#[derive(Debug, Clone)]
pub struct Split {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub destinations: Vec<Destination>,
    pub total_clicks: i64,
    pub is_active: bool,
    /// Starts at 1 and increments on every change to `destinations`.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating a split. Destinations are already validated.
#[derive(Debug, Clone)]
pub struct NewSplit {
    pub slug: String,
    pub name: String,
    pub destinations: Vec<Destination>,
}

/// Partial update as received from the API.
///
/// `None` fields are left unchanged. `weights` without `destinations`
/// reweights the current destination list.
#[derive(Debug, Clone, Default)]
pub struct SplitPatch {
    pub name: Option<String>,
    pub destinations: Option<Vec<String>>,
    pub weights: Option<Vec<f64>>,
}

impl SplitPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.destinations.is_none() && self.weights.is_none()
    }
}

/// Validated write applied atomically by the repository.
///
/// When `destinations` is `Some`, the whole list is replaced and the version
/// is incremented.
#[derive(Debug, Clone, Default)]
pub struct SplitUpdate {
    pub name: Option<String>,
    pub destinations: Option<Vec<Destination>>,
}

/// Path reference to a split: numeric id or slug.
///
/// Slugs are never purely numeric, so an all-digit segment is always an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitRef {
    Id(i64),
    Slug(String),
}

impl SplitRef {
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty()
            && raw.bytes().all(|b| b.is_ascii_digit())
            && let Ok(id) = raw.parse()
        {
            return SplitRef::Id(id);
        }
        SplitRef::Slug(raw.to_string())
    }
}

impl fmt::Display for SplitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitRef::Id(id) => write!(f, "{}", id),
            SplitRef::Slug(slug) => f.write_str(slug),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ref_parse() {
        assert_eq!(SplitRef::parse("42"), SplitRef::Id(42));
        assert_eq!(SplitRef::parse("promo"), SplitRef::Slug("promo".to_string()));
        assert_eq!(SplitRef::parse("42a"), SplitRef::Slug("42a".to_string()));
        assert_eq!(SplitRef::parse(""), SplitRef::Slug(String::new()));
    }

    #[test]
    fn test_split_ref_overflowing_number_is_slug() {
        let raw = "99999999999999999999999";
        assert_eq!(SplitRef::parse(raw), SplitRef::Slug(raw.to_string()));
    }

    #[test]
    fn test_empty_patch() {
        assert!(SplitPatch::default().is_empty());
        let patch = SplitPatch {
            name: Some("New".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
