//! Pagination and filtering query parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::domain::repositories::ClickWindow;

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination query parameters.
///
/// Uses `serde_with` to parse page numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl PaginationParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Validates pagination parameters and converts to storage offset/limit.
    ///
    /// # Defaults
    ///
    /// - `page`: 1
    /// - `page_size`: 25
    ///
    /// # Validation
    ///
    /// - Page must be > 0
    /// - Page size must be between 1 and 100
    ///
    /// # Returns
    ///
    /// `(offset, limit)` tuple for repository queries.
    pub fn validate_and_get_offset_limit(&self) -> Result<(i64, i64), String> {
        let page = self.page();
        let page_size = self.page_size();

        if page == 0 {
            return Err("Page must be greater than 0".to_string());
        }

        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(format!("Page size must be between 1 and {}", MAX_PAGE_SIZE));
        }

        let offset = (i64::from(page) - 1) * i64::from(page_size);
        let limit = i64::from(page_size);

        Ok((offset, limit))
    }
}

/// Pagination metadata for responses.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

impl PaginationMeta {
    pub fn new(page: u32, page_size: u32, total_items: i64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            (total_items.max(0) as f64 / f64::from(page_size)).ceil() as u32
        };

        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

/// Date range filtering parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DateFilterParams {
    #[serde(default, with = "optional_rfc3339")]
    pub from: Option<DateTime<Utc>>,

    #[serde(default, with = "optional_rfc3339")]
    pub to: Option<DateTime<Utc>>,
}

impl DateFilterParams {
    pub fn window(&self) -> ClickWindow {
        ClickWindow::new(self.from, self.to)
    }
}

/// Custom Serde deserializer for RFC3339 datetime strings.
mod optional_rfc3339 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt: Option<String> = Option::deserialize(deserializer)?;
        match opt {
            None => Ok(None),
            Some(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Query parameters for the split statistics endpoint.
#[serde_as]
#[derive(Debug, Deserialize)]
pub struct StatsQueryParams {
    #[serde(flatten)]
    pub date_filter: DateFilterParams,

    /// Number of most recent click events to include.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub recent: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, page_size: Option<u32>) -> PaginationParams {
        PaginationParams { page, page_size }
    }

    #[test]
    fn test_defaults() {
        let (offset, limit) = params(None, None).validate_and_get_offset_limit().unwrap();
        assert_eq!(offset, 0);
        assert_eq!(limit, 25);
    }

    #[test]
    fn test_custom_page_and_size() {
        let (offset, limit) = params(Some(3), Some(50)).validate_and_get_offset_limit().unwrap();
        assert_eq!(offset, 100);
        assert_eq!(limit, 50);
    }

    #[test]
    fn test_page_zero_is_error() {
        assert!(params(Some(0), None).validate_and_get_offset_limit().is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(params(None, Some(0)).validate_and_get_offset_limit().is_err());
        assert!(params(None, Some(1)).validate_and_get_offset_limit().is_ok());
        assert!(params(None, Some(MAX_PAGE_SIZE)).validate_and_get_offset_limit().is_ok());
        assert!(params(None, Some(MAX_PAGE_SIZE + 1)).validate_and_get_offset_limit().is_err());
    }

    #[test]
    fn test_pagination_meta_total_pages() {
        assert_eq!(PaginationMeta::new(1, 25, 0).total_pages, 0);
        assert_eq!(PaginationMeta::new(1, 25, 25).total_pages, 1);
        assert_eq!(PaginationMeta::new(1, 25, 26).total_pages, 2);
    }

    #[test]
    fn test_optional_rfc3339_deserializer() {
        let json = r#"{"from": "2026-01-01T00:00:00Z", "to": null}"#;
        let p: DateFilterParams = serde_json::from_str(json).unwrap();
        assert!(p.from.is_some());
        assert!(p.to.is_none());
        assert_eq!(p.window().from, p.from);
    }

    #[test]
    fn test_optional_rfc3339_invalid_format_is_error() {
        let json = r#"{"from": "not-a-date"}"#;
        assert!(serde_json::from_str::<DateFilterParams>(json).is_err());
    }

    #[test]
    fn test_stats_query_recent_from_string() {
        let json = r#"{"recent": "5", "to": "2026-02-01T00:00:00+02:00"}"#;
        let p: StatsQueryParams = serde_json::from_str(json).unwrap();
        assert_eq!(p.recent, Some(5));
        assert!(p.date_filter.to.is_some());
    }
}
