//! Page-number pagination for the user listing.
//!
//! Pages are 1-based. Out-of-range values are clamped rather than rejected: `page` to at least 1,
//! `page_size` to `1..=max_page_size` from [`ListingConfig`].

use crate::config::ListingConfig;
use crate::reports::total_pages;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Page selection query parameters.
// DisplayFromStr keeps numeric parsing working when this struct is `#[serde(flatten)]`ed
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct PageQuery {
    /// 1-based page number (default: 1)
    #[param(default = 1, minimum = 1)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page: Option<i64>,

    /// Items per page (default: 20, max: 100)
    #[param(default = 20, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page_size: Option<i64>,
}

impl PageQuery {
    #[inline]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    #[inline]
    pub fn page_size(&self, listing: &ListingConfig) -> i64 {
        self.page_size
            .unwrap_or(listing.default_page_size)
            .clamp(1, listing.max_page_size)
    }

    /// `(offset, limit)` for the selected page.
    #[inline]
    pub fn bounds(&self, listing: &ListingConfig) -> (i64, i64) {
        let page_size = self.page_size(listing);
        ((self.page() - 1).saturating_mul(page_size), page_size)
    }
}

/// Paginated response envelope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T: ToSchema> {
    /// Items matching the query across all pages
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub results: Vec<T>,
}

impl<T: ToSchema> Paginated<T> {
    pub fn new(results: Vec<T>, count: i64, page: i64, page_size: i64) -> Self {
        Self {
            count,
            page,
            page_size,
            total_pages: total_pages(count, page_size),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> ListingConfig {
        ListingConfig {
            default_page_size: 20,
            max_page_size: 100,
        }
    }

    #[test]
    fn test_defaults() {
        let query = PageQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.bounds(&listing()), (0, 20));
    }

    #[test]
    fn test_clamping() {
        let query = PageQuery {
            page: Some(0),
            page_size: Some(500),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(&listing()), 100);

        let query = PageQuery {
            page: Some(-3),
            page_size: Some(0),
        };
        assert_eq!(query.bounds(&listing()), (0, 1));
    }

    #[test]
    fn test_third_page_offset() {
        let query = PageQuery {
            page: Some(3),
            page_size: Some(20),
        };
        assert_eq!(query.bounds(&listing()), (40, 20));
    }

    #[test]
    fn test_query_string_parsing() {
        let query: PageQuery = serde_urlencoded::from_str("page=2&page_size=5").unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.page_size, Some(5));
    }
}
