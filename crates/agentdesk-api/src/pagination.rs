//! The `{data, pagination}` envelope returned by listing endpoints.

use serde::Serialize;

/// Pagination block of a listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Matches across all pages.
    pub total: u64,
    /// `ceil(total / page_size)`.
    pub total_pages: u64,
    /// Whether a later page exists. Only emitted by endpoints that opt in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,
    /// Whether an earlier page exists. Only emitted by endpoints that opt in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_previous_page: Option<bool>,
}

impl Pagination {
    /// Page metadata without navigation flags.
    pub fn new(page: u32, page_size: u32, total: u64) -> Self {
        Self {
            page,
            page_size,
            total,
            total_pages: total_pages(total, page_size),
            has_next_page: None,
            has_previous_page: None,
        }
    }

    /// Add `hasNextPage` and `hasPreviousPage`.
    #[must_use]
    pub fn with_navigation(mut self) -> Self {
        self.has_next_page = Some(u64::from(self.page) < self.total_pages);
        self.has_previous_page = Some(self.page > 1);
        self
    }
}

/// Number of pages needed for `total` rows. Zero when there are no rows or
/// the page size is zero.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}

/// A listing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope<T> {
    /// The rows of this page.
    pub data: Vec<T>,
    /// Page metadata.
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(1, 12), 1);
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn last_page_navigation() {
        let p = Pagination::new(3, 10, 25).with_navigation();
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.has_next_page, Some(false));
        assert_eq!(p.has_previous_page, Some(true));
    }

    #[test]
    fn first_page_navigation() {
        let p = Pagination::new(1, 10, 25).with_navigation();
        assert_eq!(p.has_next_page, Some(true));
        assert_eq!(p.has_previous_page, Some(false));
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let p = Pagination::new(1, 10, 0).with_navigation();
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.has_next_page, Some(false));
    }

    #[test]
    fn flags_omitted_unless_requested() {
        let envelope = Envelope {
            data: vec![1, 2],
            pagination: Pagination::new(1, 12, 2),
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": [1, 2],
                "pagination": { "page": 1, "pageSize": 12, "total": 2, "totalPages": 1 }
            })
        );
    }
}
