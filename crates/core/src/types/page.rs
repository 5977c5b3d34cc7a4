//! Offset pagination over the user list.

use serde::Serialize;

/// A validated page request.
///
/// Pages are 1-based. Both `page` and `limit` are clamped to at least 1, and
/// `limit` is additionally capped by the caller-supplied maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl PageRequest {
    /// Build a page request, clamping out-of-range values.
    ///
    /// ```
    /// use userbase_core::PageRequest;
    ///
    /// let req = PageRequest::new(0, 500, 100);
    /// assert_eq!(req.page(), 1);
    /// assert_eq!(req.limit(), 100);
    /// ```
    #[must_use]
    pub fn new(page: i64, limit: i64, max_limit: usize) -> Self {
        let max_limit = max_limit.max(1);
        let page = usize::try_from(page.max(1)).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit.max(1))
            .unwrap_or(usize::MAX)
            .min(max_limit);
        Self { page, limit }
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Number of items skipped before this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Select this page's window from an ordered sequence.
    pub fn slice<I>(&self, items: I) -> impl Iterator<Item = I::Item> + use<I>
    where
        I: IntoIterator,
    {
        items.into_iter().skip(self.offset()).take(self.limit)
    }

    /// Describe this page for a collection of `total` items.
    #[must_use]
    pub const fn info(&self, total: usize) -> PageInfo {
        PageInfo {
            current_page: self.page,
            limit: self.limit,
            total,
        }
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// The 1-based page number that was served.
    pub current_page: usize,
    /// Page size that was applied.
    pub limit: usize,
    /// Total number of items across all pages.
    pub total: usize,
}
