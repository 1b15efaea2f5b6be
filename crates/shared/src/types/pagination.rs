//! Paging for the read models (request history, approver inboxes,
//! anomaly lists).

use serde::{Deserialize, Serialize};

/// Largest page a caller may ask for.
pub const MAX_PER_PAGE: u32 = 100;

/// A requested page, 1-indexed.
///
/// Out-of-range values are tolerated on input and normalized by
/// [`PageRequest::window`]: page 0 reads as page 1, and `per_page` is
/// clamped to `1..=MAX_PER_PAGE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number.
    #[serde(default = "first_page")]
    pub page: u32,
    /// Rows per page.
    #[serde(default = "standard_page_size")]
    pub per_page: u32,
}

const fn first_page() -> u32 {
    1
}

const fn standard_page_size() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: first_page(),
            per_page: standard_page_size(),
        }
    }
}

/// The normalized slice a [`PageRequest`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Page number, at least 1.
    pub page: u32,
    /// Rows per page, within `1..=MAX_PER_PAGE`.
    pub per_page: u32,
}

impl PageWindow {
    /// Rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    /// Rows to fetch.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl PageRequest {
    /// A request for `page` with `per_page` rows.
    #[must_use]
    pub const fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Normalizes the request.
    #[must_use]
    pub fn window(&self) -> PageWindow {
        PageWindow {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }
}

/// One page of rows plus where it sits in the full result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Rows on this page.
    pub data: Vec<T>,
    /// Position of the page.
    pub meta: PageMeta,
}

/// Position of a page in the full result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Page number.
    pub page: u32,
    /// Rows per page.
    pub per_page: u32,
    /// Rows across all pages.
    pub total: u64,
    /// Page count; an empty result still has one (empty) page.
    pub total_pages: u32,
}

impl PageMeta {
    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

impl<T> PageResponse<T> {
    /// Wraps the rows fetched for `window` out of `total`.
    #[must_use]
    pub fn new(data: Vec<T>, window: PageWindow, total: u64) -> Self {
        let pages = total.div_ceil(u64::from(window.per_page)).max(1);
        Self {
            data,
            meta: PageMeta {
                page: window.page,
                per_page: window.per_page,
                total,
                total_pages: u32::try_from(pages).unwrap_or(u32::MAX),
            },
        }
    }

    /// Converts the rows, keeping the position.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}
