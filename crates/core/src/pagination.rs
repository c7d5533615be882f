//! Page-number pagination shared by every list endpoint.
//!
//! Out-of-range input is clamped, never rejected.

use serde::Serialize;

/// Hard upper bound on page size.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Default page size for the public request board.
pub const DEFAULT_PUBLIC_REQUEST_LIMIT: i64 = 12;

/// Default page size for the authenticated request list.
pub const DEFAULT_REQUEST_LIMIT: i64 = 10;

/// Default page size for donor search (still capped at [`MAX_PAGE_LIMIT`]).
pub const DEFAULT_DONOR_LIMIT: i64 = 100;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Clamp raw input: `page >= 1`, `1 <= limit <= MAX_PAGE_LIMIT`.
    pub fn clamped(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Rows to skip. Saturates instead of overflowing on absurd page numbers.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination metadata returned next to a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
    pub has_more: bool,
}

impl PageMeta {
    pub fn new(total: i64, page: PageRequest) -> Self {
        let pages = if total <= 0 {
            0
        } else {
            (total + page.limit - 1) / page.limit
        };
        Self {
            total,
            page: page.page,
            limit: page.limit,
            pages,
            has_more: page.page < pages,
        }
    }
}

/// A page of items with its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}
