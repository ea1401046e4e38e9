//! Pagination
//!
//! Offset pagination shared by every list endpoint.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Requested page (1-based). Out-of-range input is clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn first_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }.normalized()
    }

    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    /// SQL `LIMIT`
    pub fn limit(&self) -> i64 {
        self.normalized().per_page as i64
    }

    /// SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        let n = self.normalized();
        (n.page as i64 - 1) * n.per_page as i64
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let request = request.normalized();
        let per_page = request.per_page as u64;
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages: total.div_ceil(per_page) as u32,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let req = PageRequest::new(3, 25);
        assert_eq!(req.limit(), 25);
        assert_eq!(req.offset(), 50);
    }

    #[test]
    fn test_clamping() {
        let req = PageRequest { page: 0, per_page: 1000 };
        assert_eq!(req.offset(), 0);
        assert_eq!(req.limit(), MAX_PER_PAGE as i64);

        let req = PageRequest { page: 2, per_page: 0 };
        assert_eq!(req.limit(), 1);
        assert_eq!(req.offset(), 1);
    }

    #[test]
    fn test_total_pages() {
        let page = Page::new(vec![1, 2], PageRequest::new(1, 20), 41);
        assert_eq!(page.total_pages, 3);

        let empty: Page<i32> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_query_defaults() {
        let req: PageRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req, PageRequest::default());
    }
}
