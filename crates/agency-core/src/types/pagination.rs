//! Limit/offset pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size.
const DEFAULT_LIMIT: u32 = 50;
/// Maximum page size.
const MAX_LIMIT: u32 = 500;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of rows to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Number of rows to skip.
    #[serde(default)]
    pub offset: u32,
}

impl PageRequest {
    /// Create a new page request, clamping the limit into `1..=MAX_LIMIT`.
    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }

    /// SQL `LIMIT` value.
    pub fn limit(&self) -> i64 {
        i64::from(self.limit)
    }

    /// SQL `OFFSET` value.
    pub fn offset(&self) -> i64 {
        i64::from(self.offset)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Total number of matching items.
    pub total: u64,
    /// Page size used.
    pub limit: u32,
    /// Offset used.
    pub offset: u32,
    /// Whether more items exist past this page.
    pub has_more: bool,
}

impl<T> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, page: &PageRequest, total: u64) -> Self {
        let has_more = u64::from(page.offset) + (items.len() as u64) < total;
        Self {
            items,
            total,
            limit: page.limit,
            offset: page.offset,
            has_more,
        }
    }

    /// Transform every item, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
            has_more: self.has_more,
        }
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(PageRequest::new(Some(0), None).limit, 1);
        assert_eq!(PageRequest::new(Some(10_000), None).limit, MAX_LIMIT);
        assert_eq!(PageRequest::new(None, Some(20)).offset(), 20);
    }

    #[test]
    fn test_has_more() {
        let page = PageRequest::new(Some(2), Some(0));
        let resp = PageResponse::new(vec![1, 2], &page, 5);
        assert!(resp.has_more);

        let page = PageRequest::new(Some(2), Some(4));
        let resp = PageResponse::new(vec![5], &page, 5);
        assert!(!resp.has_more);
    }
}
