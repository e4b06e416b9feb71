//! Pagination query parameter extractor.

use serde::Deserialize;

use agency_core::types::pagination::PageRequest;

/// `limit` / `offset` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PaginationParams {
    /// Converts to a clamped `PageRequest`.
    pub fn into_page_request(self) -> PageRequest {
        PageRequest::new(self.limit, self.offset)
    }
}
