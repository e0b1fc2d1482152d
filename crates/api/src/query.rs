//! Shared query parameter types for API handlers.

use modiste_core::catalog::{clamp_limit, resolve_offset, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=` or `?limit=&page=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub page: Option<i64>,
}

impl PaginationParams {
    /// Clamped `(limit, offset)` pair ready for a repository call.
    pub fn window(&self) -> (i64, i64) {
        page_window(self.limit, self.offset, self.page)
    }
}

/// Clamp raw paging values the same way for every listing endpoint.
///
/// Listing endpoints with extra filters declare their own query struct
/// (`serde(flatten)` does not survive urlencoded numbers) and call this.
pub fn page_window(limit: Option<i64>, offset: Option<i64>, page: Option<i64>) -> (i64, i64) {
    let limit = clamp_limit(limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    (limit, resolve_offset(page, offset, limit))
}
